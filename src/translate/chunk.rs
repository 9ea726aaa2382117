//! Paragraph-preserving text chunking.
//!
//! The translation backend caps the size of a single request.  Notices are
//! split on blank lines and paragraphs are packed greedily into chunks that
//! fit the cap.  A paragraph too large on its own is broken on its line
//! breaks, then on whitespace, then mid-word as a last resort.
//!
//! Every [`Chunk`] remembers the separator that followed it in the source,
//! so [`reassemble`] puts translated pieces back with the same layout: a
//! blank line between paragraphs, a newline or a space inside one.

/// Separator between paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";
const LINE_SEPARATOR: &str = "\n";
const WORD_SEPARATOR: &str = " ";

/// One request-sized piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Text that joined this chunk to the next one; empty for the last
    /// chunk and between the parts of a hard-split word.
    pub separator: &'static str,
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Returns an empty vector for blank input.  `max_chars` of zero is treated
/// as one.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<Chunk> {
    let mut packer = Packer::new(max_chars.max(1));
    let normalized = text.replace("\r\n", "\n");

    let paragraphs = normalized
        .split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty());

    for paragraph in paragraphs {
        if char_len(paragraph) <= packer.max_chars {
            packer.push(paragraph, PARAGRAPH_SEPARATOR);
            continue;
        }

        let lines = paragraph.lines().map(str::trim).filter(|l| !l.is_empty());
        for (line_idx, line) in lines.enumerate() {
            let line_joiner = if line_idx == 0 {
                PARAGRAPH_SEPARATOR
            } else {
                LINE_SEPARATOR
            };
            if char_len(line) <= packer.max_chars {
                packer.push(line, line_joiner);
                continue;
            }

            for (word_idx, word) in line.split_whitespace().enumerate() {
                let word_joiner = if word_idx == 0 {
                    line_joiner
                } else {
                    WORD_SEPARATOR
                };
                for (part_idx, part) in split_word(word, packer.max_chars).into_iter().enumerate() {
                    packer.push(part, if part_idx == 0 { word_joiner } else { "" });
                }
            }
        }
    }

    packer.finish()
}

/// Join translated chunk texts with the separators recorded at split time.
///
/// `texts` must come in the same order as `chunks`.
pub fn reassemble<I>(chunks: &[Chunk], texts: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = String::new();
    for (chunk, text) in chunks.iter().zip(texts) {
        out.push_str(text.as_ref());
        out.push_str(chunk.separator);
    }
    out
}

/// Greedy accumulator: a unit joins the current chunk when it fits, and
/// otherwise starts a new one, the joiner becoming the closed chunk's
/// separator.
struct Packer {
    max_chars: usize,
    chunks: Vec<Chunk>,
    current: String,
    current_len: usize,
}

impl Packer {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn push(&mut self, unit: &str, joiner: &'static str) {
        let unit_len = char_len(unit);
        if !self.current.is_empty() {
            if self.current_len + joiner.len() + unit_len <= self.max_chars {
                self.current.push_str(joiner);
                self.current.push_str(unit);
                self.current_len += joiner.len() + unit_len;
                return;
            }
            self.chunks.push(Chunk {
                text: std::mem::take(&mut self.current),
                separator: joiner,
            });
        }
        self.current.push_str(unit);
        self.current_len = unit_len;
    }

    fn finish(mut self) -> Vec<Chunk> {
        if !self.current.is_empty() {
            self.chunks.push(Chunk {
                text: self.current,
                separator: "",
            });
        }
        self.chunks
    }
}

/// Hard-split a word longer than `max_chars` on char boundaries.
fn split_word(word: &str, max_chars: usize) -> Vec<&str> {
    if char_len(word) <= max_chars {
        return vec![word];
    }
    let mut parts = Vec::new();
    let mut start = 0;
    for (count, (idx, _)) in word.char_indices().enumerate() {
        if count > 0 && count % max_chars == 0 {
            parts.push(&word[start..idx]);
            start = idx;
        }
    }
    parts.push(&word[start..]);
    parts
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
