//! Scoped temporary storage for synthesized audio.
//!
//! An [`AudioSpool`] is a private directory for one session.  Each synthesis
//! call opens an [`AudioWriter`] in it, streams the payload into the file and
//! turns it into an [`AudioHandle`] once complete.
//!
//! Ownership rules:
//!
//! * An `AudioHandle` exclusively owns its file.
//! * [`AudioHandle::release`] consumes the handle and deletes the file,
//!   reporting any I/O failure.  A handle can therefore be released at most
//!   once.
//! * Dropping a handle without releasing it deletes the file silently, so an
//!   early return or a panic never leaks audio on disk.
//! * An `AudioWriter` dropped before [`AudioWriter::finish`] deletes its
//!   partial file.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use tempfile::{NamedTempFile, TempDir, TempPath};

// ---------------------------------------------------------------------------
// AudioHandle
// ---------------------------------------------------------------------------

/// Reference to one finished audio file.
pub struct AudioHandle {
    path: TempPath,
    bytes: u64,
}

impl AudioHandle {
    /// Location of the audio file, for playback.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes
    }

    /// Delete the file now.
    pub fn release(self) -> io::Result<()> {
        self.path.close()
    }
}

impl fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioHandle")
            .field("path", &self.path())
            .field("bytes", &self.bytes)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AudioWriter
// ---------------------------------------------------------------------------

/// An audio file being written.
pub struct AudioWriter {
    file: NamedTempFile,
    bytes: u64,
}

impl AudioWriter {
    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk)?;
        self.bytes += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    /// Flush and close the file, keeping it on disk under a handle.
    pub fn finish(mut self) -> io::Result<AudioHandle> {
        self.file.flush()?;
        Ok(AudioHandle {
            path: self.file.into_temp_path(),
            bytes: self.bytes,
        })
    }
}

// ---------------------------------------------------------------------------
// AudioSpool
// ---------------------------------------------------------------------------

const SPOOL_PREFIX: &str = "session-";

/// Per-session directory holding every live audio file.
///
/// The directory itself is removed when the spool is dropped; handles must
/// not outlive it.
pub struct AudioSpool {
    dir: TempDir,
}

impl AudioSpool {
    /// Create a spool under the system temporary directory.
    pub fn temporary() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("avis-deces-").tempdir()?;
        Ok(Self { dir })
    }

    /// Create a spool as a fresh sub-directory of `parent`, creating
    /// `parent` if needed.
    pub fn new_in(parent: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix(SPOOL_PREFIX)
            .tempdir_in(parent)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove `session-*` spools under `parent` that were last modified at
    /// least `older_than` ago, returning how many were removed.
    ///
    /// A process killed before its spool was dropped leaves one behind.
    pub fn sweep(parent: &Path, older_than: Duration) -> io::Result<usize> {
        let mut removed = 0;
        for entry in std::fs::read_dir(parent)? {
            let entry = entry?;
            let is_spool = entry.file_name().to_string_lossy().starts_with(SPOOL_PREFIX);
            if !is_spool || !entry.file_type()?.is_dir() {
                continue;
            }

            let stale = entry
                .metadata()?
                .modified()?
                .elapsed()
                .is_ok_and(|age| age >= older_than);
            if !stale {
                continue;
            }

            match std::fs::remove_dir_all(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("cannot remove stale spool {}: {e}", entry.path().display()),
            }
        }
        Ok(removed)
    }

    /// Open a new uniquely named file, `audio_XXXXXX.<extension>`.
    pub fn create(&self, extension: &str) -> io::Result<AudioWriter> {
        let file = tempfile::Builder::new()
            .prefix("audio_")
            .suffix(&format!(".{extension}"))
            .tempfile_in(self.dir.path())?;
        Ok(AudioWriter { file, bytes: 0 })
    }

    /// Number of files currently in the spool.
    pub fn file_count(&self) -> io::Result<usize> {
        Ok(std::fs::read_dir(self.dir.path())?.count())
    }
}

impl fmt::Debug for AudioSpool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioSpool").field("dir", &self.path()).finish()
    }
}

/// File extension for a backend output format such as `mp3_44100_128`.
pub fn extension_for(output_format: &str) -> &str {
    output_format
        .split('_')
        .next()
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_handle(spool: &AudioSpool, payload: &[u8]) -> AudioHandle {
        let mut writer = spool.create("mp3").unwrap();
        writer.write_chunk(payload).unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn finished_handle_keeps_file_with_payload() {
        let spool = AudioSpool::temporary().unwrap();
        let handle = write_handle(&spool, b"ID3abc");

        assert!(handle.path().exists());
        assert_eq!(handle.size(), 6);
        assert_eq!(std::fs::read(handle.path()).unwrap(), b"ID3abc");
        assert!(handle
            .path()
            .extension()
            .is_some_and(|ext| ext == "mp3"));
    }

    #[test]
    fn release_deletes_file() {
        let spool = AudioSpool::temporary().unwrap();
        let handle = write_handle(&spool, b"data");
        let path = handle.path().to_path_buf();

        handle.release().unwrap();
        assert!(!path.exists());
        assert_eq!(spool.file_count().unwrap(), 0);
    }

    #[test]
    fn dropping_handle_deletes_file() {
        let spool = AudioSpool::temporary().unwrap();
        let path = {
            let handle = write_handle(&spool, b"data");
            handle.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn abandoned_writer_leaves_nothing() {
        let spool = AudioSpool::temporary().unwrap();
        {
            let mut writer = spool.create("mp3").unwrap();
            writer.write_chunk(b"partial").unwrap();
        }
        assert_eq!(spool.file_count().unwrap(), 0);
    }

    #[test]
    fn writer_counts_chunked_bytes() {
        let spool = AudioSpool::temporary().unwrap();
        let mut writer = spool.create("mp3").unwrap();
        writer.write_chunk(b"abc").unwrap();
        writer.write_chunk(b"").unwrap();
        writer.write_chunk(b"de").unwrap();
        assert_eq!(writer.bytes_written(), 5);
    }

    #[test]
    fn spool_in_parent_is_a_private_subdirectory() {
        let parent = tempfile::tempdir().unwrap();
        let nested = parent.path().join("cache").join("audio");
        let spool = AudioSpool::new_in(&nested).unwrap();
        assert!(spool.path().starts_with(&nested));
        assert_ne!(spool.path(), nested.as_path());
    }

    #[test]
    fn sweep_removes_only_spool_directories() {
        let parent = tempfile::tempdir().unwrap();
        let left_behind = AudioSpool::new_in(parent.path()).unwrap();
        let path = left_behind.path().to_path_buf();
        std::fs::write(path.join("audio_orphan.mp3"), b"data").unwrap();
        // A killed process never drops its spool.
        std::mem::forget(left_behind);

        std::fs::create_dir(parent.path().join("other")).unwrap();
        std::fs::write(parent.path().join("session-notes.txt"), b"x").unwrap();

        assert_eq!(AudioSpool::sweep(parent.path(), Duration::ZERO).unwrap(), 1);
        assert!(!path.exists());
        assert!(parent.path().join("other").exists());
        assert!(parent.path().join("session-notes.txt").exists());
    }

    #[test]
    fn sweep_keeps_recent_spools() {
        let parent = tempfile::tempdir().unwrap();
        let live = AudioSpool::new_in(parent.path()).unwrap();

        let removed = AudioSpool::sweep(parent.path(), Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 0);
        assert!(live.path().exists());
    }

    #[test]
    fn extension_from_output_format() {
        assert_eq!(extension_for("mp3_44100_128"), "mp3");
        assert_eq!(extension_for("pcm_16000"), "pcm");
        assert_eq!(extension_for("ulaw_8000"), "ulaw");
        assert_eq!(extension_for(""), "bin");
    }
}
