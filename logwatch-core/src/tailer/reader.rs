use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a rotated-out file handle is kept open without producing a
/// line. Every successful read pushes the deadline forward, so a handle
/// that keeps receiving late writes stays open.
const EXPIRE_INTERVAL: Duration = Duration::from_secs(60);

const READ_CHUNK: usize = 64 * 1024;

/// An open log file with a carry-over buffer for the trailing partial
/// line. The kernel read cursor tracks how far we got; only complete
/// lines are ever yielded.
struct TrackedFile {
    file: File,
    partial: Vec<u8>,
}

impl TrackedFile {
    /// Reads everything currently appended and pushes complete lines
    /// (terminator stripped) into `out`. Returns whether any line was
    /// produced.
    fn read_lines(&mut self, out: &mut Vec<Vec<u8>>) -> io::Result<bool> {
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            let n = self.file.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            self.partial.extend_from_slice(&chunk[..n]);
        }

        let mut produced = false;
        while let Some(pos) = self.partial.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.partial.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            out.push(line);
            produced = true;
        }
        Ok(produced)
    }
}

struct CurrentFile {
    tracked: TrackedFile,
    identity: (u64, u64),
}

struct RotatedFile {
    tracked: TrackedFile,
    expires_at: Instant,
}

/// Rotation-aware reader for one log path.
///
/// Rotation is detected by comparing the path's on-disk dev/inode identity
/// against the open handle. After rotation the old handle moves into a
/// retiring set and keeps being drained until it goes quiet past its
/// expiry deadline, so writes that land on the old descriptor right after
/// the switch are not lost. The first open seeks to end-of-file; a handle
/// opened after a rotation reads from offset zero.
pub struct FileReader {
    path: PathBuf,
    current: Option<CurrentFile>,
    rotated: Vec<RotatedFile>,
    expire_interval: Duration,
}

impl FileReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: None,
            rotated: Vec::new(),
            expire_interval: EXPIRE_INTERVAL,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all complete lines currently available, never blocking on
    /// absent data. Open and stat failures are logged and retried on the
    /// next poll; they never propagate.
    pub fn read_lines(&mut self, now: Instant) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();

        if self.current.is_some() {
            match self.looks_rotated() {
                Ok(true) => {
                    if let Err(e) = self.open_current(false, now) {
                        tracing::debug!(
                            path = %self.path.display(),
                            error = %e,
                            "cannot reopen rotated log file; will retry",
                        );
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    // Path may be mid-rotation; keep draining the handle we have.
                    tracing::debug!(
                        path = %self.path.display(),
                        error = %e,
                        "cannot stat log file; keeping current handle",
                    );
                }
            }
        }

        let mut keep = Vec::new();
        for mut rotated in std::mem::take(&mut self.rotated) {
            match rotated.tracked.read_lines(&mut lines) {
                Ok(true) => {
                    rotated.expires_at = now + self.expire_interval;
                    keep.push(rotated);
                }
                Ok(false) => {
                    if rotated.expires_at > now {
                        keep.push(rotated);
                    } else {
                        tracing::debug!(path = %self.path.display(), "closing rotated log handle");
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "read from rotated log handle failed; dropping it",
                    );
                }
            }
        }
        self.rotated = keep;

        if self.current.is_none() {
            if let Err(e) = self.open_current(true, now) {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %e,
                    "cannot open log file; will retry",
                );
                return lines;
            }
        }

        if let Some(current) = &mut self.current {
            if let Err(e) = current.tracked.read_lines(&mut lines) {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "read from log file failed",
                );
            }
        }

        lines
    }

    fn looks_rotated(&self) -> io::Result<bool> {
        let meta = std::fs::metadata(&self.path)?;
        let identity = (meta.dev(), meta.ino());
        Ok(self
            .current
            .as_ref()
            .is_some_and(|current| current.identity != identity))
    }

    fn open_current(&mut self, seek_end: bool, now: Instant) -> io::Result<()> {
        let mut file = File::open(&self.path)?;
        let meta = file.metadata()?;
        let identity = (meta.dev(), meta.ino());

        // The path can race back to the file we already hold; do not open
        // the same file twice.
        if let Some(current) = &self.current {
            if current.identity == identity {
                return Ok(());
            }
        }

        if seek_end {
            file.seek(SeekFrom::End(0))?;
        }

        if let Some(previous) = self.current.take() {
            self.rotated.push(RotatedFile {
                tracked: previous.tracked,
                expires_at: now + self.expire_interval,
            });
        }

        self.current = Some(CurrentFile {
            tracked: TrackedFile {
                file,
                partial: Vec::new(),
            },
            identity,
        });
        tracing::debug!(path = %self.path.display(), "opened log file");
        Ok(())
    }
}
