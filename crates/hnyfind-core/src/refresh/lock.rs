use std::fs::{File, OpenOptions};
use std::path::Path;

use fs2::FileExt;

const LOCK_FILE: &str = "download.lock";

/// Exclusive advisory lock held for the duration of a download.
///
/// Released when dropped, or by the OS if the process dies.
pub struct DownloadLock {
    file: File,
}

impl Drop for DownloadLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl DownloadLock {
    /// Take the lock without blocking. `Ok(None)` if another process holds it.
    pub fn try_acquire(dir: &Path) -> std::io::Result<Option<Self>> {
        std::fs::create_dir_all(dir)?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { file })),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused() {
        let dir = tempfile::TempDir::new().unwrap();

        let first = DownloadLock::try_acquire(dir.path()).unwrap();
        assert!(first.is_some());
        assert!(DownloadLock::try_acquire(dir.path()).unwrap().is_none());

        drop(first);
        assert!(DownloadLock::try_acquire(dir.path()).unwrap().is_some());
    }
}
