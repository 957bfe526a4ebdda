use crate::error::{Result, StatusError};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Pid-файл с эксклюзивной блокировкой: гарантирует единственный экземпляр
pub struct PidLock {
    path: PathBuf,
    _file: Flock<File>,
}

impl PidLock {
    /// Захватить блокировку и записать PID.
    ///
    /// The file is truncated only after the lock is held, so a refused second
    /// instance leaves the running instance's PID in place.
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let lock_error = |reason: String| StatusError::Lock {
            path: path.display().to_string(),
            reason,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o644)
            .open(path)
            .map_err(|e| lock_error(e.to_string()))?;

        let file = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(file) => file,
            Err((_, Errno::EAGAIN)) => return Err(StatusError::AlreadyRunning),
            Err((_, errno)) => return Err(lock_error(errno.to_string())),
        };

        file.set_len(0).map_err(|e| lock_error(e.to_string()))?;
        let mut writer: &File = &file;
        write!(writer, "{}", std::process::id()).map_err(|e| lock_error(e.to_string()))?;

        debug!("Pid-файл {} захвачен", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidLock {
    fn drop(&mut self) {
        // Удаляем файл, пока блокировка ещё держится
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Не удалось удалить pid-файл {}: {}", self.path.display(), e);
        }
        debug!("Pid-файл {} освобождён", self.path.display());
    }
}
