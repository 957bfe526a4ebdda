use libc::c_int;
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::ptr;

/// Неблокирующий signalfd(2) для набора заблокированных сигналов.
///
/// nix's `SigSet` cannot hold realtime signals, so the mask is built with
/// libc directly.
#[derive(Debug)]
pub struct SignalFd {
    fd: OwnedFd,
}

/// Полезная часть signalfd_siginfo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalInfo {
    pub signo: c_int,
    pub code: i32,
    pub value: i32,
}

impl SignalFd {
    /// Заблокировать `signals` в вызывающем потоке и открыть для них signalfd.
    ///
    /// Must run on the main thread before any other thread is started, so
    /// every later thread inherits the mask.
    pub fn block(signals: &[c_int]) -> io::Result<Self> {
        // SAFETY: sigset_t инициализируется sigemptyset до использования
        let mut mask: libc::sigset_t = unsafe { mem::zeroed() };
        unsafe { libc::sigemptyset(&mut mask) };
        for &signal in signals {
            if unsafe { libc::sigaddset(&mut mask, signal) } == -1 {
                return Err(io::Error::last_os_error());
            }
        }

        let rc = unsafe { libc::pthread_sigmask(libc::SIG_BLOCK, &mask, ptr::null_mut()) };
        if rc != 0 {
            return Err(io::Error::from_raw_os_error(rc));
        }

        let fd = unsafe { libc::signalfd(-1, &mask, libc::SFD_NONBLOCK | libc::SFD_CLOEXEC) };
        if fd == -1 {
            return Err(io::Error::last_os_error());
        }

        // SAFETY: fd только что получен от signalfd и больше никому не принадлежит
        Ok(Self {
            fd: unsafe { OwnedFd::from_raw_fd(fd) },
        })
    }

    /// Прочитать один сигнал; `Ok(None)`, если очередь пуста
    pub fn read_signal(&mut self) -> io::Result<Option<SignalInfo>> {
        let mut info: libc::signalfd_siginfo = unsafe { mem::zeroed() };
        let size = mem::size_of::<libc::signalfd_siginfo>();

        let n = unsafe {
            libc::read(
                self.fd.as_raw_fd(),
                (&mut info as *mut libc::signalfd_siginfo).cast(),
                size,
            )
        };

        if n == -1 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::WouldBlock => Ok(None),
                io::ErrorKind::Interrupted => Ok(None),
                _ => Err(err),
            };
        }

        if n as usize != size {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("signalfd: прочитано {} байт из {}", n, size),
            ));
        }

        Ok(Some(SignalInfo {
            signo: info.ssi_signo as c_int,
            code: info.ssi_code,
            value: info.ssi_int,
        }))
    }
}

impl AsRawFd for SignalFd {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

/// Явно игнорировать сигнал (SIG_IGN), чтобы он не завершил процесс
pub fn ignore_signal(signal: c_int) -> io::Result<()> {
    if unsafe { libc::signal(signal, libc::SIG_IGN) } == libc::SIG_ERR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
