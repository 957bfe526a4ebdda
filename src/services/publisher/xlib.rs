use crate::error::{Result, StatusError};
use std::ffi::CString;
use std::ptr::{self, NonNull};
use tracing::{debug, info};
use x11::xlib;

use super::r#trait::Publisher;

/// Публикация напрямую в WM_NAME корневого окна через Xlib
pub struct XlibPublisher {
    display: NonNull<xlib::Display>,
    root: xlib::Window,
}

impl XlibPublisher {
    pub fn connect() -> Result<Self> {
        // SAFETY: NULL означает дисплей из переменной DISPLAY
        let display = NonNull::new(unsafe { xlib::XOpenDisplay(ptr::null()) })
            .ok_or_else(|| StatusError::Display("could not open display".to_string()))?;

        // Соединение с X не должно наследоваться блоками и обработчиками кликов
        let fd = unsafe { xlib::XConnectionNumber(display.as_ptr()) };
        if unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) } == -1 {
            let err = std::io::Error::last_os_error();
            unsafe { xlib::XCloseDisplay(display.as_ptr()) };
            return Err(StatusError::Io(err));
        }

        let root = unsafe { xlib::XDefaultRootWindow(display.as_ptr()) };
        info!("Подключено к X-серверу (fd {})", fd);

        Ok(Self { display, root })
    }
}

#[async_trait::async_trait(?Send)]
impl Publisher for XlibPublisher {
    async fn publish(&mut self, status: &[u8]) -> Result<()> {
        let name = CString::new(status)
            .map_err(|_| crate::status_error!(internal, "NUL внутри строки статуса"))?;

        // SAFETY: display открыт до Drop, name живёт до конца вызова
        unsafe {
            xlib::XStoreName(self.display.as_ptr(), self.root, name.as_ptr());
            xlib::XFlush(self.display.as_ptr());
        }
        debug!("WM_NAME корневого окна обновлён ({} байт)", status.len());
        Ok(())
    }
}

impl Drop for XlibPublisher {
    fn drop(&mut self) {
        unsafe {
            xlib::XCloseDisplay(self.display.as_ptr());
        }
        info!("Соединение с X-сервером закрыто");
    }
}
