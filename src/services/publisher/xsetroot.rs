use crate::error::{Result, StatusError};
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::r#trait::Publisher;

/// Публикация через внешнюю утилиту `xsetroot -name`
pub struct XsetrootPublisher {
    program: String,
    display: String,
}

impl XsetrootPublisher {
    pub fn connect() -> Result<Self> {
        let name = std::env::var("DISPLAY")
            .ok()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| StatusError::Display("переменная DISPLAY не задана".to_string()))?;

        info!(display = %name, "Статус публикуется через xsetroot");
        Ok(Self::with_program("xsetroot", name))
    }

    /// Публикатор с другой программой вместо `xsetroot`
    pub fn with_program(program: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            display: display.into(),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Publisher for XsetrootPublisher {
    async fn publish(&mut self, status: &[u8]) -> Result<()> {
        let result = Command::new(&self.program)
            .arg("-display")
            .arg(&self.display)
            .arg("-name")
            .arg(OsStr::from_bytes(status))
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| StatusError::spawn(&self.program, e))?;

        if result.success() {
            debug!("xsetroot обновил имя корневого окна");
        } else {
            warn!("{} вернул {}", self.program, result);
        }
        Ok(())
    }
}
