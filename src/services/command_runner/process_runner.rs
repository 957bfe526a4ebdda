use crate::blocks::BlockOutput;
use crate::debug_if_enabled;
use crate::error::{Result, StatusError};
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, trace};

use super::r#trait::CommandRunner;

pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn create_command(path: &str, arg: Option<&str>) -> Command {
        let mut cmd = Command::new(path);
        if let Some(arg) = arg {
            cmd.arg(arg);
        }
        cmd
    }

    /// Дождаться завершения ребёнка в фоне, чтобы не оставлять зомби
    fn reap(path: &str, mut child: Child) {
        let path = path.to_string();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {
                    trace!("'{}' завершился", path);
                }
                Ok(status) => {
                    debug!("'{}' завершился с {}", path, status);
                }
                Err(e) => {
                    debug!("Не удалось дождаться '{}': {}", path, e);
                }
            }
        });
    }
}

#[async_trait::async_trait]
impl CommandRunner for ProcessRunner {
    async fn capture(&self, path: &str, arg: Option<&str>, capacity: usize) -> Result<BlockOutput> {
        let mut child = Self::create_command(path, arg)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| StatusError::spawn(path, e))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| crate::status_error!(internal, "нет stdout у '{}'", path))?;

        // Читаем до заполнения буфера, перевода строки/NUL или конца потока
        let mut buf = vec![0u8; capacity];
        let mut filled = 0;
        while filled < capacity {
            let n = stdout.read(&mut buf[filled..]).await?;
            if n == 0 {
                break;
            }
            let chunk = &buf[filled..filled + n];
            filled += n;
            if chunk.iter().any(|&b| b == b'\n' || b == b'\0') {
                break;
            }
        }

        // Закрываем канал: если ребёнок ещё пишет, он получит SIGPIPE
        drop(stdout);
        Self::reap(path, child);

        let output = BlockOutput::from_captured(&buf[..filled], capacity);
        debug_if_enabled!("'{}' -> {}", path, output);
        Ok(output)
    }

    fn spawn_detached(&self, path: &str, arg: &str) -> Result<()> {
        let mut cmd = Self::create_command(path, Some(arg));
        cmd.stdin(Stdio::null()).stdout(Stdio::null());

        // Обработчик клика живёт в собственной сессии и не держит наш терминал
        // SAFETY: setsid async-signal-safe и не выделяет память
        unsafe {
            cmd.pre_exec(|| nix::unistd::setsid().map(drop).map_err(std::io::Error::from));
        }

        let child = cmd.spawn().map_err(|e| StatusError::spawn(path, e))?;
        debug!("Запущен обработчик клика '{} {}' (pid {:?})", path, arg, child.id());
        Self::reap(path, child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_first_line() {
        let runner = ProcessRunner::new();
        let output = runner.capture("echo", Some("42"), 25).await.unwrap();
        assert_eq!(output.as_bytes(), b"42");
        assert!(!output.is_truncated());
    }

    #[tokio::test]
    async fn test_capture_without_newline() {
        let runner = ProcessRunner::new();
        let output = runner.capture("printf", Some("abc"), 25).await.unwrap();
        assert_eq!(output.as_bytes(), b"abc");
    }

    #[tokio::test]
    async fn test_capture_is_bounded() {
        let runner = ProcessRunner::new();
        let long = "x".repeat(100);
        let output = runner.capture("echo", Some(&long), 25).await.unwrap();
        assert_eq!(output.len(), 25);
        assert!(output.is_truncated());
    }

    #[tokio::test]
    async fn test_capture_endless_output() {
        // yes пишет бесконечно - чтение должно остановиться на первой строке
        let runner = ProcessRunner::new();
        let output = runner.capture("yes", None, 25).await.unwrap();
        assert_eq!(output.as_bytes(), b"y");
    }

    #[tokio::test]
    async fn test_failing_command_is_not_an_error() {
        let runner = ProcessRunner::new();
        let output = runner.capture("false", None, 25).await.unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_missing_program_is_fatal() {
        let runner = ProcessRunner::new();
        let err = runner
            .capture("/nonexistent/dwmblocks-block", None, 25)
            .await
            .unwrap_err();
        assert!(matches!(err, StatusError::Spawn { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_spawn_detached_does_not_wait() {
        let runner = ProcessRunner::new();
        let started = std::time::Instant::now();
        runner.spawn_detached("sleep", "1").unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }
}
