use crate::error::Result;
use std::io::{self, Write};
use tracing::info;

use super::r#trait::Publisher;

/// Dry-run: печатает строку статуса в stdout вместо имени корневого окна
pub struct StdoutPublisher<W: Write = io::Stdout> {
    out: W,
}

impl StdoutPublisher {
    pub fn new() -> Self {
        info!("Dry-run режим - статус выводится в stdout");
        Self { out: io::stdout() }
    }
}

#[cfg(test)]
impl<W: Write> StdoutPublisher<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }
}

#[async_trait::async_trait(?Send)]
impl<W: Write> Publisher for StdoutPublisher<W> {
    async fn publish(&mut self, status: &[u8]) -> Result<()> {
        // Переводы строк внутри статуса экранируем, чтобы одна публикация = одна строка
        let line: Vec<u8> = status
            .iter()
            .flat_map(|&b| match b {
                b'\n' => b"\\n".to_vec(),
                other => vec![other],
            })
            .collect();

        self.out.write_all(&line)?;
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_one_line_per_publish() {
        let mut publisher = StdoutPublisher::with_writer(Vec::new());
        publisher.publish(b"a | \nb").await.unwrap();
        publisher.publish(b"").await.unwrap();

        assert_eq!(publisher.out, b"a | \\nb\n\n");
    }
}
