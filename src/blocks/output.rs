use smallvec::SmallVec;
use std::fmt;

/// Захваченный вывод блока: текст до первого `\n`/`\0`, не длиннее ёмкости буфера
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockOutput {
    bytes: SmallVec<[u8; 32]>,
    truncated: bool,
}

impl BlockOutput {
    /// Построить вывод из сырых байт, прочитанных из канала дочернего процесса.
    ///
    /// Учитываются только первые `capacity` байт; текст обрывается на первом
    /// переводе строки или NUL. Если терминатора в пределах ёмкости нет и буфер
    /// заполнен целиком, вывод помечается как усечённый.
    pub fn from_captured(raw: &[u8], capacity: usize) -> Self {
        let window = &raw[..raw.len().min(capacity)];

        match window.iter().position(|&b| is_terminator(b)) {
            Some(end) => Self {
                bytes: SmallVec::from_slice(&window[..end]),
                truncated: false,
            },
            None => Self {
                bytes: SmallVec::from_slice(window),
                truncated: window.len() == capacity,
            },
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Совпадает ли отображаемый текст (флаг усечения не влияет на статус)
    pub fn same_text(&self, other: &BlockOutput) -> bool {
        self.bytes == other.bytes
    }
}

pub(crate) fn is_terminator(byte: u8) -> bool {
    byte == b'\n' || byte == b'\0'
}

impl fmt::Display for BlockOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", String::from_utf8_lossy(&self.bytes))?;
        if self.truncated {
            write!(f, " (усечено)")?;
        }
        Ok(())
    }
}
