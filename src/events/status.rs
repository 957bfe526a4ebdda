use std::fmt;

/// Событие для управляющего цикла статус-бара
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    /// Перезапустить блоки с данным номером сигнала
    Update {
        signal: i32,
        /// Значение, переданное через sigqueue (None для обычного kill)
        value: Option<i32>,
    },
    /// Клик мышью по блоку в баре dwm
    Click(ClickEvent),
    /// SIGINT / SIGHUP / SIGTERM
    Terminate,
}

/// Клик по блоку: кнопка мыши и номер сигнала целевого блока
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClickEvent {
    pub button: u8,
    pub signal: i32,
}

impl ClickEvent {
    /// Разобрать полезную нагрузку сигнала клика: биты 0-7 - кнопка, остальные - сигнал блока
    pub fn decode(payload: i32) -> Self {
        Self {
            button: (payload & 0xff) as u8,
            signal: payload >> 8,
        }
    }

    #[cfg(test)]
    pub fn encode(&self) -> i32 {
        (self.signal << 8) | i32::from(self.button)
    }

    /// Аргумент для обработчика клика
    pub fn button_arg(&self) -> String {
        self.button.to_string()
    }
}

impl fmt::Display for ClickEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "кнопка {} по блоку с сигналом {}", self.button, self.signal)
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Update { signal, value: Some(value) } => {
                write!(f, "обновление сигнала {} (значение {})", signal, value)
            }
            StatusEvent::Update { signal, value: None } => write!(f, "обновление сигнала {}", signal),
            StatusEvent::Click(click) => write!(f, "клик: {}", click),
            StatusEvent::Terminate => write!(f, "завершение"),
        }
    }
}
