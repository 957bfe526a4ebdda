use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Не удалось запустить '{path}': {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Ошибка настройки сигналов: {0}")]
    Signal(String),

    #[error("Нет соединения с дисплеем: {0}")]
    Display(String),

    #[error("Ошибка pid-файла {path}: {reason}")]
    Lock { path: String, reason: String },

    #[error("another instance of dwmblocks is already running")]
    AlreadyRunning,

    #[error("Неверный блок #{index}: {reason}")]
    Registry { index: usize, reason: String },

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl StatusError {
    /// Код завершения процесса для данной ошибки
    pub fn exit_code(&self) -> u8 {
        match self {
            StatusError::AlreadyRunning => 2,
            _ => 1,
        }
    }

    pub fn spawn(path: impl Into<String>, source: std::io::Error) -> Self {
        StatusError::Spawn {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StatusError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! status_error {
    (signal, $($arg:tt)*) => {
        $crate::error::StatusError::Signal(format!($($arg)*))
    };
    (display, $($arg:tt)*) => {
        $crate::error::StatusError::Display(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::StatusError::Internal(format!($($arg)*))
    };
}
