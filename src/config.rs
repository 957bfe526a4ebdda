use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Потолок ёмкости буфера вывода одного блока
pub const MAX_OUTPUT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub status: StatusConfig,
    pub lock: LockConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Разделитель между соседними блоками
    pub delimiter: String,
    /// Длина такта планировщика в секундах
    pub tick_secs: u64,
    /// Сколько байт вывода блока сохраняется (C)
    pub output_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LockConfig {
    pub path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            delimiter: " | ".to_string(),
            tick_secs: 1,
            output_capacity: 25,
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/tmp/dwmblocks.pid"),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("DWMBLOCKS_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    /// Путь к конфигурации по умолчанию: $XDG_CONFIG_HOME/dwmblocks/config.toml
    pub fn default_path() -> PathBuf {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("dwmblocks").join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек статуса
        if self.status.tick_secs == 0 {
            anyhow::bail!("tick_secs должно быть больше 0");
        }

        if self.status.output_capacity == 0 || self.status.output_capacity > MAX_OUTPUT_CAPACITY {
            anyhow::bail!(
                "output_capacity должно быть в диапазоне 1..={}, получено {}",
                MAX_OUTPUT_CAPACITY,
                self.status.output_capacity
            );
        }

        if self.status.delimiter.contains('\0') {
            anyhow::bail!("Разделитель не может содержать NUL");
        }

        if self.lock.path.as_os_str().is_empty() {
            anyhow::bail!("Пустой путь к pid-файлу");
        }

        Ok(())
    }
}
