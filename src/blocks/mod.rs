//! Blocks: the static registry and the per-block output state.
//!
//! A block's `current` output is written only by the capture path of the
//! status bar, its `previous` output only by the composer. Both run on the
//! single control loop.

mod output;
pub mod registry;

pub use output::BlockOutput;
pub use registry::{BlockSpec, BLOCKS};

use crate::error::{Result, StatusError};
use std::fmt;

/// Блок статус-бара: неизменяемое описание плюс состояние вывода
#[derive(Debug, Clone)]
pub struct Block {
    spec: BlockSpec,
    current: BlockOutput,
    previous: BlockOutput,
}

impl Block {
    pub fn new(spec: BlockSpec) -> Self {
        Self {
            spec,
            current: BlockOutput::default(),
            previous: BlockOutput::default(),
        }
    }

    pub fn command(&self) -> &'static str {
        self.spec.command
    }

    pub fn click(&self) -> Option<&'static str> {
        self.spec.click
    }

    pub fn signal(&self) -> u8 {
        self.spec.signal
    }

    /// Запускается ли блок при старте (interval >= 0)
    pub fn runs_at_startup(&self) -> bool {
        self.spec.interval >= 0
    }

    /// Должен ли планировщик перезапустить блок на отметке `elapsed` секунд
    pub fn is_due(&self, elapsed: u64) -> bool {
        match u64::try_from(self.spec.interval) {
            Ok(interval) if interval > 0 => elapsed % interval == 0,
            _ => false,
        }
    }

    /// Байт-маркер, по которому dwm маршрутизирует клик обратно в блок
    pub fn click_marker(&self) -> Option<u8> {
        match (self.spec.click, self.spec.signal) {
            (Some(_), signal) if signal != 0 => Some(signal),
            _ => None,
        }
    }

    pub fn current(&self) -> &BlockOutput {
        &self.current
    }

    pub fn set_output(&mut self, output: BlockOutput) {
        self.current = output;
    }

    /// Изменился ли вывод с момента последней сборки статуса
    pub fn is_dirty(&self) -> bool {
        !self.current.same_text(&self.previous)
    }

    /// Зафиксировать текущий вывод как базовый для следующего сравнения
    pub fn commit(&mut self) {
        self.previous = self.current.clone();
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec.command)?;
        if self.spec.signal != 0 {
            write!(f, " [sig {}]", self.spec.signal)?;
        }
        Ok(())
    }
}

/// Построить блоки из реестра, проверив описания.
///
/// `max_signal` is the largest block signal id the platform can deliver
/// (`SIGRTMAX - SIGRTMIN`).
pub fn build_blocks(specs: &[BlockSpec], max_signal: i32) -> Result<Vec<Block>> {
    for (index, spec) in specs.iter().enumerate() {
        if spec.command.is_empty() {
            return Err(StatusError::Registry {
                index,
                reason: "пустой путь команды".to_string(),
            });
        }

        if spec.click.is_some_and(str::is_empty) {
            return Err(StatusError::Registry {
                index,
                reason: "пустой путь обработчика клика".to_string(),
            });
        }

        if i32::from(spec.signal) > max_signal {
            return Err(StatusError::Registry {
                index,
                reason: format!(
                    "сигнал {} вне диапазона SIGRTMIN+1..=SIGRTMIN+{}",
                    spec.signal, max_signal
                ),
            });
        }
    }

    Ok(specs.iter().copied().map(Block::new).collect())
}
