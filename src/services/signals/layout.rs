use crate::events::{ClickEvent, StatusEvent};
use libc::c_int;

/// si_code для сигналов, отправленных через sigqueue(3)
const SI_QUEUE: i32 = -1;

/// Сигналы завершения работы
pub const TERMINATION_SIGNALS: [c_int; 3] = [libc::SIGINT, libc::SIGHUP, libc::SIGTERM];

/// Раскладка сигналов реального времени: клик на SIGRTMIN, блоки на SIGRTMIN+N
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalLayout {
    base: c_int,
    max: c_int,
}

impl SignalLayout {
    pub fn new(base: c_int, max: c_int) -> Self {
        Self { base, max }
    }

    /// Раскладка текущей платформы
    pub fn current() -> Self {
        Self::new(libc::SIGRTMIN(), libc::SIGRTMAX())
    }

    pub fn click_signal(&self) -> c_int {
        self.base
    }

    pub fn update_signal(&self, signal: u8) -> c_int {
        self.base + c_int::from(signal)
    }

    /// Наибольший номер сигнала блока
    pub fn max_block_signal(&self) -> c_int {
        self.max - self.base
    }

    /// Все номера сигналов реального времени
    pub fn realtime_range(&self) -> std::ops::RangeInclusive<c_int> {
        self.base..=self.max
    }

    /// Перевести доставленный сигнал в событие; `None` - сигнал игнорируется
    pub fn classify(&self, signo: c_int, code: i32, value: i32) -> Option<StatusEvent> {
        if TERMINATION_SIGNALS.contains(&signo) {
            return Some(StatusEvent::Terminate);
        }

        if signo == self.click_signal() {
            return Some(StatusEvent::Click(ClickEvent::decode(value)));
        }

        if signo > self.base && signo <= self.max {
            return Some(StatusEvent::Update {
                signal: signo - self.base,
                value: (code == SI_QUEUE).then_some(value),
            });
        }

        None
    }
}
