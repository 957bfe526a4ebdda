use crate::error::{Result, StatusError};
use crate::events::StatusEvent;
use crate::trace_if_enabled;
use libc::c_int;
use std::collections::BTreeSet;
use tokio::io::unix::AsyncFd;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use super::layout::{SignalLayout, TERMINATION_SIGNALS};
use super::signalfd::{ignore_signal, SignalFd};

/// Настроенные, но ещё не прослушиваемые сигналы.
///
/// Created before the async runtime starts; turned into a [`SignalListener`]
/// inside it.
#[derive(Debug)]
pub struct SignalSource {
    fd: SignalFd,
    layout: SignalLayout,
}

impl SignalSource {
    /// Заблокировать сигналы клика, блоков и завершения; прочие RT-сигналы игнорировать
    pub fn install(layout: SignalLayout, block_signals: &[u8]) -> Result<Self> {
        let mut handled: BTreeSet<c_int> = block_signals
            .iter()
            .filter(|&&signal| signal != 0)
            .map(|&signal| layout.update_signal(signal))
            .collect();
        handled.insert(layout.click_signal());

        for signal in layout.realtime_range().filter(|s| !handled.contains(s)) {
            ignore_signal(signal)
                .map_err(|e| crate::status_error!(signal, "не удалось игнорировать сигнал {}: {}", signal, e))?;
        }

        let mut blocked: Vec<c_int> = handled.iter().copied().collect();
        blocked.extend(TERMINATION_SIGNALS);

        let fd = SignalFd::block(&blocked)
            .map_err(|e| crate::status_error!(signal, "signalfd: {}", e))?;

        info!(
            "Сигналы настроены: клик на SIGRTMIN, блоки {:?}",
            handled
                .iter()
                .filter(|&&s| s != layout.click_signal())
                .map(|s| format!("SIGRTMIN+{}", s - layout.click_signal()))
                .collect::<Vec<_>>()
        );

        Ok(Self { fd, layout })
    }

    /// Зарегистрировать signalfd в реакторе tokio
    pub fn into_listener(self) -> Result<SignalListener> {
        Ok(SignalListener {
            fd: AsyncFd::new(self.fd)?,
            layout: self.layout,
        })
    }
}

/// Читает сигналы и пересылает их управляющему циклу как события
pub struct SignalListener {
    fd: AsyncFd<SignalFd>,
    layout: SignalLayout,
}

impl SignalListener {
    pub async fn run(mut self, events: UnboundedSender<StatusEvent>) -> Result<()> {
        debug!("SignalListener запущен");

        loop {
            let mut guard = self.fd.readable_mut().await?;

            let info = match guard.get_inner_mut().read_signal() {
                Ok(Some(info)) => info,
                Ok(None) => {
                    guard.clear_ready();
                    continue;
                }
                Err(e) => return Err(StatusError::Io(e)),
            };

            trace_if_enabled!("Получен сигнал {} (code {}, value {})", info.signo, info.code, info.value);

            let Some(event) = self.layout.classify(info.signo, info.code, info.value) else {
                debug!("Игнорируем сигнал {}", info.signo);
                continue;
            };

            if events.send(event).is_err() {
                // Управляющий цикл уже завершился
                debug!("Канал событий закрыт, SignalListener останавливается");
                return Ok(());
            }
        }
    }
}
