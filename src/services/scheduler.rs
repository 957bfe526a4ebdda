use crate::blocks::Block;
use crate::debug_if_enabled;
use crate::error::{Result, StatusError};
use crate::events::{ClickEvent, StatusEvent};
use crate::services::{CommandRunner, Publisher, StatusComposer};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Статус-бар: блоки, сборщик строки и единственный управляющий цикл.
///
/// Всё состояние блоков меняется только здесь, события сигналов приходят
/// через канал и обрабатываются между тактами.
pub struct StatusBar {
    blocks: Vec<Block>,
    composer: StatusComposer,
    runner: Arc<dyn CommandRunner>,
    publisher: Box<dyn Publisher>,
    tick_secs: u64,
    capacity: usize,
    running: bool,
}

impl StatusBar {
    pub fn new(
        blocks: Vec<Block>,
        composer: StatusComposer,
        runner: Arc<dyn CommandRunner>,
        publisher: Box<dyn Publisher>,
        tick_secs: u64,
        capacity: usize,
    ) -> Self {
        info!(
            "Инициализация StatusBar: {} блоков, такт {}с, буфер {} байт",
            blocks.len(),
            tick_secs,
            capacity
        );

        Self {
            blocks,
            composer,
            runner,
            publisher,
            tick_secs,
            capacity,
            running: true,
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Главный цикл: стартовый прогон, затем опрос по тактам до сигнала завершения
    pub async fn run(&mut self, events: &mut UnboundedReceiver<StatusEvent>) -> Result<()> {
        let mut ticker = interval(Duration::from_secs(self.tick_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Первый тик срабатывает сразу
        ticker.tick().await;

        self.run_startup().await?;
        self.refresh().await?;

        let mut elapsed: u64 = 0;
        loop {
            self.wait_tick(&mut ticker, events).await?;
            elapsed += self.tick_secs;

            if !self.running {
                break;
            }

            self.poll(elapsed).await?;
            self.refresh().await?;
        }

        info!("StatusBar остановлен после {}с работы", elapsed);
        Ok(())
    }

    /// Запустить все блоки с interval >= 0
    pub async fn run_startup(&mut self) -> Result<()> {
        for index in 0..self.blocks.len() {
            if self.blocks[index].runs_at_startup() {
                self.capture(index, None).await?;
            }
        }
        Ok(())
    }

    /// Перезапустить блоки, чей интервал кратен прошедшему времени
    pub async fn poll(&mut self, elapsed: u64) -> Result<()> {
        for index in 0..self.blocks.len() {
            if self.blocks[index].is_due(elapsed) {
                self.capture(index, None).await?;
            }
        }
        Ok(())
    }

    /// Ждать следующего тика, обслуживая события сигналов
    async fn wait_tick(
        &mut self,
        ticker: &mut Interval,
        events: &mut UnboundedReceiver<StatusEvent>,
    ) -> Result<()> {
        loop {
            tokio::select! {
                _ = ticker.tick() => return Ok(()),
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle_event(event).await?;
                        if !self.running {
                            return Ok(());
                        }
                    }
                    None => {
                        // Без слушателя сигналов завершение по SIGTERM невозможно
                        warn!("Канал событий закрыт, останавливаемся");
                        self.running = false;
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Обработать одно событие от диспетчера сигналов
    pub async fn handle_event(&mut self, event: StatusEvent) -> Result<()> {
        debug!("Событие: {}", event);

        match event {
            StatusEvent::Update { signal, value } => {
                let arg = value.map(|v| v.to_string());
                let mut matched = false;

                for index in 0..self.blocks.len() {
                    if i32::from(self.blocks[index].signal()) == signal {
                        matched = true;
                        self.capture(index, arg.as_deref()).await?;
                    }
                }

                if matched {
                    self.refresh().await?;
                } else {
                    debug!("Нет блока для сигнала {}", signal);
                }
            }
            StatusEvent::Click(click) => self.dispatch_click(click)?,
            StatusEvent::Terminate => {
                info!("Получен сигнал завершения");
                self.running = false;
            }
        }

        Ok(())
    }

    fn dispatch_click(&self, click: ClickEvent) -> Result<()> {
        let target = self
            .blocks
            .iter()
            .find(|block| block.signal() != 0 && i32::from(block.signal()) == click.signal);

        match target.and_then(|block| block.click()) {
            Some(handler) => {
                info!("Клик: {} -> {}", click, handler);
                match self.runner.spawn_detached(handler, &click.button_arg()) {
                    // Сломанный обработчик клика не останавливает статус-бар
                    Err(e @ StatusError::Spawn { .. }) => {
                        warn!("{}", e);
                        Ok(())
                    }
                    other => other,
                }
            }
            None => {
                debug!("Клик без обработчика: {}", click);
                Ok(())
            }
        }
    }

    async fn capture(&mut self, index: usize, arg: Option<&str>) -> Result<()> {
        let command = self.blocks[index].command();
        let output = self.runner.capture(command, arg, self.capacity).await?;
        if output.is_truncated() {
            debug!("Вывод блока {} обрезан до {} байт", self.blocks[index], self.capacity);
        }
        debug_if_enabled!("Блок {} обновлён: {}", self.blocks[index], output);
        self.blocks[index].set_output(output);
        Ok(())
    }

    /// Пересобрать строку и опубликовать, если она изменилась
    pub async fn refresh(&mut self) -> Result<()> {
        if !self.composer.compose(&mut self.blocks) {
            return Ok(());
        }

        if let Some(status) = self.composer.pending() {
            self.publisher.publish(status).await?;
            self.composer.mark_published();
        }
        Ok(())
    }

    /// Очистить статус при завершении
    pub async fn clear(&mut self) -> Result<()> {
        self.publisher.publish(b"").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{BlockOutput, BlockSpec};
    use std::sync::Mutex;
    use tokio::sync::mpsc::unbounded_channel;

    #[derive(Default)]
    struct Calls {
        captures: Vec<(String, Option<String>)>,
        clicks: Vec<(String, String)>,
    }

    /// Фейковый раннер: выводит "<путь>#<номер вызова>"
    #[derive(Default, Clone)]
    struct FakeRunner {
        calls: Arc<Mutex<Calls>>,
    }

    impl FakeRunner {
        fn captures_of(&self, path: &str) -> usize {
            let calls = self.calls.lock().unwrap();
            calls.captures.iter().filter(|(p, _)| p == path).count()
        }
    }

    #[async_trait::async_trait]
    impl CommandRunner for FakeRunner {
        async fn capture(&self, path: &str, arg: Option<&str>, capacity: usize) -> Result<BlockOutput> {
            let mut calls = self.calls.lock().unwrap();
            calls.captures.push((path.to_string(), arg.map(str::to_string)));
            let text = format!("{}#{}\n", path, calls.captures.len());
            Ok(BlockOutput::from_captured(text.as_bytes(), capacity))
        }

        fn spawn_detached(&self, path: &str, arg: &str) -> Result<()> {
            let mut calls = self.calls.lock().unwrap();
            calls.clicks.push((path.to_string(), arg.to_string()));
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    struct FakePublisher {
        published: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    #[async_trait::async_trait(?Send)]
    impl Publisher for FakePublisher {
        async fn publish(&mut self, status: &[u8]) -> Result<()> {
            self.published.lock().unwrap().push(status.to_vec());
            Ok(())
        }
    }

    fn bar(specs: &[BlockSpec]) -> (StatusBar, FakeRunner, FakePublisher) {
        let runner = FakeRunner::default();
        let publisher = FakePublisher::default();
        let blocks = specs.iter().copied().map(Block::new).collect();
        let bar = StatusBar::new(
            blocks,
            StatusComposer::new(" | "),
            Arc::new(runner.clone()),
            Box::new(publisher.clone()),
            1,
            25,
        );
        (bar, runner, publisher)
    }

    #[tokio::test]
    async fn test_startup_skips_negative_interval() {
        let (mut bar, runner, _) = bar(&[
            BlockSpec::new("a", None, 5, 0),
            BlockSpec::new("b", None, 0, 1),
            BlockSpec::new("c", None, -1, 2),
        ]);

        bar.run_startup().await.unwrap();
        assert_eq!(runner.captures_of("a"), 1);
        assert_eq!(runner.captures_of("b"), 1);
        assert_eq!(runner.captures_of("c"), 0);
    }

    #[tokio::test]
    async fn test_signal_only_block_never_polled() {
        let (mut bar, runner, _) = bar(&[BlockSpec::new("vol", None, 0, 3)]);

        for elapsed in 1..=10 {
            bar.poll(elapsed).await.unwrap();
        }
        assert_eq!(runner.captures_of("vol"), 0);

        bar.handle_event(StatusEvent::Update { signal: 3, value: None })
            .await
            .unwrap();
        assert_eq!(runner.captures_of("vol"), 1);
    }

    #[tokio::test]
    async fn test_update_passes_signal_value() {
        let (mut bar, runner, publisher) = bar(&[
            BlockSpec::new("a", None, 1, 3),
            BlockSpec::new("b", None, 1, 4),
        ]);

        bar.handle_event(StatusEvent::Update { signal: 3, value: Some(7) })
            .await
            .unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.captures, vec![("a".to_string(), Some("7".to_string()))]);
        // Обновление сразу публикуется
        assert_eq!(publisher.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_click_runs_handler_with_button() {
        let (mut bar, runner, publisher) = bar(&[
            BlockSpec::new("date", Some("date-click"), 1, 1),
            BlockSpec::new("vol", Some("vol-click"), 0, 2),
        ]);

        let click = ClickEvent::decode(0x0203);
        bar.handle_event(StatusEvent::Click(click)).await.unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.clicks, vec![("vol-click".to_string(), "3".to_string())]);
        // Клик не трогает вывод блоков
        assert!(calls.captures.is_empty());
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_click_without_handler_is_ignored() {
        let (mut bar, runner, _) = bar(&[BlockSpec::new("bat", None, 1, 2)]);

        bar.handle_event(StatusEvent::Click(ClickEvent::decode(0x0201)))
            .await
            .unwrap();
        bar.handle_event(StatusEvent::Click(ClickEvent::decode(0x0901)))
            .await
            .unwrap();

        assert!(runner.calls.lock().unwrap().clicks.is_empty());
    }

    #[tokio::test]
    async fn test_missing_click_handler_keeps_running() {
        let publisher = FakePublisher::default();
        let blocks = vec![Block::new(BlockSpec::new(
            "/bin/true",
            Some("/nonexistent/click.sh"),
            1,
            2,
        ))];
        let mut bar = StatusBar::new(
            blocks,
            StatusComposer::new(" | "),
            crate::services::create_command_runner(),
            Box::new(publisher.clone()),
            1,
            25,
        );

        bar.handle_event(StatusEvent::Click(ClickEvent::decode(0x0203)))
            .await
            .unwrap();
        assert!(bar.is_running());

        // Цикл продолжает обслуживать события после неудачного клика
        bar.handle_event(StatusEvent::Update { signal: 2, value: None })
            .await
            .unwrap();
        assert!(bar.is_running());
    }

    #[tokio::test]
    async fn test_truncated_output_is_published_cut() {
        let (mut bar, _, publisher) = bar(&[BlockSpec::new("a-very-long-block-command-name", None, 1, 0)]);

        bar.run_startup().await.unwrap();
        bar.refresh().await.unwrap();

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.as_slice(), &[b"a-very-long-block-command".to_vec()]);
    }

    #[tokio::test]
    async fn test_refresh_publishes_only_changes() {
        let (mut bar, _, publisher) = bar(&[BlockSpec::new("a", None, 1, 0)]);

        bar.refresh().await.unwrap();
        assert!(publisher.published.lock().unwrap().is_empty());

        bar.run_startup().await.unwrap();
        bar.refresh().await.unwrap();
        bar.refresh().await.unwrap();

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.as_slice(), &[b"a#1".to_vec()]);
    }

    #[tokio::test]
    async fn test_terminate_before_first_tick() {
        let (mut bar, runner, publisher) = bar(&[BlockSpec::new("a", None, 1, 0)]);
        let (tx, mut rx) = unbounded_channel();
        tx.send(StatusEvent::Terminate).unwrap();

        bar.run(&mut rx).await.unwrap();

        assert!(!bar.is_running());
        assert_eq!(runner.captures_of("a"), 1);
        assert_eq!(publisher.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_channel_stops_loop() {
        let (mut bar, runner, _) = bar(&[BlockSpec::new("a", None, 1, 0)]);
        let (tx, mut rx) = unbounded_channel::<StatusEvent>();
        drop(tx);

        bar.run(&mut rx).await.unwrap();
        assert!(!bar.is_running());
        assert_eq!(runner.captures_of("a"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_schedule_over_ten_ticks() {
        let (mut bar, runner, _) = bar(&[
            BlockSpec::new("every2", None, 2, 0),
            BlockSpec::new("signal", None, 0, 3),
        ]);
        let (tx, mut rx) = unbounded_channel();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10_500)).await;
            tx.send(StatusEvent::Terminate).unwrap();
        });

        bar.run(&mut rx).await.unwrap();

        // Старт + отметки 2, 4, 6, 8, 10
        assert_eq!(runner.captures_of("every2"), 6);
        // Только стартовый прогон
        assert_eq!(runner.captures_of("signal"), 1);
    }
}
