/// Описание блока, задаётся на этапе сборки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpec {
    /// Программа, чей вывод попадает в статус
    pub command: &'static str,
    /// Программа-обработчик клика (получает номер кнопки)
    pub click: Option<&'static str>,
    /// Период опроса в секундах: 0 - только по сигналу, < 0 - даже не при старте
    pub interval: i32,
    /// Номер сигнала относительно SIGRTMIN, 0 - без сигнала
    pub signal: u8,
}

impl BlockSpec {
    pub const fn new(
        command: &'static str,
        click: Option<&'static str>,
        interval: i32,
        signal: u8,
    ) -> Self {
        Self {
            command,
            click,
            interval,
            signal,
        }
    }
}

/// Путь к скрипту из каталога `blocks/` репозитория.
///
/// The path is absolute and fixed at build time, so an installed binary
/// still runs the scripts from the checkout it was built from. To install
/// elsewhere, copy `blocks/` to a permanent location and list absolute paths
/// to it in [`BLOCKS`] instead of using this macro.
macro_rules! block_path {
    ($name:literal) => {
        concat!(env!("CARGO_MANIFEST_DIR"), "/blocks/", $name)
    };
}

// Порядок блоков - это порядок запуска и порядок в строке статуса.
// Обновить блок вручную: `pkill -RTMIN+<signal> dwmblocks`
pub const BLOCKS: &[BlockSpec] = &[
    BlockSpec::new(block_path!("memory.sh"), None, 10, 0),
    BlockSpec::new(block_path!("volume.sh"), Some(block_path!("volume-click.sh")), 0, 1),
    BlockSpec::new(block_path!("battery.sh"), None, 30, 2),
    BlockSpec::new(block_path!("date.sh"), Some(block_path!("date-click.sh")), 1, 3),
];
