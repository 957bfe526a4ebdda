use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, error, info, warn};
mod blocks;
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use error::{Result, StatusError};
use services::{
    create_command_runner,
    create_publisher,
    SignalLayout,
    SignalSource,
    StatusBar,
    StatusComposer,
};

#[derive(Parser, Debug)]
#[command(name = "dwmblocks", version)]
#[command(about = "Модульный статус-бар для dwm")]
#[command(ignore_errors = true)]
struct Args {
    /// Разделитель между блоками
    #[arg(short = 'd', allow_hyphen_values = true)]
    delimiter: Option<String>,

    /// Путь к файлу конфигурации
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Режим сухого запуска (статус печатается в stdout)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long)]
    log_level: Option<String>,

    /// Прочие аргументы игнорируются
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    ignored: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Загрузка конфигурации
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(1);
        }
    };

    // Инициализация системы логирования
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    if let Err(e) = init_tracing(level, &config.logging.format) {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(report_error(&e, &mut std::io::stderr())),
    }
}

/// Одна строка `Error: ...` в stderr независимо от уровня логирования
fn report_error(e: &StatusError, out: &mut impl Write) -> u8 {
    match e {
        StatusError::AlreadyRunning => {
            let _ = writeln!(out, "Error: {}.", e);
        }
        _ => {
            error!("{}", e);
            let _ = writeln!(out, "Error: {}", e);
        }
    }
    e.exit_code()
}

fn run(args: &Args, config: &Config) -> Result<()> {
    info!("Запуск dwmblocks v{}", env!("CARGO_PKG_VERSION"));
    if !args.ignored.is_empty() {
        debug!("Игнорируем аргументы: {:?}", args.ignored);
    }

    // Единственный экземпляр: блокировка держится до конца run()
    let lock = utils::PidLock::acquire(&config.lock.path)?;
    debug!("pid-файл {} захвачен", lock.path().display());

    let layout = SignalLayout::current();
    let blocks = blocks::build_blocks(blocks::BLOCKS, layout.max_block_signal())?;
    let block_signals: Vec<u8> = blocks.iter().map(|block| block.signal()).collect();

    // До создания любых потоков: маску сигналов унаследуют все потоки runtime
    let signals = SignalSource::install(layout, &block_signals)?;

    let publisher = create_publisher(args.dry_run)?;
    let delimiter = args
        .delimiter
        .clone()
        .unwrap_or_else(|| config.status.delimiter.clone());

    if args.dry_run {
        warn!("Режим сухого запуска - корневое окно не изменяется");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let listener = signals.into_listener()?;
        let (tx, mut rx) = unbounded_channel();
        let listener_handle = tokio::spawn(listener.run(tx));

        let mut bar = StatusBar::new(
            blocks,
            StatusComposer::new(delimiter),
            create_command_runner(),
            publisher,
            config.status.tick_secs,
            config.status.output_capacity,
        );

        info!("Все компоненты инициализированы");
        let result = bar.run(&mut rx).await;

        listener_handle.abort();
        let listener_result = listener_handle.await;

        // Статус очищаем в любом случае, чтобы в баре не осталась устаревшая строка
        if let Err(e) = bar.clear().await {
            warn!("Не удалось очистить статус: {}", e);
        }

        result?;
        if let Ok(Err(e)) = listener_result {
            return Err(e);
        }
        Ok::<(), StatusError>(())
    })?;

    info!("dwmblocks завершил работу");
    Ok(())
}

fn init_tracing(level: &str, format: &str) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    // stdout занят dry-run публикацией, логи идут в stderr
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "full" => registry.with(layer).try_init()?,
        _ => registry.with(layer.compact()).try_init()?,
    }

    Ok(())
}
