use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use clap::Parser;
use log::{error, info, warn};
use volna_dsp::ExtractorConfig;
use volna_streamer::{create_source, DeviceKind, StreamPipeline, StreamerConfig};

#[derive(Parser, Debug)]
#[command(
    name = "volna-streamer",
    version = env!("CARGO_PKG_VERSION"),
    about = "Capture an audio-line signal and publish EEG band-power snapshots",
    long_about = None,
)]
struct Cli {
    /// Источник звука: sim, default, либо индекс входного устройства
    #[arg(short, long, default_value = "default")]
    device: String,
    /// Частота дискретизации, Гц
    #[arg(short = 'r', long, default_value_t = 44_100)]
    rate: u32,
    /// Фреймов на один блок чтения
    #[arg(long, default_value_t = 4_096)]
    frames: usize,
    /// Количество каналов входного потока
    #[arg(long, default_value_t = 2)]
    channels: usize,
    /// Анализируемый канал (0 = левый/основной)
    #[arg(short, long, default_value_t = 0)]
    channel: usize,
    /// Шумовой порог (16-битная шкала)
    #[arg(short, long, default_value_t = 100)]
    threshold: u16,
    /// Каталог публикации (рабочая копия git-репозитория)
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
    /// Базовый URL сайта для sitemap
    #[arg(long, default_value = "https://volna-stream.github.io")]
    site_url: String,
    /// Пауза между циклами, секунды
    #[arg(short, long, default_value_t = 5)]
    interval: u64,
    /// Ограничение числа циклов. По умолчанию: до Ctrl+C
    #[arg(long)]
    max_cycles: Option<u64>,
    /// Только писать файлы, без git add/commit/push
    #[arg(long)]
    no_push: bool,
    /// Интервал вывода статистики (секунды)
    #[arg(long, default_value_t = 60)]
    stats_interval: u64,
    /// Тихий режим (только ошибки)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.quiet { "error" } else { "info" };

    env_logger::Builder::new()
        .filter_level(level.parse().unwrap())
        .format_target(false)
        .format_timestamp_secs()
        .init();

    let device: DeviceKind = match cli.device.parse() {
        Ok(d) => d,
        Err(e) => {
            error!("--device: {e}");
            std::process::exit(1);
        }
    };

    let extractor = ExtractorConfig {
        sample_rate_hz: cli.rate,
        frames_per_read: cli.frames,
        channels: cli.channels,
        channel: cli.channel,
        silence_threshold: cli.threshold,
        ..Default::default()
    };

    if let Err(e) = extractor.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    let config = StreamerConfig {
        device,
        extractor,
        output_dir: cli.output_dir.clone(),
        site_url: cli.site_url,
        push: !cli.no_push,
        sleep_interval_secs: cli.interval,
        stats_interval_secs: cli.stats_interval,
        max_cycles: cli.max_cycles,
        ..Default::default()
    };

    let source = match create_source(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to open audio source: {e}");
            std::process::exit(1);
        }
    };

    let (pipeline, metrics) = StreamPipeline::new(config.clone());
    let stop_flag: Arc<AtomicBool> = pipeline.stop_flag();
    let stop_ctrlc = stop_flag.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        if stop_ctrlc.swap(true, Ordering::SeqCst) {
            // Второй Ctrl+C — принудительный выход
            warn!("Force exit");
            std::process::exit(130);
        }
        warn!("Ctrl+C received — finishing current cycle and releasing the audio source...");
    }) {
        warn!("Failed to set Ctrl+C handler: {e}");
    }

    // Выводим конфигурацию
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  Device        : {}", config.device);
    info!("  Sample rate   : {} Hz", config.extractor.sample_rate_hz);
    info!(
        "  Block         : {} frames × {} ch, channel {}",
        config.extractor.frames_per_read, config.extractor.channels, config.extractor.channel
    );
    info!("  Threshold     : {}", config.extractor.silence_threshold);
    info!(
        "  Bands         : {}",
        config
            .extractor
            .bands
            .iter()
            .map(|b| b.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!("  Output        : {:?}", config.output_dir);
    info!("  Site URL      : {}", config.site_url);
    info!("  Cadence       : {}s", config.sleep_interval_secs);
    info!("  Push          : {}", config.push);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let session_start = Instant::now();

    match pipeline.run(source) {
        Ok(()) => {}
        Err(e) => {
            error!("Streaming failed: {e}");
            std::process::exit(1);
        }
    }

    // --- Итоговая статистика ---
    let summary = metrics.summary(&session_start);
    info!("\n{summary}");

    if metrics.publish_errors.load(Ordering::Relaxed) > 0 {
        warn!(
            "⚠ {} publish failures. Check that {:?} is a git working copy with push access.",
            metrics.publish_errors.load(Ordering::Relaxed),
            config.output_dir
        );
    }

    info!("✓ Stream finished cleanly");
}
