use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use volna_dsp::BandPowerExtractor;

use crate::{
    device::AudioSource, metrics::StreamerMetrics, SnapshotPublisher, StreamerConfig,
    StreamerResult,
};

/// Оркестрирует сессию стриминга: цикл чтение → анализ → публикация
/// с фиксированной паузой между циклами.
///
/// Сам по себе ничего не считает — вся математика в
/// [`BandPowerExtractor`], вся запись в [`SnapshotPublisher`].
pub struct StreamPipeline {
    config: StreamerConfig,
    metrics: Arc<StreamerMetrics>,
    stop_flag: Arc<AtomicBool>,
}

impl StreamPipeline {
    /// Создаёт pipeline. Возвращает также shared-ссылку на метрики.
    pub fn new(config: StreamerConfig) -> (Self, Arc<StreamerMetrics>) {
        let metrics = StreamerMetrics::new();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let p = Self {
            config,
            metrics: metrics.clone(),
            stop_flag,
        };

        (p, metrics)
    }

    /// Флаг остановки. Устанавливается в `true` для graceful shutdown.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Запускает стриминг. Блокируется до завершения.
    ///
    /// Источник освобождается ровно один раз на любом пути выхода:
    /// штатное завершение, stop_flag или ошибка цикла.
    pub fn run(
        self,
        mut source: Box<dyn AudioSource>,
    ) -> StreamerResult<()> {
        let info = source.info();

        info!(
            "Starting stream: {} @ {} Hz, {} ch, {} frames/read",
            info.name, info.sample_rate_hz, info.channels, info.frames_per_read
        );

        info!(
            "Output: {:?}, cadence: {}s, push: {}",
            self.config.output_dir, self.config.sleep_interval_secs, self.config.push
        );

        let result = self.cycle_loop(source.as_mut());

        source.stop();

        result
    }

    fn cycle_loop(
        &self,
        source: &mut dyn AudioSource,
    ) -> StreamerResult<()> {
        let cfg = &self.config;
        let metrics = &self.metrics;

        let extractor = BandPowerExtractor::new(cfg.extractor.clone())?;
        let publisher = SnapshotPublisher::new(cfg);

        let stats_interval = Duration::from_secs(cfg.stats_interval_secs);
        let session_start = Instant::now();
        let mut last_stats = Instant::now();
        let mut cycle: u64 = 0;

        loop {
            //  Проверяем внешний stop_flag (Ctrl+C)
            if self.stop_flag.load(Ordering::Relaxed) {
                info!("Stop signal received. Shutting down...");
                break;
            }

            //  Проверяем ограничение по числу циклов
            if let Some(max) = cfg.max_cycles {
                if cycle >= max {
                    info!("Cycle limit reached ({max}). Shutting down...");
                    break;
                }
            }

            cycle += 1;
            metrics.cycles.fetch_add(1, Ordering::Relaxed);

            match source.read_block() {
                Ok(block) => match extractor.extract(&block)? {
                    Some(reading) => {
                        let timestamp = SnapshotPublisher::utc_timestamp();

                        publisher.write_snapshot(&reading, &timestamp)?;
                        publisher.write_sitemap(&timestamp)?;
                        metrics.snapshots_published.fetch_add(1, Ordering::Relaxed);

                        info!(
                            "Heartbeat {timestamp}: dominant band = {}",
                            reading.dominant_band().unwrap_or("-")
                        );

                        if cfg.push {
                            match publisher.git_sync() {
                                Ok(()) => {
                                    metrics.pushes.fetch_add(1, Ordering::Relaxed);
                                }
                                Err(e) => {
                                    // Не прерываем — следующий цикл
                                    // запушит свежий snapshot
                                    metrics.publish_errors.fetch_add(1, Ordering::Relaxed);
                                    warn!("Publish failed: {e}");
                                }
                            }
                        }
                    }
                    None => {
                        metrics.silent_cycles.fetch_add(1, Ordering::Relaxed);
                        debug!("Cycle {cycle}: silence, nothing to publish");
                    }
                },
                // Transient-сбой чтения равнозначен тишине; пауза
                // между циклами — его backoff
                Err(e) if e.is_transient() => {
                    metrics.read_errors.fetch_add(1, Ordering::Relaxed);
                    debug!("Cycle {cycle}: transient read failure: {e}");
                }
                Err(e) => return Err(e.into()),
            }

            if last_stats.elapsed() >= stats_interval {
                self.log_progress(&session_start);
                last_stats = Instant::now();
            }

            self.sleep_between_cycles();
        }

        Ok(())
    }

    /// Фиксированная пауза между циклами, прерываемая stop_flag.
    fn sleep_between_cycles(&self) {
        let total = Duration::from_secs(self.config.sleep_interval_secs);
        let start = Instant::now();

        while start.elapsed() < total {
            if self.stop_flag.load(Ordering::Relaxed) {
                return;
            }

            let left = total - start.elapsed();
            thread::sleep(left.min(Duration::from_millis(100)));
        }
    }

    fn log_progress(
        &self,
        start: &Instant,
    ) {
        let m = &self.metrics;

        info!(
            "[ {:.0}s ] cycles={} published={} silent={} read_errors={} publish_errors={}",
            start.elapsed().as_secs_f64(),
            m.cycles.load(Ordering::Relaxed),
            m.snapshots_published.load(Ordering::Relaxed),
            m.silent_cycles.load(Ordering::Relaxed),
            m.read_errors.load(Ordering::Relaxed),
            m.publish_errors.load(Ordering::Relaxed),
        );
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
