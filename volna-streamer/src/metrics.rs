use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

/// Счётчики сессии, обновляемые atomics-ами.
#[derive(Debug, Default)]
pub struct StreamerMetrics {
    /// Всего циклов (включая тихие и сбойные)
    pub cycles: AtomicU64,
    /// Записанных snapshot-ов (json + sitemap)
    pub snapshots_published: AtomicU64,
    /// Циклов, погашенных шумовым порогом
    pub silent_cycles: AtomicU64,
    /// Преходящих сбоев чтения
    pub read_errors: AtomicU64,
    /// Сбоев git-публикации
    pub publish_errors: AtomicU64,
    /// Успешных git push
    pub pushes: AtomicU64,
}

/// Snapshot метрик для отображения / тестирования.
#[derive(Debug, Clone)]
pub struct StreamerSummary {
    pub duration_secs: f64,
    pub cycles: u64,
    pub snapshots_published: u64,
    pub silent_cycles: u64,
    pub read_errors: u64,
    pub publish_errors: u64,
    pub pushes: u64,
    pub publish_rate_pct: f64,
}

impl StreamerMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Доля циклов, завершившихся публикацией (0.0-100.0).
    pub fn publish_rate_pct(&self) -> f64 {
        let cycles = self.cycles.load(Ordering::Relaxed);
        let published = self.snapshots_published.load(Ordering::Relaxed);

        if cycles == 0 {
            0.0
        } else {
            published as f64 / cycles as f64 * 100.0
        }
    }

    /// Итоговая сводка для вывода в конце сессии.
    pub fn summary(
        &self,
        start: &Instant,
    ) -> StreamerSummary {
        StreamerSummary {
            duration_secs: start.elapsed().as_secs_f64(),
            cycles: self.cycles.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
            silent_cycles: self.silent_cycles.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            publish_errors: self.publish_errors.load(Ordering::Relaxed),
            pushes: self.pushes.load(Ordering::Relaxed),
            publish_rate_pct: self.publish_rate_pct(),
        }
    }
}

impl std::fmt::Display for StreamerSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration        : {:.1}s", self.duration_secs)?;
        writeln!(f, "  Cycles          : {}", self.cycles)?;
        writeln!(
            f,
            "  Published       : {} ({:.1}%)",
            self.snapshots_published, self.publish_rate_pct
        )?;
        writeln!(f, "  Silent cycles   : {}", self.silent_cycles)?;
        writeln!(f, "  Read errors     : {}", self.read_errors)?;
        writeln!(f, "  Publish errors  : {}", self.publish_errors)?;
        writeln!(f, "  Pushes          : {}", self.pushes)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}
