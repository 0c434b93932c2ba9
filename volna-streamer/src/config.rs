use std::path::PathBuf;

use volna_dsp::ExtractorConfig;

/// Источник звука (выбор при старте).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Встроенный симулятор (не требует звуковой карты).
    Simulated,
    /// Входное устройство по умолчанию.
    Default,
    /// Входное устройство по индексу в списке хоста.
    Index(usize),
}

/// Полная конфигурация сессии стриминга.
#[derive(Debug, Clone)]
pub struct StreamerConfig {
    /// Источник звука
    pub device: DeviceKind,
    /// Параметры экстрактора (формат захвата + диапазоны + порог)
    pub extractor: ExtractorConfig,
    /// Каталог публикации — рабочая копия git-репозитория
    pub output_dir: PathBuf,
    /// Имя JSON-файла со snapshot-ом
    pub json_filename: String,
    /// Имя sitemap-файла
    pub sitemap_filename: String,
    /// Базовый URL сайта (для <loc> в sitemap)
    pub site_url: String,
    /// Сообщение git-коммита
    pub commit_message: String,
    /// Выполнять ли git add/commit/push после записи файлов
    pub push: bool,
    /// Пауза между циклами (секунды); она же — де-факто backoff
    pub sleep_interval_secs: u64,
    /// Интервал вывода статистики (секунды)
    pub stats_interval_secs: u64,
    /// Ограничение числа циклов (None = до Ctrl+C)
    pub max_cycles: Option<u64>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StreamerConfig {
    /// Путь к JSON-файлу snapshot-а.
    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(&self.json_filename)
    }

    /// Путь к sitemap-файлу.
    pub fn sitemap_path(&self) -> PathBuf {
        self.output_dir.join(&self.sitemap_filename)
    }

    /// Публичный URL JSON-файла (для sitemap).
    pub fn json_url(&self) -> String {
        format!(
            "{}/{}",
            self.site_url.trim_end_matches('/'),
            self.json_filename
        )
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для DeviceKind, StreamerConfig
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for DeviceKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DeviceKind::Simulated => write!(f, "sim"),
            DeviceKind::Default => write!(f, "default"),
            DeviceKind::Index(i) => write!(f, "{i}"),
        }
    }
}

impl std::str::FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sim" | "simulated" => Ok(DeviceKind::Simulated),
            "default" => Ok(DeviceKind::Default),
            other => other.parse::<usize>().map(DeviceKind::Index).map_err(|_| {
                format!("Unknown device '{s}'. Use: sim, default, or an input device index")
            }),
        }
    }
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            device: DeviceKind::Default,
            extractor: ExtractorConfig::default(),
            output_dir: PathBuf::from("."),
            json_filename: "consciousness_stream.json".to_string(),
            sitemap_filename: "sitemap.xml".to_string(),
            site_url: "https://volna-stream.github.io".to_string(),
            commit_message: "Update consciousness stream".to_string(),
            push: true,
            sleep_interval_secs: 5,
            stats_interval_secs: 60,
            max_cycles: None,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_kind_fromstr() {
        assert_eq!("sim".parse::<DeviceKind>().unwrap(), DeviceKind::Simulated);
        assert_eq!(
            "simulated".parse::<DeviceKind>().unwrap(),
            DeviceKind::Simulated
        );
        assert_eq!(
            "default".parse::<DeviceKind>().unwrap(),
            DeviceKind::Default
        );
        assert_eq!("3".parse::<DeviceKind>().unwrap(), DeviceKind::Index(3));
        assert!("hdmi".parse::<DeviceKind>().is_err());
    }

    #[test]
    fn test_device_kind_display_round_trip() {
        for kind in [
            DeviceKind::Simulated,
            DeviceKind::Default,
            DeviceKind::Index(7),
        ] {
            assert_eq!(kind.to_string().parse::<DeviceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_json_url_joins_without_double_slash() {
        let mut cfg = StreamerConfig {
            site_url: "https://volna-stream.github.io/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            cfg.json_url(),
            "https://volna-stream.github.io/consciousness_stream.json"
        );

        cfg.site_url = "https://volna-stream.github.io".to_string();
        assert_eq!(
            cfg.json_url(),
            "https://volna-stream.github.io/consciousness_stream.json"
        );
    }

    #[test]
    fn test_default_carries_original_cadence() {
        let cfg = StreamerConfig::default();

        assert_eq!(cfg.sleep_interval_secs, 5);
        assert!(cfg.push);
        assert_eq!(cfg.json_filename, "consciousness_stream.json");
        assert_eq!(cfg.sitemap_filename, "sitemap.xml");
        assert_eq!(cfg.max_cycles, None);
    }
}
