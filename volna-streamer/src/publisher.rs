use std::{fs, path::PathBuf, process::Command};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use volna_types::BandPowerReading;

use crate::{StreamerConfig, StreamerError, StreamerResult};

/// Публикуемый JSON-объект: показание плюс временная метка.
#[derive(Debug, Serialize)]
struct Snapshot<'a> {
    #[serde(flatten)]
    reading: &'a BandPowerReading,
    timestamp_utc: &'a str,
}

/// Публикатор snapshot-ов: JSON + sitemap в каталоге публикации и
/// git add/commit/push поверх них.
///
/// Запись файлов и git-синхронизация разделены: сбой git не фатален
/// для цикла, сбой записи файла — фатален.
pub struct SnapshotPublisher {
    output_dir: PathBuf,
    json_filename: String,
    sitemap_filename: String,
    json_url: String,
    commit_message: String,
}

impl SnapshotPublisher {
    pub fn new(config: &StreamerConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            json_filename: config.json_filename.clone(),
            sitemap_filename: config.sitemap_filename.clone(),
            json_url: config.json_url(),
            commit_message: config.commit_message.clone(),
        }
    }

    /// Текущее время UTC в ISO-8601 (с `+00:00`, как требует sitemap).
    pub fn utc_timestamp() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
    }

    /// Записывает JSON-snapshot. Возвращает путь записанного файла.
    pub fn write_snapshot(
        &self,
        reading: &BandPowerReading,
        timestamp_utc: &str,
    ) -> StreamerResult<PathBuf> {
        let snapshot = Snapshot {
            reading,
            timestamp_utc,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        let path = self.output_dir.join(&self.json_filename);

        fs::write(&path, json)?;

        Ok(path)
    }

    /// Записывает sitemap.xml, ссылающийся на JSON с той же меткой.
    pub fn write_sitemap(
        &self,
        timestamp_utc: &str,
    ) -> StreamerResult<PathBuf> {
        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
   <url>
      <loc>{loc}</loc>
      <lastmod>{lastmod}</lastmod>
      <changefreq>always</changefreq>
      <priority>1.0</priority>
   </url>
</urlset>"#,
            loc = self.json_url,
            lastmod = timestamp_utc,
        );

        let path = self.output_dir.join(&self.sitemap_filename);

        fs::write(&path, content)?;

        Ok(path)
    }

    /// git add + commit + push обоих файлов в каталоге публикации.
    pub fn git_sync(&self) -> StreamerResult<()> {
        self.git(&["add", &self.json_filename, &self.sitemap_filename])?;
        self.git(&["commit", "-m", &self.commit_message])?;
        self.git(&["push"])?;

        Ok(())
    }

    fn git(
        &self,
        args: &[&str],
    ) -> StreamerResult<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.output_dir)
            .output()?;

        if !output.status.success() {
            return Err(StreamerError::Publish(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use tempfile::TempDir;

    use super::*;

    fn test_publisher(dir: &TempDir) -> SnapshotPublisher {
        let config = StreamerConfig {
            output_dir: dir.path().to_path_buf(),
            push: false,
            ..Default::default()
        };
        SnapshotPublisher::new(&config)
    }

    fn sample_reading() -> BandPowerReading {
        let mut r = BandPowerReading::new();
        for (band, power) in [
            ("delta", 0.0),
            ("theta", 0.0),
            ("alpha", 6.2041),
            ("beta", 4.1),
            ("gamma", 4.9),
        ] {
            r.set(band, power);
        }
        r
    }

    #[test]
    fn test_utc_timestamp_is_rfc3339_utc() {
        let ts = SnapshotPublisher::utc_timestamp();

        assert!(ts.ends_with("+00:00"), "ожидали UTC offset: {ts}");
        DateTime::parse_from_rfc3339(&ts).unwrap();
    }

    #[test]
    fn test_write_snapshot_contents() {
        let dir = TempDir::new().unwrap();
        let publisher = test_publisher(&dir);

        let ts = "2026-01-01T00:00:00.000000+00:00";
        let path = publisher.write_snapshot(&sample_reading(), ts).unwrap();

        assert_eq!(path, dir.path().join("consciousness_stream.json"));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let obj = value.as_object().unwrap();

        // 5 диапазонов + timestamp_utc
        assert_eq!(obj.len(), 6);
        assert_eq!(obj["timestamp_utc"], ts);
        assert_eq!(obj["alpha"], 6.2041);
        assert_eq!(obj["delta"], 0.0);
    }

    #[test]
    fn test_write_sitemap_contents() {
        let dir = TempDir::new().unwrap();
        let publisher = test_publisher(&dir);

        let ts = "2026-01-01T00:00:00.000000+00:00";
        let path = publisher.write_sitemap(ts).unwrap();

        let xml = fs::read_to_string(&path).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\""));
        assert!(xml.contains(
            "<loc>https://volna-stream.github.io/consciousness_stream.json</loc>"
        ));
        assert!(xml.contains(&format!("<lastmod>{ts}</lastmod>")));
        assert!(xml.contains("<changefreq>always</changefreq>"));
        assert!(xml.contains("<priority>1.0</priority>"));
    }

    #[test]
    fn test_snapshot_overwrites_previous() {
        let dir = TempDir::new().unwrap();
        let publisher = test_publisher(&dir);

        publisher
            .write_snapshot(&sample_reading(), "2026-01-01T00:00:00+00:00")
            .unwrap();
        let path = publisher
            .write_snapshot(&sample_reading(), "2026-01-01T00:00:05+00:00")
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(value["timestamp_utc"], "2026-01-01T00:00:05+00:00");
    }

    #[test]
    fn test_git_sync_fails_outside_repo() {
        // Временный каталог — не git-репозиторий; сбой публикации
        // должен вернуться ошибкой, а не паникой
        let dir = TempDir::new().unwrap();
        let publisher = test_publisher(&dir);

        assert!(publisher.git_sync().is_err());
    }
}
