use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Результат одного цикла анализа: имя диапазона → сжатая мощность.
///
/// Ключи — ровно имена диапазонов из конфигурации экстрактора, по
/// одному значению на диапазон. Значение — `round4(log10(p + 1))`,
/// подробности в `volna-dsp`.
///
/// Сериализуется как плоский JSON-объект, без обёртки — так же, как
/// печатает snapshot сам стример.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandPowerReading {
    powers: BTreeMap<String, f64>,
}

impl BandPowerReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Записывает мощность диапазона. Повторная запись того же имени
    /// перезаписывает значение.
    pub fn set<S: Into<String>>(
        &mut self,
        band: S,
        power: f64,
    ) {
        self.powers.insert(band.into(), power);
    }

    /// Мощность диапазона по имени.
    pub fn get(
        &self,
        band: &str,
    ) -> Option<f64> {
        self.powers.get(band).copied()
    }

    /// Имена диапазонов (отсортированы лексикографически).
    pub fn band_names(&self) -> impl Iterator<Item = &str> {
        self.powers.keys().map(String::as_str)
    }

    /// Количество диапазонов в показании.
    pub fn len(&self) -> usize {
        self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    /// Имя диапазона с максимальной мощностью (None для пустого
    /// показания).
    pub fn dominant_band(&self) -> Option<&str> {
        self.powers
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.powers.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
