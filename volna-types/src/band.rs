use serde::{Deserialize, Serialize};

use crate::{VolnaError, VolnaResult};

/// Именованный частотный диапазон `[low_hz, high_hz]` (включительно
/// с обеих сторон).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Имя диапазона (ключ в [`crate::BandPowerReading`])
    pub name: String,
    /// Нижняя граница, Гц
    pub low_hz: f64,
    /// Верхняя граница, Гц
    pub high_hz: f64,
}

impl Band {
    pub fn new<S: Into<String>>(
        name: S,
        low_hz: f64,
        high_hz: f64,
    ) -> Self {
        Self {
            name: name.into(),
            low_hz,
            high_hz,
        }
    }

    /// Попадает ли частота в диапазон. Обе границы включительны,
    /// поэтому соседние диапазоны могут разделять граничную частоту.
    pub fn contains(
        &self,
        freq_hz: f64,
    ) -> bool {
        freq_hz >= self.low_hz && freq_hz <= self.high_hz
    }

    /// Проверяет корректность диапазона.
    pub fn validate(&self) -> VolnaResult<()> {
        if self.name.is_empty() {
            return Err(VolnaError::invalid_band("band name must not be empty"));
        }

        if self.low_hz > self.high_hz {
            return Err(VolnaError::InvalidBand(format!(
                "band '{}': low {} Hz > high {} Hz",
                self.name, self.low_hz, self.high_hz
            )));
        }

        Ok(())
    }
}

/// Пять стандартных ЭЭГ диапазонов с фиксированными границами.
///
/// Границы не пересекаются, кроме общих граничных точек (4, 8, 13,
/// 30 Гц).
pub fn eeg_bands() -> Vec<Band> {
    vec![
        Band::new("delta", 0.5, 4.0),
        Band::new("theta", 4.0, 8.0),
        Band::new("alpha", 8.0, 13.0),
        Band::new("beta", 13.0, 30.0),
        Band::new("gamma", 30.0, 100.0),
    ]
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
