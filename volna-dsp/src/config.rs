use std::collections::HashSet;

use volna_types::{eeg_bands, Band};

use crate::{DspError, DspResult};

/// Неизменяемая конфигурация экстрактора.
///
/// Явная структура вместо модульных констант: экстрактор получает её
/// один раз при создании и дальше работает как чистая функция блока.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Частота дискретизации (Гц)
    pub sample_rate_hz: u32,
    /// Фреймов на один блок чтения (длина сигнала одного канала)
    pub frames_per_read: usize,
    /// Количество каналов во входном interleaved-блоке
    pub channels: usize,
    /// Индекс анализируемого канала (0 = левый/основной)
    pub channel: usize,
    /// Шумовой порог: блок с пиком |s| ниже порога считается тишиной.
    /// Эвристика, значение не выводится — только настраивается.
    pub silence_threshold: u16,
    /// Именованные частотные диапазоны
    pub bands: Vec<Band>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44_100,
            frames_per_read: 4_096,
            channels: 2,
            channel: 0,
            silence_threshold: 100,
            bands: eeg_bands(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ExtractorConfig {
    /// Ожидаемая длина входного блока в выборках.
    pub fn block_len(&self) -> usize {
        self.channels * self.frames_per_read
    }

    /// Проверяет согласованность конфигурации.
    pub fn validate(&self) -> DspResult<()> {
        if self.sample_rate_hz == 0 {
            return Err(DspError::config("sample_rate_hz must be > 0"));
        }

        if self.frames_per_read == 0 {
            return Err(DspError::config("frames_per_read must be > 0"));
        }

        if self.channels == 0 {
            return Err(DspError::config("channels must be > 0"));
        }

        if self.channel >= self.channels {
            return Err(DspError::Config(format!(
                "channel {} out of range (channels = {})",
                self.channel, self.channels
            )));
        }

        if self.bands.is_empty() {
            return Err(DspError::config("at least one band is required"));
        }

        let mut names = HashSet::new();

        for band in &self.bands {
            band.validate()?;

            if !names.insert(band.name.as_str()) {
                return Err(DspError::Config(format!(
                    "duplicate band name '{}'",
                    band.name
                )));
            }
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
