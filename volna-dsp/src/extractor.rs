use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use volna_types::{Band, BandPowerReading};

use crate::{DspError, DspResult, ExtractorConfig};

/// Экстрактор мощности частотных диапазонов.
///
/// Без состояния между вызовами: план ДПФ строится один раз при
/// создании и неизменяем, [`extract`](Self::extract) — чистая функция
/// одного блока.
pub struct BandPowerExtractor {
    config: ExtractorConfig,
    fft: Arc<dyn Fft<f64>>,
}

impl BandPowerExtractor {
    /// Создаёт экстрактор, валидируя конфигурацию и планируя ДПФ.
    pub fn new(config: ExtractorConfig) -> DspResult<Self> {
        config.validate()?;

        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(config.frames_per_read);

        Ok(Self { config, fft })
    }

    /// Ссылка на конфигурацию.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Анализирует один interleaved-блок 16-битных выборок.
    ///
    /// Возвращает `Ok(None)` на тишине (пик |s| ниже порога) — это
    /// «в этом цикле ничего интересного», не ошибка. `Err` только на
    /// блоке неправильной длины.
    pub fn extract(
        &self,
        block: &[i16],
    ) -> DspResult<Option<BandPowerReading>> {
        let cfg = &self.config;
        let expected = cfg.block_len();

        if block.len() != expected {
            return Err(DspError::BlockSize {
                expected,
                found: block.len(),
            });
        }

        // Изоляция канала: шаг по числу каналов от выбранного смещения
        let signal: Vec<i16> = block
            .iter()
            .skip(cfg.channel)
            .step_by(cfg.channels)
            .copied()
            .collect();

        // Шумовой порог — строго ниже порога, пик ровно на пороге
        // обрабатывается
        let peak = signal.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);

        if peak < cfg.silence_threshold {
            return Ok(None);
        }

        // Прямое ДПФ: N вещественных выборок → N комплексных коэффициентов
        let mut spectrum: Vec<Complex<f64>> = signal
            .iter()
            .map(|&s| Complex::new(f64::from(s), 0.0))
            .collect();

        self.fft.process(&mut spectrum);

        let magnitudes: Vec<f64> = spectrum.iter().map(|c| c.norm()).collect();

        let mut reading = BandPowerReading::new();

        for band in &cfg.bands {
            let raw = band_power(&magnitudes, cfg.sample_rate_hz, band);
            reading.set(band.name.clone(), compress_power(raw));
        }

        Ok(Some(reading))
    }
}

/// Частота бина `index` для ДПФ длины `len` при частоте дискретизации
/// `sample_rate_hz`.
///
/// Стандартная раскладка fftfreq: бин k ↔ k·R/N для нижней половины,
/// верхняя половина заворачивается в отрицательные частоты.
pub fn bin_freq_hz(
    index: usize,
    len: usize,
    sample_rate_hz: u32,
) -> f64 {
    debug_assert!(index < len);

    let k = if index <= (len - 1) / 2 {
        index as f64
    } else {
        index as f64 - len as f64
    };

    k * f64::from(sample_rate_hz) / len as f64
}

/// Сырая мощность диапазона: сумма магнитуд всех бинов, чья частота
/// попадает в `[low_hz, high_hz]` включительно.
pub fn band_power(
    magnitudes: &[f64],
    sample_rate_hz: u32,
    band: &Band,
) -> f64 {
    let len = magnitudes.len();

    magnitudes
        .iter()
        .enumerate()
        .filter(|(i, _)| band.contains(bin_freq_hz(*i, len, sample_rate_hz)))
        .map(|(_, m)| m)
        .sum()
}

/// Логарифмическое сжатие мощности: `round4(log10(p + 1))`.
///
/// `+1` исключает логарифм нуля для пустого диапазона, округление до
/// 4 знаков ограничивает размер snapshot-а.
///
/// # Примеры
/// ```
/// use volna_dsp::compress_power;
/// assert_eq!(compress_power(0.0), 0.0);
/// assert_eq!(compress_power(999.0), 3.0);
/// ```
pub fn compress_power(raw: f64) -> f64 {
    round4((raw + 1.0).log10())
}

/// Округление до 4 десятичных знаков.
fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 44_100;
    const FRAMES: usize = 4_096;

    fn default_extractor() -> BandPowerExtractor {
        BandPowerExtractor::new(ExtractorConfig::default()).unwrap()
    }

    /// Стерео-блок с синусоидой на канале 0 и нулями на канале 1.
    fn stereo_tone_block(
        freq_hz: f64,
        amplitude: f64,
    ) -> Vec<i16> {
        let mut block = vec![0i16; 2 * FRAMES];

        for frame in 0..FRAMES {
            let t = frame as f64 / f64::from(RATE);
            let s = amplitude * (2.0 * std::f64::consts::PI * freq_hz * t).sin();
            block[2 * frame] = s as i16;
        }

        block
    }

    #[test]
    fn test_bin_freq_axis() {
        // Нижняя половина: k·R/N
        assert_eq!(bin_freq_hz(0, FRAMES, RATE), 0.0);

        let df = f64::from(RATE) / FRAMES as f64;
        assert!((bin_freq_hz(1, FRAMES, RATE) - df).abs() < 1e-9);
        assert!((bin_freq_hz(2_047, FRAMES, RATE) - 2_047.0 * df).abs() < 1e-6);

        // Верхняя половина заворачивается в отрицательные частоты,
        // включая бин Найквиста для чётного N
        assert!(bin_freq_hz(2_048, FRAMES, RATE) < 0.0);
        assert!((bin_freq_hz(FRAMES - 1, FRAMES, RATE) + df).abs() < 1e-9);
    }

    #[test]
    fn test_bin_freq_axis_odd_len() {
        // N=7: индексы 0..=3 положительные, 4..=6 отрицательные
        assert!(bin_freq_hz(3, 7, 7) > 0.0);
        assert!(bin_freq_hz(4, 7, 7) < 0.0);
        assert_eq!(bin_freq_hz(3, 7, 7), 3.0);
        assert_eq!(bin_freq_hz(4, 7, 7), -3.0);
    }

    #[test]
    fn test_silence_below_threshold_returns_none() {
        let extractor = default_extractor();

        // Пик 99 < 100 → тишина
        let mut block = vec![0i16; 2 * FRAMES];
        block[0] = 99;
        block[100] = -99;

        assert!(extractor.extract(&block).unwrap().is_none());
    }

    #[test]
    fn test_peak_at_and_above_threshold_is_processed() {
        let extractor = default_extractor();

        // Ровно на пороге — обрабатывается (строгое `<`)
        let mut block = vec![0i16; 2 * FRAMES];
        block[0] = 100;
        assert!(extractor.extract(&block).unwrap().is_some());

        block[0] = 101;
        assert!(extractor.extract(&block).unwrap().is_some());
    }

    #[test]
    fn test_threshold_ignores_other_channels() {
        let extractor = default_extractor();

        // Громкий сигнал на канале 1, анализируем канал 0 → тишина
        let block = {
            let mut b = vec![0i16; 2 * FRAMES];
            for frame in 0..FRAMES {
                b[2 * frame + 1] = 20_000;
            }
            b
        };

        assert!(extractor.extract(&block).unwrap().is_none());
    }

    #[test]
    fn test_block_size_mismatch_is_error() {
        let extractor = default_extractor();
        let short = vec![0i16; 2 * FRAMES - 1];

        match extractor.extract(&short) {
            Err(DspError::BlockSize { expected, found }) => {
                assert_eq!(expected, 8_192);
                assert_eq!(found, 8_191);
            }
            other => panic!("ожидали BlockSize, получили {other:?}"),
        }
    }

    #[test]
    fn test_reading_keys_are_exactly_band_names() {
        let extractor = default_extractor();
        let block = stereo_tone_block(50.0, 10_000.0);

        let reading = extractor.extract(&block).unwrap().unwrap();
        let names: Vec<&str> = reading.band_names().collect();

        assert_eq!(names, ["alpha", "beta", "delta", "gamma", "theta"]);
    }

    #[test]
    fn test_bin_aligned_tone_dominates_its_band() {
        let extractor = default_extractor();

        // Бин 5 → 5·44100/4096 ≈ 53.8 Гц, внутри gamma [30, 100].
        // Выровненный по бину тон почти не растекается по спектру.
        let tone = 5.0 * f64::from(RATE) / FRAMES as f64;
        let block = stereo_tone_block(tone, 8_000.0);

        let reading = extractor.extract(&block).unwrap().unwrap();

        assert_eq!(reading.dominant_band(), Some("gamma"));
        assert!(reading.get("gamma").unwrap() > 3.0, "gamma = {reading:?}");

        for band in ["delta", "theta", "alpha", "beta"] {
            assert!(
                reading.get(band).unwrap() < 0.5 * reading.get("gamma").unwrap(),
                "{band} слишком мощный: {reading:?}"
            );
        }
    }

    #[test]
    fn test_noise_spreads_across_bands() {
        use rand::{rngs::SmallRng, Rng, SeedableRng};

        // Разрешение 1 Гц, чтобы и в delta попадали бины
        let config = ExtractorConfig {
            sample_rate_hz: 1_024,
            frames_per_read: 1_024,
            ..Default::default()
        };
        let extractor = BandPowerExtractor::new(config).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);

        // Белый шум несёт энергию во всех диапазонах
        let block: Vec<i16> = (0..2 * 1_024).map(|_| rng.gen_range(-3_000..3_000)).collect();
        let reading = extractor.extract(&block).unwrap().unwrap();

        for (band, power) in reading.iter() {
            assert!(power > 0.0, "{band} без энергии: {reading:?}");
        }
    }

    #[test]
    fn test_compress_power_zero_boundary() {
        // Пустой диапазон: log10(0 + 1) = 0, без ошибки логарифма
        assert_eq!(compress_power(0.0), 0.0);
    }

    #[test]
    fn test_compress_power_is_pure() {
        for raw in [0.0, 1.0, 42.5, 1e6, 3.14159e9] {
            assert_eq!(compress_power(raw), compress_power(raw));
        }
    }

    #[test]
    fn test_compress_power_rounds_to_4_decimals() {
        let v = compress_power(123_456.789);
        assert_eq!(v, (v * 10_000.0).round() / 10_000.0);
        // log10(123457.789) ≈ 5.09152
        assert!((v - 5.0915).abs() < 1e-9);
    }

    #[test]
    fn test_full_range_band_equals_full_spectrum_sum() {
        let config = ExtractorConfig::default();
        let extractor = BandPowerExtractor::new(config.clone()).unwrap();
        let block = stereo_tone_block(437.0, 12_000.0);

        // Считаем спектр так же, как extract
        let signal: Vec<i16> = block.iter().step_by(2).copied().collect();
        let mut spectrum: Vec<Complex<f64>> = signal
            .iter()
            .map(|&s| Complex::new(f64::from(s), 0.0))
            .collect();
        extractor.fft.process(&mut spectrum);
        let magnitudes: Vec<f64> = spectrum.iter().map(|c| c.norm()).collect();

        let total: f64 = magnitudes.iter().sum();

        // Диапазон на весь размах частот (обе половины оси)
        let nyquist = f64::from(RATE) / 2.0;
        let full = Band::new("full", -nyquist, nyquist);
        let summed = band_power(&magnitudes, RATE, &full);

        assert!(
            (summed - total).abs() <= 1e-9 * total,
            "band sum {summed} != spectrum sum {total}"
        );
    }
}
