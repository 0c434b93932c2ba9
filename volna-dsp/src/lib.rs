//! Библиотека спектрального анализа volna.
//!
//! Одна фиксированная цепочка обработки: изоляция канала из
//! interleaved-блока, шумовой порог, прямое ДПФ, суммирование
//! магнитуд по именованным диапазонам, логарифмическое сжатие.
//! Это не универсальная DSP-библиотека.
//!
//! # Быстрый старт
//!
//! ```
//! use volna_dsp::{BandPowerExtractor, ExtractorConfig};
//!
//! let config = ExtractorConfig::default(); // 44100 Гц, 4096 фреймов, стерео
//! let extractor = BandPowerExtractor::new(config).unwrap();
//!
//! let silent = vec![0i16; 2 * 4096];
//! assert!(extractor.extract(&silent).unwrap().is_none());
//! ```

pub mod config;
pub mod error;
pub mod extractor;

pub use config::*;
pub use error::*;
pub use extractor::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
