//! Общие типы volna.
//!
//! Словарь предметной области: именованные частотные диапазоны (волны
//! мозга) и результат одного цикла анализа — [`BandPowerReading`].

pub mod band;
pub mod error;
pub mod reading;

pub use band::*;
pub use error::*;
pub use reading::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
