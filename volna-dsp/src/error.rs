use thiserror::Error;

use volna_types::VolnaError;

/// Результат для операций DSP.
pub type DspResult<T> = std::result::Result<T, DspError>;

/// Ошибки экстрактора.
///
/// Тишина ошибкой не является — экстрактор возвращает `Ok(None)`.
#[derive(Debug, Error)]
pub enum DspError {
    /// Некорректная конфигурация экстрактора
    #[error("Extractor config error: {0}")]
    Config(String),

    /// Некорректный частотный диапазон в конфигурации
    #[error(transparent)]
    Band(#[from] VolnaError),

    /// Длина блока не равна channels × frames_per_read
    #[error("Invalid block size: expected {expected} samples, found {found}")]
    BlockSize { expected: usize, found: usize },
}

impl DspError {
    pub fn config<S: Into<String>>(s: S) -> Self {
        Self::Config(s.into())
    }
}
