use thiserror::Error;

/// Результат для операций над общими типами volna.
pub type VolnaResult<T> = std::result::Result<T, VolnaError>;

/// Ошибки валидации общих типов.
#[derive(Debug, Error)]
pub enum VolnaError {
    /// Некорректный частотный диапазон (пустое имя, low > high)
    #[error("Invalid band: {0}")]
    InvalidBand(String),

    /// Некорректная конфигурация
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl VolnaError {
    /// Удобные конструкторы
    pub fn invalid_band<S: Into<String>>(s: S) -> Self {
        Self::InvalidBand(s.into())
    }

    pub fn invalid_config<S: Into<String>>(s: S) -> Self {
        Self::InvalidConfig(s.into())
    }
}
