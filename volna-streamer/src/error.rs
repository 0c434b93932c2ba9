use std::time::Duration;

use thiserror::Error;

pub type StreamerResult<T> = std::result::Result<T, StreamerError>;

/// Ошибки чтения из источника звука.
///
/// Transient-варианты приравниваются к тишине: цикл ничего не
/// публикует и ждёт следующего. Остальные фатальны для main loop.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Переполнение буфера захвата, блок потерян (transient)
    #[error("Input overrun: capture buffer full, block dropped")]
    Overrun,

    /// Источник не выдал блок за отведённое время (transient)
    #[error("Read timed out after {0:?}")]
    Timeout(Duration),

    /// Поток захвата закрылся
    #[error("Audio stream disconnected: {0}")]
    Disconnected(String),

    /// Устройство не найдено или не открылось
    #[error("Audio device error: {0}")]
    Device(String),
}

impl CaptureError {
    /// Считать ли сбой преходящим («в этом цикле ничего», не ошибка).
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Overrun | Self::Timeout(_))
    }
}

#[derive(Debug, Error)]
pub enum StreamerError {
    /// Фатальный сбой захвата звука
    #[error("Audio capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Ошибка спектрального анализа (некорректный блок/конфигурация)
    #[error("DSP error: {0}")]
    Dsp(#[from] volna_dsp::DspError),

    /// Ошибка записи snapshot/sitemap
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации snapshot-а
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Сбой публикации (git add/commit/push)
    #[error("Publish error: {0}")]
    Publish(String),

    /// Некорректная конфигурация стримера
    #[error("Config error: {0}")]
    Config(String),
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
