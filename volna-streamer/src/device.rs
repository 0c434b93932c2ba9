// SimulatedSource отдаёт синтетический тон в том же interleaved-формате,
// что и реальная звуковая карта, поэтому pipeline и тесты работают с ним
// без какого-либо железа.
// CpalSource переносит callback-буферы cpal в блокирующее чтение через
// ограниченный crossbeam-канал.

use std::{f64::consts::PI, time::Duration};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info};
use volna_dsp::ExtractorConfig;

use crate::{CaptureError, DeviceKind, StreamerConfig, StreamerError, StreamerResult};

/// Абстракция источника звука.
///
/// Один вызов [`read_block`](Self::read_block) блокируется до получения
/// ровно `channels × frames_per_read` interleaved 16-битных выборок.
/// cpal-потоки не `Send`, а pipeline однопоточный, поэтому, в отличие
/// от записывающих устройств SDR, трейт не требует `Send`.
pub trait AudioSource {
    /// Информация об источнике (для логирования)
    fn info(&self) -> SourceInfo;

    /// Блокирующее чтение одного блока.
    fn read_block(&mut self) -> Result<Vec<i16>, CaptureError>;

    /// Останавливает и освобождает источник. Вызывается ровно один раз
    /// на любом пути выхода из pipeline.
    fn stop(&mut self);
}

/// Информация об источнике звука.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    pub name: String,
    pub sample_rate_hz: u32,
    pub channels: usize,
    pub frames_per_read: usize,
}

/// Синтетический источник: синусоида на выбранном канале, остальные
/// каналы — нули. Для тестов и запуска без звуковой карты.
pub struct SimulatedSource {
    sample_rate_hz: u32,
    channels: usize,
    frames_per_read: usize,
    channel: usize,
    tone_freq_hz: f64,
    amplitude: f64,
    global_frame: u64,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl SimulatedSource {
    /// Тон 50 Гц (gamma-диапазон) с амплитудой заметно выше порога.
    pub fn new(extractor: &ExtractorConfig) -> Self {
        Self {
            sample_rate_hz: extractor.sample_rate_hz,
            channels: extractor.channels,
            frames_per_read: extractor.frames_per_read,
            channel: extractor.channel,
            tone_freq_hz: 50.0,
            amplitude: 8_000.0,
            global_frame: 0,
        }
    }

    /// Источник, отдающий только тишину (для тестов шумового порога).
    pub fn silent(extractor: &ExtractorConfig) -> Self {
        Self {
            amplitude: 0.0,
            ..Self::new(extractor)
        }
    }

    /// Частота тона, Гц.
    pub fn with_tone(
        mut self,
        freq_hz: f64,
        amplitude: f64,
    ) -> Self {
        self.tone_freq_hz = freq_hz;
        self.amplitude = amplitude;
        self
    }
}

impl AudioSource for SimulatedSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: "Simulated tone".to_string(),
            sample_rate_hz: self.sample_rate_hz,
            channels: self.channels,
            frames_per_read: self.frames_per_read,
        }
    }

    fn read_block(&mut self) -> Result<Vec<i16>, CaptureError> {
        let mut block = vec![0i16; self.channels * self.frames_per_read];

        for frame in 0..self.frames_per_read {
            let t = (self.global_frame + frame as u64) as f64 / f64::from(self.sample_rate_hz);
            let s = self.amplitude * (2.0 * PI * self.tone_freq_hz * t).sin();
            block[frame * self.channels + self.channel] = s as i16;
        }

        self.global_frame += self.frames_per_read as u64;

        Ok(block)
    }

    fn stop(&mut self) {}
}

/// Захват с реальной звуковой карты через cpal.
pub struct CpalSource {
    // Option: поток забирается в stop() для явной остановки
    stream: Option<cpal::Stream>,
    rx: Receiver<Vec<i16>>,
    name: String,
    sample_rate_hz: u32,
    channels: usize,
    frames_per_read: usize,
    pending: Vec<i16>,
    read_timeout: Duration,
}

impl CpalSource {
    /// Открывает входное устройство и сразу запускает поток захвата
    /// в формате 16-битных interleaved выборок.
    pub fn open(
        kind: DeviceKind,
        extractor: &ExtractorConfig,
    ) -> StreamerResult<Self> {
        let host = cpal::default_host();

        let device = match kind {
            DeviceKind::Default => host.default_input_device().ok_or_else(|| {
                CaptureError::Device("no default input device found".to_string())
            })?,
            DeviceKind::Index(i) => host
                .input_devices()
                .map_err(|e| CaptureError::Device(e.to_string()))?
                .nth(i)
                .ok_or_else(|| CaptureError::Device(format!("no input device with index {i}")))?,
            DeviceKind::Simulated => {
                return Err(StreamerError::Config(
                    "use SimulatedSource for the sim device".to_string(),
                ))
            }
        };

        let name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let stream_config = cpal::StreamConfig {
            channels: extractor.channels as u16,
            sample_rate: cpal::SampleRate(extractor.sample_rate_hz),
            buffer_size: cpal::BufferSize::Default,
        };

        // Небольшой запас: между циклами стример спит, бэклог
        // сбрасывается при следующем чтении
        let (tx, rx) = crossbeam_channel::bounded::<Vec<i16>>(32);

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    // Канал полон — буфер отбрасывается, read_block всё
                    // равно предпочитает свежие данные
                    let _ = tx.try_send(data.to_vec());
                },
                |err| {
                    log::error!("Audio stream error: {err}");
                },
                None,
            )
            .map_err(|e| CaptureError::Device(e.to_string()))?;

        stream.play().map_err(|e| CaptureError::Device(e.to_string()))?;

        info!("Audio capture started on '{name}'");

        Ok(Self {
            stream: Some(stream),
            rx,
            name,
            sample_rate_hz: extractor.sample_rate_hz,
            channels: extractor.channels,
            frames_per_read: extractor.frames_per_read,
            pending: Vec::new(),
            read_timeout: Duration::from_secs(2),
        })
    }
}

impl AudioSource for CpalSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            name: self.name.clone(),
            sample_rate_hz: self.sample_rate_hz,
            channels: self.channels,
            frames_per_read: self.frames_per_read,
        }
    }

    fn read_block(&mut self) -> Result<Vec<i16>, CaptureError> {
        // Сбрасываем бэклог, накопившийся за паузу между циклами:
        // анализируем свежий звук, а не пятисекундную очередь
        let mut dropped = 0usize;

        while let Ok(buf) = self.rx.try_recv() {
            dropped += buf.len();
        }

        if dropped > 0 {
            debug!("Dropped {dropped} stale samples before read");
        }

        self.pending.clear();

        let need = self.channels * self.frames_per_read;

        while self.pending.len() < need {
            match self.rx.recv_timeout(self.read_timeout) {
                Ok(buf) => self.pending.extend_from_slice(&buf),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(CaptureError::Timeout(self.read_timeout))
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CaptureError::Disconnected(
                        "capture callback channel closed".to_string(),
                    ))
                }
            }
        }

        Ok(self.pending.drain(..need).collect())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.pause();
            drop(stream);
            info!("Audio capture stopped on '{}'", self.name);
        }
    }
}

/// Создаёт источник звука по конфигурации.
pub fn create_source(config: &StreamerConfig) -> StreamerResult<Box<dyn AudioSource>> {
    match config.device {
        DeviceKind::Simulated => Ok(Box::new(SimulatedSource::new(&config.extractor))),
        kind => Ok(Box::new(CpalSource::open(kind, &config.extractor)?)),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
