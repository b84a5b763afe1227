use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use log::error;
use std::sync::{Arc, Mutex};

use super::device::find_input_device;

/// All captured audio is delivered mono at this rate.
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Finished samples from one recording session.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Capture capability driven by the recording manager. `open` claims the
/// device, `start`/`stop` bracket one take, `close` releases the device.
/// `stop` drains everything captured since the matching `start`.
pub trait AudioInput: Send + Sync {
    fn open(&self, preferred_device: Option<&str>) -> Result<()>;
    fn start(&self) -> Result<()>;
    fn stop(&self) -> Result<Vec<f32>>;
    fn close(&self) -> Result<()>;
}

/// Wrapper to make cpal::Stream usable across threads. The stream handle is
/// only ever driven from one thread at a time; the hosts we target allow
/// moving it.
struct SendStream(Stream);
unsafe impl Send for SendStream {}

/// Sample buffer shared with the device callback thread.
#[derive(Clone, Default)]
struct SampleSink {
    samples: Arc<Mutex<Vec<f32>>>,
    capturing: Arc<Mutex<bool>>,
}

impl SampleSink {
    fn push(&self, samples: &[f32]) {
        if !*self.capturing.lock().unwrap() {
            return;
        }
        self.samples.lock().unwrap().extend_from_slice(samples);
    }

    fn begin(&self) {
        self.samples.lock().unwrap().clear();
        *self.capturing.lock().unwrap() = true;
    }

    fn finish(&self) -> Vec<f32> {
        *self.capturing.lock().unwrap() = false;
        std::mem::take(&mut *self.samples.lock().unwrap())
    }
}

/// Microphone capture through cpal. The stream runs from `open` to `close`;
/// samples are only retained between `start` and `stop`.
pub struct CpalRecorder {
    stream: Mutex<Option<SendStream>>,
    sink: SampleSink,
}

unsafe impl Sync for CpalRecorder {}

impl CpalRecorder {
    pub fn new() -> Self {
        Self {
            stream: Mutex::new(None),
            sink: SampleSink::default(),
        }
    }
}

impl Default for CpalRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioInput for CpalRecorder {
    fn open(&self, preferred_device: Option<&str>) -> Result<()> {
        let mut stream_guard = self.stream.lock().unwrap();
        if stream_guard.is_some() {
            return Ok(());
        }

        let device = find_input_device(preferred_device)
            .ok_or_else(|| anyhow!("no input device available"))?;

        let supported_config = device.default_input_config()?;
        let sample_format = supported_config.sample_format();
        let config: StreamConfig = supported_config.into();
        let channels = config.channels as usize;
        let native_rate = config.sample_rate.0;

        let sink = self.sink.clone();
        let stream = match sample_format {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _info: &cpal::InputCallbackInfo| {
                    let mono = to_mono(data, channels);
                    let resampled = resample(&mono, native_rate, TARGET_SAMPLE_RATE);
                    sink.push(&resampled);
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _info: &cpal::InputCallbackInfo| {
                    let float_data: Vec<f32> =
                        data.iter().map(|&s| s as f32 / i16::MAX as f32).collect();
                    let mono = to_mono(&float_data, channels);
                    let resampled = resample(&mono, native_rate, TARGET_SAMPLE_RATE);
                    sink.push(&resampled);
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )?,
            other => return Err(anyhow!("unsupported sample format: {:?}", other)),
        };

        stream.play()?;
        *stream_guard = Some(SendStream(stream));
        Ok(())
    }

    fn start(&self) -> Result<()> {
        if self.stream.lock().unwrap().is_none() {
            return Err(anyhow!("recorder is not open"));
        }
        self.sink.begin();
        Ok(())
    }

    fn stop(&self) -> Result<Vec<f32>> {
        Ok(self.sink.finish())
    }

    fn close(&self) -> Result<()> {
        self.sink.finish();
        *self.stream.lock().unwrap() = None;
        Ok(())
    }
}

/// Convert multi-channel audio to mono by averaging channels.
fn to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return data.to_vec();
    }
    data.chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Simple linear interpolation resampler (e.g. 48000 -> 16000 Hz).
fn resample(data: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate || data.is_empty() {
        return data.to_vec();
    }
    let ratio = source_rate as f64 / target_rate as f64;
    let output_len = (data.len() as f64 / ratio) as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_idx = i as f64 * ratio;
        let idx_floor = src_idx.floor() as usize;
        let idx_ceil = (idx_floor + 1).min(data.len() - 1);
        let frac = src_idx - idx_floor as f64;
        let sample = data[idx_floor] as f64 * (1.0 - frac) + data[idx_ceil] as f64 * frac;
        output.push(sample as f32);
    }
    output
}
