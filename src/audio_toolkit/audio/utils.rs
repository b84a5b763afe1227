use anyhow::Result;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use std::io::Cursor;
use std::path::Path;

use super::recorder::AudioClip;

fn wav_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Encode a clip as an in-memory 16-bit mono WAV for upload.
pub fn clip_to_wav_bytes(clip: &AudioClip) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut buffer, wav_spec(clip.sample_rate))?;
        for &sample in &clip.samples {
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer.write_sample(sample_i16)?;
        }
        writer.finalize()?;
    }
    Ok(buffer.into_inner())
}

/// Save a clip as a WAV file
pub fn save_wav_file<P: AsRef<Path>>(file_path: P, clip: &AudioClip) -> Result<()> {
    let mut writer = WavWriter::create(file_path.as_ref(), wav_spec(clip.sample_rate))?;

    for &sample in &clip.samples {
        let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer.write_sample(sample_i16)?;
    }

    writer.finalize()?;
    debug!("Saved WAV file: {:?}", file_path.as_ref());
    Ok(())
}

/// Load a clip from a WAV file, downmixing to mono if needed
pub fn load_wav_file<P: AsRef<Path>>(file_path: P) -> Result<AudioClip> {
    let mut reader = WavReader::open(file_path.as_ref())?;
    let spec = reader.spec();

    debug!("Loading WAV file: {:?}, spec: {:?}", file_path.as_ref(), spec);

    let samples: Result<Vec<f32>, _> = match spec.sample_format {
        SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|sample| sample as f32 / i16::MAX as f32))
                .collect(),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|sample| sample as f32 / i32::MAX as f32))
                .collect(),
            _ => {
                return Err(anyhow::anyhow!(
                    "Unsupported bit depth: {}",
                    spec.bits_per_sample
                ))
            }
        },
        SampleFormat::Float => reader.samples::<f32>().collect(),
    };

    let mut audio_samples = samples?;
    if spec.channels > 1 {
        let channels = spec.channels as usize;
        audio_samples = audio_samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();
    }

    debug!("Loaded {} samples from WAV file", audio_samples.len());
    Ok(AudioClip {
        samples: audio_samples,
        sample_rate: spec.sample_rate,
    })
}
