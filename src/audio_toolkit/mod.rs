pub mod audio;
pub mod speech;

pub use audio::{
    clip_to_wav_bytes, list_input_devices, load_wav_file, save_wav_file, AudioClip, AudioInput,
    CpalDeviceInfo, CpalRecorder, TARGET_SAMPLE_RATE,
};
pub use speech::{SpeechSynthesizer, SystemSpeech};
