// Re-export all audio components
pub mod device;
pub mod recorder;
pub mod utils;

pub use device::{find_input_device, list_input_devices, CpalDeviceInfo};
pub use recorder::{AudioClip, AudioInput, CpalRecorder, TARGET_SAMPLE_RATE};
pub use utils::{clip_to_wav_bytes, load_wav_file, save_wav_file};
