pub mod playback;
pub mod recording;

pub use playback::PlaybackManager;
pub use recording::{RecordingManager, RecordingState};
