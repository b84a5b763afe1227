use crate::audio_toolkit::SpeechSynthesizer;
use crate::error::{Error, Result};
use log::debug;
use std::sync::{Arc, Mutex};

/// Drives spoken playback of chat replies. At most one message plays at a
/// time; toggling the playing message stops it, starting another replaces
/// it.
pub struct PlaybackManager {
    speech: Arc<dyn SpeechSynthesizer>,
    playing: Mutex<Option<usize>>,
}

impl PlaybackManager {
    pub fn new(speech: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            speech,
            playing: Mutex::new(None),
        }
    }

    /// Toggle playback of the message at `index`. Returns the index now
    /// playing, or None when the call stopped playback.
    pub fn toggle(&self, index: usize, text: &str, voice: &str) -> Result<Option<usize>> {
        let mut playing = self.playing.lock().unwrap();

        if *playing == Some(index) {
            self.speech.stop();
            *playing = None;
            debug!("Playback stopped for message {}", index);
            return Ok(None);
        }

        self.speech.stop();
        *playing = None;

        self.speech
            .speak(text, voice)
            .map_err(|e| Error::SpeechFailed(e.to_string()))?;
        *playing = Some(index);
        debug!("Playback started for message {} ({})", index, voice);
        Ok(Some(index))
    }

    pub fn stop(&self) {
        self.speech.stop();
        *self.playing.lock().unwrap() = None;
    }

    /// Index of the message currently being voiced, if any. Clears itself
    /// once the utterance finishes on its own.
    pub fn playing(&self) -> Option<usize> {
        let mut playing = self.playing.lock().unwrap();
        if playing.is_some() && !self.speech.is_speaking() {
            *playing = None;
        }
        *playing
    }
}
