use crate::api::types::{image_mime, ImageAttachment, TranscriptionResponse};
use crate::api::ApiClient;
use crate::audio_toolkit::AudioClip;
use crate::error::{Error, Result};
use crate::managers::RecordingManager;
use log::{debug, warn};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum DialogState {
    Composing,
    Submitting,
    Done,
    Error(String),
}

/// Everything a successful generation hands back to the caller.
#[derive(Debug, Clone)]
pub struct GeneratedListing {
    pub images: Vec<ImageAttachment>,
    pub voice_text: String,
    pub description: Value,
}

impl GeneratedListing {
    pub async fn save_to_db(&self, api: &ApiClient) -> Result<Option<String>> {
        let confirmation = api.save_to_db(&self.images, &self.description).await?;
        Ok(confirmation.message)
    }

    pub async fn save_to_sheet(&self, api: &ApiClient) -> Result<Option<String>> {
        let confirmation = api.save_to_sheet(&self.description).await?;
        Ok(confirmation.message)
    }
}

/// One generation attempt: collect images, capture a voice note, submit
/// both for a structured description. A failed submit keeps every input so
/// the user can retry as-is.
pub struct GenerationDialog {
    state: DialogState,
    images: Vec<ImageAttachment>,
    voice_text: String,
    recording: RecordingManager,
}

impl GenerationDialog {
    pub fn new(recording: RecordingManager) -> Self {
        Self {
            state: DialogState::Composing,
            images: Vec::new(),
            voice_text: String::new(),
            recording,
        }
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn images(&self) -> &[ImageAttachment] {
        &self.images
    }

    pub fn voice_text(&self) -> &str {
        &self.voice_text
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_recording()
    }

    /* ---------- image selection -------------------------------------------- */

    /// Queue an image for upload. Files without an image extension are
    /// skipped, mirroring the picker's accept filter.
    pub fn attach_image(&mut self, file_name: &str, bytes: Vec<u8>) -> bool {
        if image_mime(file_name).is_none() {
            warn!("Skipping non-image attachment: {}", file_name);
            return false;
        }

        self.images.push(ImageAttachment {
            file_name: file_name.to_string(),
            bytes,
        });
        debug!("Attached image {} ({} total)", file_name, self.images.len());
        true
    }

    pub fn remove_image(&mut self, index: usize) -> Option<ImageAttachment> {
        if index >= self.images.len() {
            return None;
        }
        Some(self.images.remove(index))
    }

    /* ---------- voice note ------------------------------------------------- */

    /// Start a voice note. Any pending transcription is cleared once the
    /// microphone is actually live.
    pub fn start_voice_note(&mut self, preferred_device: Option<&str>) -> Result<()> {
        self.recording.start(preferred_device)?;
        self.voice_text.clear();
        Ok(())
    }

    /// Stop the voice note without transcribing it yet.
    pub fn stop_voice_note(&mut self) -> Result<AudioClip> {
        self.recording.stop()
    }

    /// Transcribe a captured clip, replacing the editable text. On failure
    /// the previous text is left untouched.
    pub async fn transcribe_clip(
        &mut self,
        api: &ApiClient,
        clip: &AudioClip,
    ) -> Result<TranscriptionResponse> {
        let result = api.transcribe(clip).await?;
        self.voice_text = result.transcription.clone();
        Ok(result)
    }

    /// Stop the voice note and transcribe it in one go.
    pub async fn finish_voice_note(&mut self, api: &ApiClient) -> Result<TranscriptionResponse> {
        let clip = self.stop_voice_note()?;
        self.transcribe_clip(api, &clip).await
    }

    /// Discard the voice note and its pending transcription.
    pub fn cancel_voice_note(&mut self) {
        self.recording.cancel();
        self.voice_text.clear();
    }

    /// Manual edit of the transcription text.
    pub fn set_voice_text(&mut self, text: &str) {
        self.voice_text = text.to_string();
    }

    /* ---------- submission ------------------------------------------------- */

    /// Submit for generation. Requires at least one image and non-blank
    /// voice text; violations fail locally without any request.
    pub async fn submit(&mut self, api: &ApiClient) -> Result<GeneratedListing> {
        match self.state {
            DialogState::Composing | DialogState::Error(_) => {}
            _ => return Err(Error::InvalidState("dialog is not accepting a submit")),
        }

        if self.images.is_empty() || self.voice_text.trim().is_empty() {
            return Err(Error::Validation(
                "Please upload at least one image and record your voice.",
            ));
        }

        self.state = DialogState::Submitting;
        match api.describe(&self.images, &self.voice_text).await {
            Ok(description) => {
                self.state = DialogState::Done;
                Ok(GeneratedListing {
                    images: std::mem::take(&mut self.images),
                    voice_text: std::mem::take(&mut self.voice_text),
                    description,
                })
            }
            Err(e) => {
                self.state = DialogState::Error(e.to_string());
                Err(e)
            }
        }
    }
}
