pub mod types;

use crate::audio_toolkit::{clip_to_wav_bytes, AudioClip};
use crate::error::{Error, Result};
use log::debug;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::time::Duration;

use types::{
    AdvertisePayload, CatalogItem, ChatRequest, ChatResponse, ConfirmationResponse,
    ImageAttachment, PredictPriceResponse, TranscriptionResponse, WelcomeResponse,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Typed client for the assistant backend. One method per endpoint; no
/// retries, a failed call surfaces once to the caller.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

async fn response_error_text(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());
    format!("status {}: {}", status, body)
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn audio_part(clip: &AudioClip) -> std::result::Result<Part, String> {
        let wav_data =
            clip_to_wav_bytes(clip).map_err(|e| format!("failed to encode WAV: {}", e))?;
        debug!("Encoded clip to WAV ({} bytes)", wav_data.len());

        Part::bytes(wav_data)
            .file_name("voice.wav")
            .mime_str("audio/wav")
            .map_err(|e| format!("failed to create audio part: {}", e))
    }

    fn image_part(image: &ImageAttachment) -> std::result::Result<Part, String> {
        let part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        match types::image_mime(&image.file_name) {
            Some(mime) => part
                .mime_str(mime)
                .map_err(|e| format!("failed to create image part: {}", e)),
            None => Ok(part),
        }
    }

    async fn upload_audio(
        &self,
        path: &str,
        clip: &AudioClip,
    ) -> std::result::Result<TranscriptionResponse, String> {
        if clip.samples.is_empty() {
            return Err("no audio was recorded".to_string());
        }

        let form = Form::new().part("audio", Self::audio_part(clip)?);
        let response = self
            .http
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(response_error_text(response).await);
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid transcription response: {}", e))?;
        debug!(
            "Transcription completed ({} chars, language {:?})",
            result.transcription.len(),
            result.language
        );
        Ok(result)
    }

    /// Transcribe a recorded voice note for the generation dialog.
    pub async fn transcribe(&self, clip: &AudioClip) -> Result<TranscriptionResponse> {
        self.upload_audio("/transcribe", clip)
            .await
            .map_err(Error::TranscriptionFailed)
    }

    /// Transcribe chat voice input.
    pub async fn speech_to_text(&self, clip: &AudioClip) -> Result<TranscriptionResponse> {
        self.upload_audio("/api/speech-to-text", clip)
            .await
            .map_err(Error::TranscriptionFailed)
    }

    /// Generate a structured description from images plus the voice text.
    pub async fn describe(&self, images: &[ImageAttachment], voice_text: &str) -> Result<Value> {
        let mut form = Form::new();
        for image in images {
            form = form.part(
                "images",
                Self::image_part(image).map_err(Error::GenerationFailed)?,
            );
        }
        form = form.text("voice_text", voice_text.to_string());

        let response = self
            .http
            .post(self.url("/describe"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::GenerationFailed(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::GenerationFailed(response_error_text(response).await));
        }

        let description: Value = response
            .json()
            .await
            .map_err(|e| Error::GenerationFailed(format!("invalid response: {}", e)))?;
        Ok(description)
    }

    pub async fn save_to_db(
        &self,
        images: &[ImageAttachment],
        description: &Value,
    ) -> Result<ConfirmationResponse> {
        let mut form = Form::new();
        for image in images {
            form = form.part("images", Self::image_part(image).map_err(Error::Network)?);
        }
        form = form.text("description", serde_json::to_string(description)?);

        let response = self
            .http
            .post(self.url("/save-to-db"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Network(response_error_text(response).await));
        }
        Ok(response.json().await?)
    }

    pub async fn save_to_sheet(&self, description: &Value) -> Result<ConfirmationResponse> {
        let response = self
            .http
            .post(self.url("/save-to-sheet"))
            .json(&json!({ "description": description }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Network(response_error_text(response).await));
        }
        Ok(response.json().await?)
    }

    pub async fn products(&self) -> Result<Vec<CatalogItem>> {
        let response = self.http.get(self.url("/products")).send().await?;

        if !response.status().is_success() {
            return Err(Error::Network(response_error_text(response).await));
        }

        let items: Vec<CatalogItem> = response.json().await?;
        debug!("Fetched {} products", items.len());
        Ok(items)
    }

    pub async fn list_on_shopify(&self, item: &CatalogItem) -> Result<()> {
        let response = self
            .http
            .post(self.url("/list-on-shopify"))
            .json(item)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Network(response_error_text(response).await));
        }
        Ok(())
    }

    /// Ask for a suggested price. The backend answers with a number or a
    /// string depending on the pricing model.
    pub async fn predict_price(&self, item: &CatalogItem) -> Result<Value> {
        let response = self
            .http
            .post(self.url("/predict-price"))
            .json(item)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Network(response_error_text(response).await));
        }

        let parsed: PredictPriceResponse = response.json().await?;
        Ok(parsed.data.suggested_price)
    }

    /// Trigger the advertising pipeline. Fire-and-forget: the response body
    /// is ignored beyond the status check.
    pub async fn advertise(&self, payload: &AdvertisePayload) -> Result<()> {
        let response = self
            .http
            .post(self.url("/scrape-store-info"))
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Network(response_error_text(response).await));
        }
        Ok(())
    }

    pub async fn chat_welcome(&self) -> Result<String> {
        let response = self.http.get(self.url("/chat/welcome")).send().await?;

        if !response.status().is_success() {
            return Err(Error::Network(response_error_text(response).await));
        }

        let parsed: WelcomeResponse = response.json().await?;
        Ok(parsed.message)
    }

    pub async fn chat_ask(&self, user_id: Option<&str>, message: &str) -> Result<ChatResponse> {
        let request = ChatRequest { user_id, message };
        let response = self
            .http
            .post(self.url("/chat/ask"))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Network(response_error_text(response).await));
        }

        Ok(response.json().await?)
    }
}
