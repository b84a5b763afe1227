use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One image queued for upload, kept in memory until submit.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Content type for a file name with an image extension, None otherwise.
/// Doubles as the accept filter for attachments.
pub fn image_mime(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit('.').next()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TranscriptionResponse {
    pub transcription: String,
    #[serde(default)]
    pub language: Option<String>,
}

/// Stored product as the backend returns it. The description is arbitrary
/// nested JSON; per-item display state lives in the catalog view, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: Value,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdvertisePayload {
    pub title: String,
    /// First catalog image, omitted entirely when the item has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub color: String,
    pub material: String,
    pub size: String,
    pub price: String,
}

#[derive(Debug, Deserialize)]
pub struct PredictPriceResponse {
    pub data: PredictedPrice,
}

#[derive(Debug, Deserialize)]
pub struct PredictedPrice {
    /// Number or string depending on the pricing model in use.
    pub suggested_price: Value,
}

#[derive(Debug, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
    pub message: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmationResponse {
    #[serde(default)]
    pub message: Option<String>,
}
