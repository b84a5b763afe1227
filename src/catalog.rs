use crate::api::types::{AdvertisePayload, CatalogItem};
use crate::api::ApiClient;
use crate::error::{Error, Result};
use log::debug;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Saved products with per-position action state. Positions are row
/// indexes from the latest refresh; both annotation sets start empty again
/// whenever the list is reloaded.
#[derive(Default)]
pub struct CatalogView {
    items: Vec<CatalogItem>,
    listed: HashSet<usize>,
    predicted: HashMap<usize, String>,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reload the product list. All annotations are dropped since rows may
    /// have shifted position.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<usize> {
        self.items = api.products().await?;
        self.listed.clear();
        self.predicted.clear();
        debug!("Catalog refreshed: {} items", self.items.len());
        Ok(self.items.len())
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Result<&CatalogItem> {
        self.items
            .get(index)
            .ok_or(Error::Validation("no catalog item at that position"))
    }

    pub fn is_listed(&self, index: usize) -> bool {
        self.listed.contains(&index)
    }

    pub fn predicted_price(&self, index: usize) -> Option<&str> {
        self.predicted.get(&index).map(String::as_str)
    }

    /// Publish one item to the store. Returns false without a request when
    /// the position is already listed.
    pub async fn publish(&mut self, api: &ApiClient, index: usize) -> Result<bool> {
        let item = self.item(index)?;
        if self.listed.contains(&index) {
            debug!("Item {} is already listed, skipping publish", index);
            return Ok(false);
        }
        api.list_on_shopify(item).await?;
        self.listed.insert(index);
        Ok(true)
    }

    /// Fetch a price suggestion and pin it to the row. A newer suggestion
    /// replaces the previous one; a failed request leaves it alone.
    pub async fn predict_price(&mut self, api: &ApiClient, index: usize) -> Result<String> {
        let item = self.item(index)?;
        let suggested = api.predict_price(item).await?;
        let price = price_text(&suggested);
        self.predicted.insert(index, price.clone());
        Ok(price)
    }

    /// Kick off an advertisement run for one item.
    pub async fn advertise(&self, api: &ApiClient, index: usize) -> Result<()> {
        let payload = advertise_payload(self.item(index)?);
        api.advertise(&payload).await
    }
}

/// The ad composer reads the lowercase `structured_data` block only; the
/// renderer's other wrapper spellings do not apply here.
pub fn advertise_payload(item: &CatalogItem) -> AdvertisePayload {
    let structured = item.description.get("structured_data");
    AdvertisePayload {
        title: field_text(structured, "title", "Untitled"),
        image_url: item.images.first().cloned(),
        color: field_text(structured, "color", "N/A"),
        material: field_text(structured, "material", "N/A"),
        size: field_text(structured, "size", "N/A"),
        price: field_text(structured, "price", "N/A"),
    }
}

/// Empty strings and zero both count as missing.
fn field_text(structured: Option<&Value>, key: &str, fallback: &str) -> String {
    match structured.and_then(|v| v.get(key)) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        _ => fallback.to_string(),
    }
}

fn price_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
