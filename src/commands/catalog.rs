use crate::api::ApiClient;
use crate::catalog::CatalogView;
use crate::cli::CatalogAction;
use crate::describe::{render_description, unwrap_structured};
use crate::settings::AppSettings;
use log::error;
use serde_json::Value;
use std::io::BufRead;

pub async fn run(settings: &AppSettings, action: Option<CatalogAction>) -> anyhow::Result<()> {
    let api = ApiClient::new(&settings.backend_url)?;
    let mut view = CatalogView::new();

    let count = view.refresh(&api).await?;
    println!("Loaded {} product(s)\n", count);

    match action {
        Some(CatalogAction::List) => print_items(&view),
        Some(CatalogAction::Publish { index }) => publish(&api, &mut view, index).await,
        Some(CatalogAction::Predict { index }) => predict(&api, &mut view, index).await,
        Some(CatalogAction::Advertise { index }) => advertise(&api, &view, index).await,
        None => interactive(&api, &mut view).await?,
    }

    Ok(())
}

fn title_of(item: &crate::api::types::CatalogItem) -> String {
    match unwrap_structured(&item.description).get("title") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "Untitled Product".to_string(),
    }
}

fn print_items(view: &CatalogView) {
    for (index, item) in view.items().iter().enumerate() {
        println!("[{}] {}", index, title_of(item));
        if let Some(url) = item.images.first() {
            println!("    {}", url);
        }
        for line in render_description(&item.description).lines() {
            println!("    {}", line);
        }
        if view.is_listed(index) {
            println!("    ✅ Listed");
        }
        if let Some(price) = view.predicted_price(index) {
            println!("    🔮 Predicted Price: ₹{}", price);
        }
        println!();
    }
}

async fn publish(api: &ApiClient, view: &mut CatalogView, index: usize) {
    match view.publish(api, index).await {
        Ok(true) => println!("✅ Listed"),
        Ok(false) => println!("Product {} is already listed", index),
        Err(e) => {
            error!("List on Shopify failed: {}", e);
            println!("❌ Failed to list on Shopify. Check logs.");
        }
    }
}

async fn predict(api: &ApiClient, view: &mut CatalogView, index: usize) {
    match view.predict_price(api, index).await {
        Ok(price) => println!("🔮 Predicted Price: ₹{}", price),
        Err(e) => {
            error!("Price prediction failed: {}", e);
            println!("❌ Failed to predict price.");
        }
    }
}

async fn advertise(api: &ApiClient, view: &CatalogView, index: usize) {
    match view.advertise(api, index).await {
        Ok(()) => println!("✅ Advertisement started. Check backend logs."),
        Err(e) => {
            error!("Advertise failed: {}", e);
            println!("❌ Failed to advertise.");
        }
    }
}

async fn refresh(api: &ApiClient, view: &mut CatalogView) {
    match view.refresh(api).await {
        Ok(count) => println!("Loaded {} product(s)", count),
        Err(e) => {
            error!("Refresh failed: {}", e);
            println!("❌ Failed to refresh.");
        }
    }
}

async fn interactive(api: &ApiClient, view: &mut CatalogView) -> anyhow::Result<()> {
    print_items(view);
    println!("Commands: list | publish <n> | predict <n> | advertise <n> | refresh | quit");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(word) => word,
            None => continue,
        };

        match (command, parts.next()) {
            ("list", _) => print_items(view),
            ("refresh", _) => refresh(api, view).await,
            ("publish", Some(arg)) => match arg.parse() {
                Ok(index) => publish(api, view, index).await,
                Err(_) => println!("Usage: publish <n>"),
            },
            ("predict", Some(arg)) => match arg.parse() {
                Ok(index) => predict(api, view, index).await,
                Err(_) => println!("Usage: predict <n>"),
            },
            ("advertise", Some(arg)) => match arg.parse() {
                Ok(index) => advertise(api, view, index).await,
                Err(_) => println!("Usage: advertise <n>"),
            },
            ("quit", _) | ("q", _) | ("exit", _) => break,
            _ => println!("Commands: list | publish <n> | predict <n> | advertise <n> | refresh | quit"),
        }
    }

    Ok(())
}
