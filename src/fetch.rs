use anyhow::{Context, Result};
use tracing::info;

use crate::settings::Settings;

/// Download the partner listing page. Any failure ends the run; there is no retry.
pub async fn fetch_listing(settings: &Settings) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .build()
        .context("Failed to build HTTP client")?;

    info!("Fetching partner listing: {}", settings.listing_url);
    let html = client
        .get(&settings.listing_url)
        .send()
        .await
        .context("Failed to reach partner listing")?
        .error_for_status()
        .context("Partner listing returned an error status")?
        .text()
        .await
        .context("Failed to read partner listing")?;

    info!("Fetched {} bytes", html.len());
    Ok(html)
}
