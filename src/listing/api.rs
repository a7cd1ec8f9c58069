use serde::Deserialize;

use crate::foundation::core::Template;
use crate::foundation::error::{MemeError, MemeResult};

/// Public template listing endpoint.
pub const DEFAULT_LISTING_API: &str = "https://api.imgflip.com/get_memes";

/// Side length assumed when the listing omits a dimension or reports zero.
pub const FALLBACK_DIMENSION: u32 = 500;

#[derive(Debug, Deserialize)]
struct ListingResponse {
    success: bool,
    #[serde(default)]
    data: Option<ListingData>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    memes: Vec<ListedMeme>,
}

#[derive(Debug, Deserialize)]
struct ListedMeme {
    id: String,
    name: String,
    url: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

impl ListedMeme {
    fn into_template(self) -> MemeResult<Template> {
        let side = |v: Option<u32>| v.filter(|&v| v > 0).unwrap_or(FALLBACK_DIMENSION);
        Template::new(
            self.id,
            self.url,
            self.name,
            side(self.width),
            side(self.height),
        )
    }
}

/// Parse a listing response body into templates.
///
/// Entries are returned in listing order. `success: false` and any shape mismatch are errors.
pub fn parse_listing(body: &[u8]) -> MemeResult<Vec<Template>> {
    let res: ListingResponse = serde_json::from_slice(body)
        .map_err(|e| MemeError::listing(format!("malformed listing: {e}")))?;
    if !res.success {
        let reason = res
            .error_message
            .unwrap_or_else(|| "listing reported failure".to_string());
        return Err(MemeError::listing(reason));
    }
    let data = res
        .data
        .ok_or_else(|| MemeError::listing("listing has no data"))?;
    data.memes
        .into_iter()
        .map(ListedMeme::into_template)
        .collect()
}

/// Fetch and parse the listing at `api_url`.
#[tracing::instrument(skip(client))]
pub async fn fetch_templates(client: &reqwest::Client, api_url: &str) -> MemeResult<Vec<Template>> {
    let res = client
        .get(api_url)
        .send()
        .await
        .map_err(|e| MemeError::listing(format!("request failed: {e}")))?;
    let status = res.status();
    if !status.is_success() {
        return Err(MemeError::listing(format!("listing returned HTTP {status}")));
    }
    let body = res
        .bytes()
        .await
        .map_err(|e| MemeError::listing(format!("read body: {e}")))?;
    let templates = parse_listing(&body)?;
    tracing::info!(count = templates.len(), "listing loaded");
    Ok(templates)
}

/// Templates whose name contains `query`, ignoring case and surrounding whitespace.
///
/// A blank query returns every template. Order is preserved.
pub fn filter_templates<'a>(templates: &'a [Template], query: &str) -> Vec<&'a Template> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return templates.iter().collect();
    }
    templates
        .iter()
        .filter(|t| t.name.to_lowercase().contains(&q))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/listing/api.rs"]
mod tests;
