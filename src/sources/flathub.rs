use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::CategorySource;
use super::client::{CatalogClient, SourceError, with_path_segment};
use super::snapcraft::NamedCategory;

const SEARCH_URL: &str = "https://flathub.org/api/v2/compat/apps/search";
const DETAILS_URL: &str = "https://flathub.org/api/v2/compat/apps";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    #[serde(default)]
    name: String,
    #[serde(default)]
    flatpak_app_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppDetails {
    #[serde(default)]
    categories: Vec<NamedCategory>,
}

/// Freedesktop categories from the Flathub API.
///
/// Searches by name, prefers the hit whose name equals the query
/// (case-insensitive) and falls back to the first hit.
pub struct Flathub {
    client: Arc<CatalogClient>,
}

impl Flathub {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self { client }
    }
}

impl CategorySource for Flathub {
    fn name(&self) -> &str {
        "Flathub"
    }

    fn fetch_categories(&self, app_name: &str) -> Result<Vec<String>, SourceError> {
        let mut search_url = with_path_segment(SEARCH_URL, app_name)?;
        search_url.query_pairs_mut().append_pair("locale", "en");

        let hits: Vec<SearchHit> = match self.client.get_json(&search_url, &[]) {
            Ok(hits) => hits,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let Some(app_id) = select_app_id(&hits, app_name) else {
            debug!(app_name, hits = hits.len(), "no usable Flathub search hit");
            return Ok(Vec::new());
        };

        let details_url = with_path_segment(DETAILS_URL, &app_id)?;
        let details: AppDetails = self.client.get_json(&details_url, &[])?;
        Ok(details
            .categories
            .into_iter()
            .map(|category| category.name)
            .collect())
    }
}

fn select_app_id(hits: &[SearchHit], app_name: &str) -> Option<String> {
    let target = app_name.to_lowercase();
    hits.iter()
        .find(|hit| hit.name.to_lowercase() == target)
        .or_else(|| hits.first())
        .and_then(|hit| hit.flatpak_app_id.clone())
}
