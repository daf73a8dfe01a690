use std::sync::Arc;

use super::CategorySource;
use super::client::{CatalogClient, SourceError, with_path_segment};
use super::html::{self, Tag};

const GAME_URL: &str = "https://www.gog.com/game";

/// Store tags from a GOG.com game page.
pub struct Gog {
    client: Arc<CatalogClient>,
}

impl Gog {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self { client }
    }
}

impl CategorySource for Gog {
    fn name(&self) -> &str {
        "Gog"
    }

    fn fetch_categories(&self, app_name: &str) -> Result<Vec<String>, SourceError> {
        let url = with_path_segment(GAME_URL, &game_slug(app_name))?;
        match self.client.get_page(&url, &[])? {
            Some(page) => Ok(parse_tags(&page)),
            None => Ok(Vec::new()),
        }
    }
}

/// URL slug GOG uses for a title: punctuation dropped, lowercase, spaces as
/// underscores and doubled underscores collapsed once.
pub(crate) fn game_slug(app_name: &str) -> String {
    let kept: String = app_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.to_lowercase().replace(' ', "_").replace("__", "_")
}

fn parse_tags(page: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    for anchor in html::elements(page, Tag::A) {
        if !anchor.has_classes("details__link details__link--tag") {
            continue;
        }
        let label = html::elements(anchor.inner(), Tag::Span)
            .into_iter()
            .find(|span| span.has_classes("details__link-text"));
        if let Some(label) = label {
            let tag = label.text();
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }

    tags
}
