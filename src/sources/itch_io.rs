use std::sync::Arc;

use reqwest::Url;
use tracing::debug;

use super::CategorySource;
use super::client::{CatalogClient, SourceError, parse_url};
use super::html::{self, Tag};

const SEARCH_URL: &str = "https://itch.io/search";

/// Tags (or, failing that, genres) from an itch.io game page.
///
/// Only a search result whose title equals the application name
/// (case-insensitive) is followed.
pub struct ItchIo {
    client: Arc<CatalogClient>,
}

impl ItchIo {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self { client }
    }
}

impl CategorySource for ItchIo {
    fn name(&self) -> &str {
        "Itch.io"
    }

    fn fetch_categories(&self, app_name: &str) -> Result<Vec<String>, SourceError> {
        let mut search_url = parse_url(SEARCH_URL)?;
        search_url
            .query_pairs_mut()
            .append_pair("classification", "game")
            .append_pair("q", app_name)
            .append_pair("type", "games");

        let Some(search_page) = self.client.get_page(&search_url, &[])? else {
            return Ok(Vec::new());
        };
        let Some(game_url) = find_game_link(&search_page, app_name, &search_url)? else {
            debug!(app_name, "no exact itch.io title match");
            return Ok(Vec::new());
        };

        match self.client.get_page(&game_url, &[])? {
            Some(page) => Ok(parse_info_table(&page)),
            None => Ok(Vec::new()),
        }
    }
}

fn find_game_link(page: &str, app_name: &str, base: &Url) -> Result<Option<Url>, SourceError> {
    let target = app_name.to_lowercase();

    let href = html::elements(page, Tag::A)
        .into_iter()
        .filter(|anchor| anchor.has_classes("title game_link"))
        .find(|anchor| anchor.text().to_lowercase() == target)
        .and_then(|anchor| anchor.attr("href"));

    href.map(|href| {
        base.join(&href)
            .map_err(|e| SourceError::InvalidUrl(format!("{href}: {e}")))
    })
    .transpose()
}

/// Reads the "More information" table, preferring the Tags row over Genre.
fn parse_info_table(page: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut genre = Vec::new();

    for row in html::elements(page, Tag::Tr) {
        let cells = html::elements(row.inner(), Tag::Td);
        let [key, value, ..] = cells.as_slice() else {
            continue;
        };

        let links = || -> Vec<String> {
            html::elements(value.inner(), Tag::A)
                .iter()
                .map(|a| a.text())
                .collect()
        };
        match key.text().to_lowercase().as_str() {
            "tags" => tags = links(),
            "genre" => genre = links(),
            _ => {}
        }
    }

    if tags.is_empty() { genre } else { tags }
}
