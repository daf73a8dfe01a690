use std::sync::{Arc, LazyLock};

use regex::Regex;
use reqwest::Url;
use tracing::debug;

use super::CategorySource;
use super::client::{CatalogClient, SourceError, with_path_segment};
use super::html::{self, Element, Tag};

const SEARCH_URL: &str = "https://www.apple.com/us/search";

static CATEGORY_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<dt\b[^>]*>\s*Category\s*</dt\s*>.*?<dd\b[^>]*>(.*?)</dd\s*>")
        .expect("valid regex")
});

/// App Store category scraped from apple.com.
///
/// The site search is used to find the product page; the first result whose
/// title contains the application name wins.
pub struct AppleStore {
    client: Arc<CatalogClient>,
}

impl AppleStore {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self { client }
    }
}

impl CategorySource for AppleStore {
    fn name(&self) -> &str {
        "Apple Store"
    }

    fn fetch_categories(&self, app_name: &str) -> Result<Vec<String>, SourceError> {
        let mut search_url = with_path_segment(SEARCH_URL, app_name)?;
        search_url.query_pairs_mut().append_pair("src", "serp");

        let Some(search_page) = self.client.get_page(&search_url, &[])? else {
            return Ok(Vec::new());
        };
        let Some(link) = find_product_link(&search_page, app_name, &search_url)? else {
            debug!(app_name, "no matching App Store search result");
            return Ok(Vec::new());
        };

        let Some(product_page) = self.client.get_page(&link, &[])? else {
            return Ok(Vec::new());
        };
        Ok(parse_category(&product_page).into_iter().collect())
    }
}

/// Link of the first search result whose product name contains `app_name`.
fn find_product_link(
    page: &str,
    app_name: &str,
    base: &Url,
) -> Result<Option<Url>, SourceError> {
    let target = app_name.to_lowercase();

    for block in html::blocks_with_classes(page, Tag::Div, "rf-serp-product-description") {
        let title = html::elements(block.inner(), Tag::H2)
            .into_iter()
            .find(|h2| h2.has_classes("rf-serp-productname"))
            .map(|h2| h2.text().to_lowercase());
        let Some(title) = title else {
            continue;
        };
        if !title.contains(&target) {
            continue;
        }

        let href = html::elements(block.inner(), Tag::A)
            .iter()
            .find_map(|anchor: &Element<'_>| anchor.attr("href"));
        if let Some(href) = href {
            let url = base
                .join(&href)
                .map_err(|e| SourceError::InvalidUrl(format!("{href}: {e}")))?;
            return Ok(Some(url));
        }
    }

    Ok(None)
}

/// Text of the `<dd>` following the "Category" `<dt>` on a product page.
fn parse_category(page: &str) -> Option<String> {
    let caps = CATEGORY_ROW.captures(page)?;
    let category = html::text_content(caps.get(1)?.as_str());
    (!category.is_empty()).then_some(category)
}
