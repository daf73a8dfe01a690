use std::sync::Arc;

use serde::Deserialize;

use super::CategorySource;
use super::client::{CatalogClient, SourceError, with_path_segment};

const INFO_URL: &str = "https://api.snapcraft.io/v2/snaps/info";

const HEADERS: [(&str, &str); 3] = [
    ("Snap-Device-Series", "16"),
    ("User-Agent", "SnapInfoCLI/1.0"),
    ("Accept", "application/json"),
];

#[derive(Debug, Deserialize)]
struct SnapInfo {
    #[serde(default)]
    snap: SnapDetails,
}

#[derive(Debug, Default, Deserialize)]
struct SnapDetails {
    #[serde(default)]
    categories: Vec<NamedCategory>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NamedCategory {
    pub(super) name: String,
}

/// Snap Store categories from the Snapcraft info API.
///
/// The application name is used as the snap name verbatim.
pub struct Snapcraft {
    client: Arc<CatalogClient>,
}

impl Snapcraft {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self { client }
    }
}

impl CategorySource for Snapcraft {
    fn name(&self) -> &str {
        "Snapcraft"
    }

    fn fetch_categories(&self, app_name: &str) -> Result<Vec<String>, SourceError> {
        let mut url = with_path_segment(INFO_URL, app_name)?;
        url.query_pairs_mut()
            .append_pair("fields", "snap-id,categories");

        match self.client.get_page(&url, &HEADERS)? {
            Some(body) => parse_categories(&body),
            None => Ok(Vec::new()),
        }
    }
}

fn parse_categories(body: &str) -> Result<Vec<String>, SourceError> {
    let info: SnapInfo = serde_json::from_str(body).map_err(SourceError::Serialization)?;
    Ok(info
        .snap
        .categories
        .into_iter()
        .map(|category| category.name)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_names_in_order() {
        let body = r#"{
            "name": "vlc",
            "snap": {
                "snap-id": "RT9mcUhVsRYrDLG8qnvGiy26NKvv6Qkd",
                "categories": [
                    { "featured": true, "name": "photo-and-video" },
                    { "featured": false, "name": "music-and-audio" }
                ]
            }
        }"#;

        assert_eq!(
            parse_categories(body).unwrap(),
            vec!["photo-and-video", "music-and-audio"]
        );
    }

    #[test]
    fn missing_snap_or_categories_yield_no_tags() {
        assert!(parse_categories(r#"{}"#).unwrap().is_empty());
        assert!(parse_categories(r#"{ "snap": {} }"#).unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_a_serialization_error() {
        assert!(matches!(
            parse_categories("<html>busy</html>"),
            Err(SourceError::Serialization(_))
        ));
    }
}
