use std::sync::Arc;

use reqwest::Url;
use tracing::debug;

use super::CategorySource;
use super::client::{CatalogClient, SourceError, parse_url};
use super::html::{self, Tag};

const SITE_URL: &str = "https://www.myabandonware.com";

/// Genre from a MyAbandonware game page.
pub struct MyAbandonware {
    client: Arc<CatalogClient>,
}

impl MyAbandonware {
    pub fn new(client: Arc<CatalogClient>) -> Self {
        Self { client }
    }
}

impl CategorySource for MyAbandonware {
    fn name(&self) -> &str {
        "My Abandonware"
    }

    fn fetch_categories(&self, app_name: &str) -> Result<Vec<String>, SourceError> {
        let search_url = parse_url(&format!("{SITE_URL}/search/q/{}", search_term(app_name)))?;
        let Some(search_page) = self.client.get_page(&search_url, &[])? else {
            return Ok(Vec::new());
        };

        let site = parse_url(SITE_URL)?;
        let Some(game_url) = find_game_link(&search_page, app_name, &site)? else {
            debug!(app_name, "no exact MyAbandonware title match");
            return Ok(Vec::new());
        };

        match self.client.get_page(&game_url, &[])? {
            Some(page) => Ok(parse_genre(&page).into_iter().collect()),
            None => Ok(Vec::new()),
        }
    }
}

/// Search path component: `:` escaped, spaces as `+`.
fn search_term(app_name: &str) -> String {
    let mut term = String::with_capacity(app_name.len());
    for c in app_name.chars() {
        match c {
            ':' => term.push_str("%3A"),
            ' ' => term.push('+'),
            '/' => term.push_str("%2F"),
            '?' => term.push_str("%3F"),
            '#' => term.push_str("%23"),
            _ => term.push(c),
        }
    }
    term
}

/// Title comparison ignores one pair of surrounding single quotes.
fn strip_quotes(app_name: &str) -> &str {
    let name = app_name.strip_prefix('\'').unwrap_or(app_name);
    name.strip_suffix('\'').unwrap_or(name)
}

fn find_game_link(page: &str, app_name: &str, site: &Url) -> Result<Option<Url>, SourceError> {
    let Some(results) = html::blocks_with_classes(page, Tag::Div, "items games")
        .into_iter()
        .next()
    else {
        return Ok(None);
    };

    let target = strip_quotes(app_name).to_lowercase();
    let href = html::elements(results.inner(), Tag::A)
        .into_iter()
        .filter(|anchor| anchor.has_classes("name c-item-game__name"))
        .find(|anchor| anchor.text().to_lowercase() == target)
        .and_then(|anchor| anchor.attr("href"));

    href.map(|href| {
        site.join(&href)
            .map_err(|e| SourceError::InvalidUrl(format!("{href}: {e}")))
    })
    .transpose()
}

fn parse_genre(page: &str) -> Option<String> {
    for row in html::elements(page, Tag::Tr) {
        let is_genre_row = html::elements(row.inner(), Tag::Th).iter().any(|th| {
            th.attr("scope").as_deref() == Some("row") && th.text() == "Genre"
        });
        if !is_genre_row {
            continue;
        }

        let Some(cell) = html::elements(row.inner(), Tag::Td).into_iter().next() else {
            continue;
        };
        if let Some(link) = html::elements(cell.inner(), Tag::A).into_iter().next() {
            return Some(link.text());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Url {
        Url::parse(SITE_URL).unwrap()
    }

    #[test]
    fn search_term_escapes_colon_and_spaces() {
        assert_eq!(search_term("Dune II: Battle for Arrakis"), "Dune+II%3A+Battle+for+Arrakis");
        assert_eq!(search_term("Doom"), "Doom");
    }

    #[test]
    fn surrounding_quotes_are_ignored() {
        assert_eq!(strip_quotes("'Doom'"), "Doom");
        assert_eq!(strip_quotes("Baldur's Gate"), "Baldur's Gate");
        assert_eq!(strip_quotes("'"), "");
    }

    #[test]
    fn follows_exact_title_in_results_list() {
        let page = r#"
            <div class="box">
              <a class="name c-item-game__name" href="/game/doom-ii-2bi">Doom II</a>
            </div>
            <div class="items games">
              <div class="c-item-game">
                <a class="name c-item-game__name" href="/game/doom-ii-2bi">Doom II</a>
              </div>
              <div class="c-item-game">
                <a class="name c-item-game__name" href="/game/doom-2ec">Doom</a>
              </div>
            </div>"#;

        let link = find_game_link(page, "'doom'", &site()).unwrap().unwrap();
        assert_eq!(link.as_str(), "https://www.myabandonware.com/game/doom-2ec");
    }

    #[test]
    fn titles_after_the_results_list_are_ignored() {
        let page = r#"
            <div class="items games">
              <div class="c-item-game">
                <a class="name c-item-game__name" href="/game/doom-ii-2bi">Doom II</a>
              </div>
            </div>
            <div class="sidebar">
              <a class="name c-item-game__name" href="/game/doom-2ec">Doom</a>
            </div>"#;

        assert!(find_game_link(page, "Doom", &site()).unwrap().is_none());
    }

    #[test]
    fn missing_results_list_yields_none() {
        let page = r#"<a class="name c-item-game__name" href="/game/doom-2ec">Doom</a>"#;
        assert!(find_game_link(page, "Doom", &site()).unwrap().is_none());
    }

    #[test]
    fn genre_comes_from_first_cell_link() {
        let page = r#"
            <table class="gameInfo">
              <tr><th scope="row">Released</th><td><a href="/year/1993">1993</a></td></tr>
              <tr><th scope="row">Genre</th><td><a href="/genre/action-2">Action</a></td></tr>
              <tr><th scope="row">Theme</th><td><a href="/theme/sci-fi">Sci-Fi</a></td></tr>
            </table>"#;
        assert_eq!(parse_genre(page).as_deref(), Some("Action"));
    }

    #[test]
    fn genre_row_without_link_yields_none() {
        let page = r#"<table><tr><th scope="row">Genre</th><td>Unknown</td></tr></table>"#;
        assert_eq!(parse_genre(page), None);
    }
}
