//! Minimal HTML extraction for the storefront adapters.
//!
//! Storefront pages are only mined for a handful of well-known elements, so a
//! few regular expressions are enough. [`elements`] assumes elements of the
//! same tag do not nest, which holds for the anchors, spans and table cells
//! read here; [`blocks_with_classes`] tracks nesting for container `<div>`s.

use std::sync::LazyLock;

use regex::Regex;

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid regex")
});

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9A-Fa-f]+|#[0-9]+|[A-Za-z]+);").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// One element found in a page: its raw attribute string and inner HTML.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Element<'h> {
    attrs: &'h str,
    inner: &'h str,
}

impl<'h> Element<'h> {
    /// Value of attribute `name`, entity-decoded.
    pub(crate) fn attr(&self, name: &str) -> Option<String> {
        ATTRIBUTE.captures_iter(self.attrs).find_map(|caps| {
            let key = caps.get(1)?.as_str();
            if !key.eq_ignore_ascii_case(name) {
                return None;
            }
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            Some(decode_entities(value))
        })
    }

    /// True when the element's class list contains every class in `classes`.
    pub(crate) fn has_classes(&self, classes: &str) -> bool {
        let Some(class_attr) = self.attr("class") else {
            return false;
        };
        let present: Vec<&str> = class_attr.split_whitespace().collect();
        classes
            .split_whitespace()
            .all(|wanted| present.contains(&wanted))
    }

    pub(crate) fn inner(&self) -> &'h str {
        self.inner
    }

    /// Visible text with tags stripped, entities decoded and whitespace collapsed.
    pub(crate) fn text(&self) -> String {
        text_content(self.inner)
    }
}

/// Element names the adapters look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag {
    A,
    Div,
    H2,
    Span,
    Td,
    Th,
    Tr,
}

impl Tag {
    const ALL: [Tag; 7] = [Tag::A, Tag::Div, Tag::H2, Tag::Span, Tag::Td, Tag::Th, Tag::Tr];

    fn name(self) -> &'static str {
        match self {
            Tag::A => "a",
            Tag::Div => "div",
            Tag::H2 => "h2",
            Tag::Span => "span",
            Tag::Td => "td",
            Tag::Th => "th",
            Tag::Tr => "tr",
        }
    }

    /// `<tag ...>inner</tag>`, non-nesting.
    fn element(self) -> &'static Regex {
        static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
            Tag::ALL
                .iter()
                .map(|tag| {
                    let name = tag.name();
                    Regex::new(&format!(r"(?is)<{name}\b([^>]*)>(.*?)</{name}\s*>"))
                        .expect("valid regex")
                })
                .collect()
        });
        &PATTERNS[self as usize]
    }

    /// Any opening or closing `tag`; group 1 is `/` for closing tags.
    fn boundary(self) -> &'static Regex {
        static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
            Tag::ALL
                .iter()
                .map(|tag| {
                    let name = tag.name();
                    Regex::new(&format!(r"(?is)<(/?){name}\b([^>]*)>")).expect("valid regex")
                })
                .collect()
        });
        &PATTERNS[self as usize]
    }
}

/// All `<tag ...>...</tag>` elements in `html`, in document order.
pub(crate) fn elements(html: &str, tag: Tag) -> Vec<Element<'_>> {
    tag.element()
        .captures_iter(html)
        .filter_map(|caps| {
            Some(Element {
                attrs: caps.get(1)?.as_str(),
                inner: caps.get(2)?.as_str(),
            })
        })
        .collect()
}

/// Every `<tag>` carrying `classes`, with its inner HTML running to the
/// matching close tag (or the end of `html` when unclosed).
///
/// Unlike [`elements`], this follows nesting, so it suits containers that
/// hold elements of their own tag.
pub(crate) fn blocks_with_classes<'h>(html: &'h str, tag: Tag, classes: &str) -> Vec<Element<'h>> {
    let boundaries: Vec<regex::Captures<'h>> = tag.boundary().captures_iter(html).collect();
    let is_closing = |caps: &regex::Captures<'_>| caps.get(1).is_some_and(|m| !m.is_empty());
    let is_self_closing = |caps: &regex::Captures<'_>| {
        caps.get(2).is_some_and(|m| m.as_str().trim_end().ends_with('/'))
    };

    let mut blocks = Vec::new();
    for (n, caps) in boundaries.iter().enumerate() {
        if is_closing(caps) || is_self_closing(caps) {
            continue;
        }
        let (Some(opening), Some(attrs)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let element = Element {
            attrs: attrs.as_str(),
            inner: "",
        };
        if !element.has_classes(classes) {
            continue;
        }

        let mut depth = 0usize;
        let mut end = html.len();
        for later in &boundaries[n + 1..] {
            if is_self_closing(later) {
                continue;
            }
            if !is_closing(later) {
                depth += 1;
            } else if depth == 0 {
                end = later.get(0).map_or(html.len(), |m| m.start());
                break;
            } else {
                depth -= 1;
            }
        }

        blocks.push(Element {
            attrs: attrs.as_str(),
            inner: &html[opening.end()..end],
        });
    }
    blocks
}

/// Strips tags from an HTML fragment and returns its trimmed text.
pub(crate) fn text_content(fragment: &str) -> String {
    let without_tags = MARKUP.replace_all(fragment, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

/// Decodes the common named entities and all numeric character references.
pub(crate) fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_capture_attributes_and_inner_html() {
        let html = r#"<ul><a class="tag" href="/t/rpg">RPG</a><a href='/t/indie' class=tag>Indie</a></ul>"#;
        let anchors = elements(html, Tag::A);

        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].attr("href").as_deref(), Some("/t/rpg"));
        assert_eq!(anchors[1].attr("href").as_deref(), Some("/t/indie"));
        assert!(anchors[1].has_classes("tag"));
        assert_eq!(anchors[0].text(), "RPG");
    }

    #[test]
    fn element_tag_match_is_not_a_prefix_match() {
        let html = "<abbr>x</abbr><a>y</a>";
        let anchors = elements(html, Tag::A);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].text(), "y");
    }

    #[test]
    fn has_classes_requires_every_class() {
        let html = r#"<a class="details__link details__link--tag extra">x</a>"#;
        let anchor = elements(html, Tag::A)[0];

        assert!(anchor.has_classes("details__link details__link--tag"));
        assert!(!anchor.has_classes("details__link missing"));
    }

    #[test]
    fn text_strips_nested_tags_and_decodes_entities() {
        assert_eq!(
            text_content("<span> Photo &amp;\n <b>Video</b> </span>"),
            "Photo & Video"
        );
        assert_eq!(text_content("Caf&#233; &#x2605;"), "Café ★");
        assert_eq!(text_content("&unknown; stays"), "&unknown; stays");
    }

    #[test]
    fn blocks_follow_nesting_to_the_matching_close() {
        let html = r#"<div class="card"><div class="inner">A</div></div><div class="other">skip</div><div class="card">B</div>"#;
        let blocks = blocks_with_classes(html, Tag::Div, "card");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].inner(), r#"<div class="inner">A</div>"#);
        assert_eq!(blocks[1].text(), "B");
    }

    #[test]
    fn block_content_stops_at_its_own_close_tag() {
        let html = r#"<div class="result"><h2>One</h2></div><a href="/outside">x</a>"#;
        let blocks = blocks_with_classes(html, Tag::Div, "result");

        assert_eq!(blocks.len(), 1);
        assert!(elements(blocks[0].inner(), Tag::A).is_empty());
    }

    #[test]
    fn unclosed_block_runs_to_the_end() {
        let html = r#"<div class="card"><div/>tail"#;
        let blocks = blocks_with_classes(html, Tag::Div, "card");
        assert_eq!(blocks[0].inner(), "<div/>tail");
    }
}
