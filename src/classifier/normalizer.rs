use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::NormalizedTags;

/// Generic filler words dropped from tags, singular or with a trailing "s".
const FILLER_WORDS: [&str; 4] = ["app", "software", "tool", "program"];

/// Anything that is not a letter, a number, `_`, whitespace or `-`.
///
/// Letters and numbers are general categories `L*` and `N*`; combining marks
/// such as Indic vowel signs are separators.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_\s-]").expect("valid regex"));

/// Converts raw catalog tags into one canonical token sequence.
///
/// Catalogs disagree on casing, punctuation and phrasing ("Photo & Video",
/// "photo-editing", "Graphics Software"). The normalizer reduces all of them to
/// lowercase single-word tokens so they can be compared with taxonomy keywords.
pub struct TagNormalizer;

impl TagNormalizer {
    /// Splits one raw tag into normalized words.
    ///
    /// # Normalization rules
    ///
    /// - Converts to lowercase and trims surrounding whitespace
    /// - Replaces every character other than letters, numbers, `_`,
    ///   whitespace and `-` with a space
    /// - Collapses whitespace runs, then turns hyphen runs into one `_`
    /// - Splits on whitespace
    /// - Drops "app", "software", "tool", "program" (and their plurals) and
    ///   single-character words
    ///
    /// # Examples
    ///
    /// ```
    /// use appenergy::classifier::TagNormalizer;
    ///
    /// assert_eq!(TagNormalizer::normalize_tag("Photo & Video"), vec!["photo", "video"]);
    /// assert_eq!(TagNormalizer::normalize_tag("Role-Playing"), vec!["role_playing"]);
    /// assert_eq!(TagNormalizer::normalize_tag("Drawing Tool"), vec!["drawing"]);
    /// assert!(TagNormalizer::normalize_tag("Apps").is_empty());
    /// ```
    #[must_use]
    pub fn normalize_tag(tag: &str) -> Vec<String> {
        let lowered = tag.to_lowercase();

        let cleaned = NON_WORD.replace_all(lowered.trim(), " ");

        // Collapse whitespace runs and hyphen runs in one pass.
        let mut collapsed = String::with_capacity(cleaned.len());
        let mut prev_space = false;
        let mut prev_hyphen = false;
        for c in cleaned.chars() {
            if c.is_whitespace() {
                if !prev_space {
                    collapsed.push(' ');
                }
                prev_space = true;
                prev_hyphen = false;
            } else if c == '-' {
                if !prev_hyphen {
                    collapsed.push('_');
                }
                prev_hyphen = true;
                prev_space = false;
            } else {
                collapsed.push(c);
                prev_space = false;
                prev_hyphen = false;
            }
        }

        collapsed
            .split_whitespace()
            .filter(|word| !Self::is_filler(word) && word.chars().count() > 1)
            .map(String::from)
            .collect()
    }

    /// Normalizes a collection of raw tags into a de-duplicated sequence.
    ///
    /// Empty entries are skipped. Words keep the order of their first
    /// occurrence across all inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use appenergy::classifier::TagNormalizer;
    ///
    /// let tags = TagNormalizer::normalize_tags(["Chrome", "chrome", "CHROME!"]);
    /// assert_eq!(tags.as_slice(), ["chrome"]);
    ///
    /// let tags = TagNormalizer::normalize_tags(["Office App", "Drawing Tool"]);
    /// assert_eq!(tags.to_string(), "office, drawing");
    /// ```
    #[must_use]
    pub fn normalize_tags<I, S>(tags: I) -> NormalizedTags
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();

        for tag in tags {
            let tag = tag.as_ref();
            if tag.is_empty() {
                continue;
            }
            for word in Self::normalize_tag(tag) {
                if seen.insert(word.clone()) {
                    tokens.push(word);
                }
            }
        }

        NormalizedTags::from_tokens(tokens)
    }

    fn is_filler(word: &str) -> bool {
        let stem = word.strip_suffix('s').unwrap_or(word);
        FILLER_WORDS.contains(&stem) || FILLER_WORDS.contains(&word)
    }
}
