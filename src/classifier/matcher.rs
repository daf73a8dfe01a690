use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::models::{FALLBACK_CATEGORY, NormalizedTags};
use crate::taxonomy::Taxonomy;

use super::similarity::sequence_ratio;

/// Winning confidence below this is reported as [`FALLBACK_CATEGORY`].
pub const CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Score for a token contained in a keyword, or a keyword contained in a token.
pub const SUBSTRING_SCORE: f64 = 0.8;

/// Multiplier applied to fuzzy similarity ratios.
pub const FUZZY_WEIGHT: f64 = 0.6;

/// Fuzzy ratios must exceed this to count at all.
pub const FUZZY_MIN_RATIO: f64 = 0.7;

/// Errors raised by the classification pipeline.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// There are no categories to match against.
    #[error("Taxonomy has no categories to match against")]
    EmptyTaxonomy,

    /// The pipeline panicked; the payload message is kept.
    #[error("Classification panicked: {0}")]
    Panicked(String),
}

/// Best category for a token sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatch {
    pub category: String,
    pub confidence: f64,
}

impl CategoryMatch {
    fn fallback(confidence: f64) -> Self {
        Self {
            category: FALLBACK_CATEGORY.to_string(),
            confidence,
        }
    }
}

/// Scores normalized tags against every taxonomy category.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use appenergy::Taxonomy;
/// use appenergy::classifier::{CategoryMatcher, TagNormalizer};
///
/// let matcher = CategoryMatcher::new(Arc::new(Taxonomy::builtin().unwrap()));
/// let tags = TagNormalizer::normalize_tags(["Chrome"]);
///
/// let best = matcher.match_tags(&tags).unwrap();
/// assert_eq!(best.category, "internet_browsers");
/// assert_eq!(best.confidence, 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct CategoryMatcher {
    taxonomy: Arc<Taxonomy>,
    threshold: f64,
}

impl CategoryMatcher {
    /// Creates a matcher using [`CONFIDENCE_THRESHOLD`].
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            taxonomy,
            threshold: CONFIDENCE_THRESHOLD,
        }
    }

    /// Overrides the confidence floor.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Confidence of every category, in taxonomy order.
    pub fn scores(&self, tags: &NormalizedTags) -> Vec<(&str, f64)> {
        self.taxonomy
            .categories()
            .iter()
            .map(|category| {
                (
                    category.id(),
                    category_confidence(tags.as_slice(), category.keywords()),
                )
            })
            .collect()
    }

    /// Picks the best category for `tags`.
    ///
    /// Empty input short-circuits to `("others", 0.0)`. Ties go to the
    /// category listed first in the taxonomy. If the best confidence is below
    /// the threshold the category becomes `"others"` but the confidence is
    /// kept.
    pub fn match_tags(&self, tags: &NormalizedTags) -> Result<CategoryMatch, ClassifyError> {
        if tags.is_empty() {
            return Ok(CategoryMatch::fallback(0.0));
        }

        let mut best: Option<(&str, f64)> = None;
        for (category, confidence) in self.scores(tags) {
            match best {
                Some((_, best_confidence)) if confidence <= best_confidence => {}
                _ => best = Some((category, confidence)),
            }
        }

        let (category, confidence) = best.ok_or(ClassifyError::EmptyTaxonomy)?;
        debug!(category, confidence, tokens = tags.len(), "best category");

        if confidence < self.threshold {
            return Ok(CategoryMatch::fallback(confidence));
        }

        Ok(CategoryMatch {
            category: category.to_string(),
            confidence,
        })
    }
}

/// Mean best-keyword score of `tokens` against one keyword set.
pub fn category_confidence(tokens: &[String], keywords: &BTreeSet<String>) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }

    let total: f64 = tokens
        .iter()
        .map(|token| token_score(token, keywords))
        .sum();
    total / tokens.len() as f64
}

/// Best score of one token against a keyword set.
///
/// Exact match scores 1.0, containment either way [`SUBSTRING_SCORE`], and
/// otherwise a similarity ratio above [`FUZZY_MIN_RATIO`] scores
/// `ratio * FUZZY_WEIGHT`.
pub fn token_score(token: &str, keywords: &BTreeSet<String>) -> f64 {
    if keywords.contains(token) {
        return 1.0;
    }

    keywords.iter().fold(0.0, |best: f64, keyword| {
        if keyword.contains(token) || token.contains(keyword.as_str()) {
            best.max(SUBSTRING_SCORE)
        } else {
            let ratio = sequence_ratio(token, keyword);
            if ratio > FUZZY_MIN_RATIO {
                best.max(ratio * FUZZY_WEIGHT)
            } else {
                best
            }
        }
    })
}
