//! Tag normalization and category matching.
//!
//! This is the deterministic core of the crate: raw catalog tags go in, a
//! taxonomy category and a confidence score come out.
//!
//! # Pipeline
//!
//! 1. [`TagNormalizer`] turns every raw tag into lowercase single-word tokens,
//!    drops filler words ("app", "tools", ...) and de-duplicates them while
//!    keeping first-seen order.
//! 2. [`CategoryMatcher`] scores the tokens against each category's keyword
//!    set. A token scores 1.0 for an exact keyword, 0.8 when it contains or is
//!    contained in a keyword, and `ratio * 0.6` for fuzzy matches whose
//!    [`sequence_ratio`] exceeds 0.7. A category's confidence is the mean token
//!    score.
//! 3. The highest confidence wins (first category on ties); below 0.3 the
//!    category is reported as `"others"`.
//!
//! ```
//! use std::sync::Arc;
//! use appenergy::Taxonomy;
//! use appenergy::classifier::{CategoryMatcher, TagNormalizer};
//!
//! let taxonomy = Arc::new(Taxonomy::builtin().unwrap());
//! let matcher = CategoryMatcher::new(Arc::clone(&taxonomy));
//!
//! let tags = TagNormalizer::normalize_tags(["Photo Editor", "Raster Editor"]);
//! assert_eq!(tags.to_string(), "photo, editor, raster");
//!
//! let best = matcher.match_tags(&tags).unwrap();
//! assert_eq!(best.category, "media_creation");
//! assert_eq!(taxonomy.energy_tier(&best.category).as_str(), "high-energy-level");
//! ```

mod matcher;
mod normalizer;
mod similarity;

pub use matcher::{
    CONFIDENCE_THRESHOLD, CategoryMatch, CategoryMatcher, ClassifyError, FUZZY_MIN_RATIO,
    FUZZY_WEIGHT, SUBSTRING_SCORE, category_confidence, token_score,
};
pub use normalizer::TagNormalizer;
pub use similarity::sequence_ratio;
