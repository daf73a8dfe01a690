//! Gestalt (Ratcliff/Obershelp) string similarity.
//!
//! Produces the same ratio as a sequence matcher without a junk heuristic:
//! twice the number of matched characters divided by the total length. The
//! longest-block search picks the earliest block in `a`, then the earliest in
//! `b`, so results are identical to the classic matching-blocks algorithm.

use std::collections::{HashMap, HashSet};

/// Sequences at least this long get their most frequent characters demoted,
/// mirroring the classic "autojunk" rule.
const AUTOJUNK_MIN_LEN: usize = 200;

/// Returns the similarity ratio of `a` and `b` in `[0, 1]`.
///
/// Two empty strings are identical (1.0).
///
/// # Examples
///
/// ```
/// use appenergy::classifier::sequence_ratio;
///
/// assert_eq!(sequence_ratio("abcd", "bcde"), 0.75);
/// assert_eq!(sequence_ratio("steam", "steam"), 1.0);
/// assert_eq!(sequence_ratio("abc", ""), 0.0);
/// ```
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matches = SequenceMatcher::new(&a, &b).matched_chars();
    2.0 * matches as f64 / total as f64
}

struct SequenceMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each character of `b`, ascending. Popular characters are
    /// left out of this index.
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> SequenceMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let limit = b.len() / 100 + 1;
            let popular: HashSet<char> = b2j
                .iter()
                .filter(|(_, positions)| positions.len() > limit)
                .map(|(c, _)| *c)
                .collect();
            b2j.retain(|c, _| !popular.contains(c));
        }

        Self { a, b, b2j }
    }

    /// Total size of all matching blocks.
    fn matched_chars(&self) -> usize {
        let mut total = 0;
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            total += k;
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        total
    }

    /// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as
    /// `(start_a, start_b, len)`.
    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i - 1] and b[j].
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next_j2len = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    next_j2len.insert(j, k);
                    if k > best_size {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_size = k;
                    }
                }
            }
            j2len = next_j2len;
        }

        // Extend over characters left out of the index.
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < ahi
            && best_j + best_size < bhi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn identical_strings_score_one() {
        assert_close(sequence_ratio("chrome", "chrome"), 1.0);
        assert_close(sequence_ratio("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_close(sequence_ratio("zzzz", "qqqq"), 0.0);
        assert_close(sequence_ratio("abc", ""), 0.0);
    }

    #[test]
    fn matches_reference_ratios() {
        assert_close(sequence_ratio("firefx", "firefox"), 12.0 / 13.0);
        assert_close(sequence_ratio("abcd", "bcde"), 0.75);
        assert_close(sequence_ratio("photo", "todo"), 4.0 / 9.0);
        assert_close(sequence_ratio("utility", "utilities"), 0.75);
        assert_close(sequence_ratio("system", "system_info"), 12.0 / 17.0);
        assert_close(sequence_ratio("tide", "ide"), 6.0 / 7.0);
        assert_close(sequence_ratio("steem", "steam"), 0.8);
    }

    #[test]
    fn recurses_on_both_sides_of_longest_block() {
        assert_close(sequence_ratio("abxcd", "abcd"), 8.0 / 9.0);
        assert_close(sequence_ratio("qabxcd", "abycdf"), 8.0 / 12.0);
        assert_close(sequence_ratio("kitten", "sitting"), 8.0 / 13.0);
    }

    #[test]
    fn longest_match_prefers_earliest_block() {
        let a: Vec<char> = "abab".chars().collect();
        let b: Vec<char> = "ab".chars().collect();
        let matcher = SequenceMatcher::new(&a, &b);
        assert_eq!(matcher.find_longest_match(0, a.len(), 0, b.len()), (0, 0, 2));
    }

    #[test]
    fn counts_multibyte_characters_once() {
        assert_close(sequence_ratio("vidéo", "video"), 0.8);
    }

    #[test]
    fn long_sequences_still_match_popular_characters() {
        let b = "a".repeat(250);
        let a = "a".repeat(10);
        // Every 'a' is popular in b, so it is matched only through extension.
        assert_close(sequence_ratio(&a, &b), 20.0 / 260.0);
    }
}
