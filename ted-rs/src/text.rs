//! Sequence edit distance for text content.
//!
//! Text similarity between two nodes is a classical Wagner-Fisher edit
//! distance over whitespace-separated tokens, normalized to `[0, 1]`. The
//! distance engine only asks for it when two texts' fingerprints already
//! differ, and results are memoized per digest pair so repeated label pairs
//! across a document are computed once.

use rustc_hash::FxHashMap;

/// Memoizing text distance calculator.
pub struct TextDistance {
    cache: FxHashMap<(u128, u128), f64>,
}

impl Default for TextDistance {
    fn default() -> Self {
        Self::new()
    }
}

impl TextDistance {
    /// Creates a new calculator with an empty cache.
    pub fn new() -> Self {
        TextDistance {
            cache: FxHashMap::with_capacity_and_hasher(256, Default::default()),
        }
    }

    /// Returns the normalized distance between `a` and `b`, keyed by their
    /// text digests.
    pub fn normalized(&mut self, a: &str, b: &str, key: (u128, u128)) -> f64 {
        if let Some(&dist) = self.cache.get(&key) {
            return dist;
        }
        let dist = normalized_distance(a, b);
        self.cache.insert(key, dist);
        dist
    }
}

/// Wagner-Fisher edit distance over whitespace-separated tokens, divided by
/// the longer token count. Returns 0.0 for two empty texts and 1.0 when the
/// token sequences share nothing positionally alignable.
pub fn normalized_distance(a: &str, b: &str) -> f64 {
    let tokens_a: Vec<&str> = a.split_whitespace().collect();
    let tokens_b: Vec<&str> = b.split_whitespace().collect();
    let (m, n) = (tokens_a.len(), tokens_b.len());

    if m == 0 && n == 0 {
        return 0.0;
    }
    if m == 0 || n == 0 {
        return 1.0;
    }

    // Two-row tabulation; substitution is free for equal tokens.
    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];
    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let substitute = prev[j - 1] + usize::from(tokens_a[i - 1] != tokens_b[j - 1]);
            let delete = prev[j] + 1;
            let insert = curr[j - 1] + 1;
            curr[j] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n] as f64 / m.max(n) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_texts() {
        assert_eq!(normalized_distance("hello world", "hello world"), 0.0);
    }

    #[test]
    fn test_both_empty() {
        assert_eq!(normalized_distance("", ""), 0.0);
    }

    #[test]
    fn test_one_empty() {
        assert_eq!(normalized_distance("hello", ""), 1.0);
        assert_eq!(normalized_distance("", "hello"), 1.0);
    }

    #[test]
    fn test_disjoint_tokens() {
        assert_eq!(normalized_distance("x", "y"), 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        // One of three tokens replaced.
        let dist = normalized_distance("the quick fox", "the slow fox");
        assert!((dist - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_insertion_counts() {
        let dist = normalized_distance("a b", "a b c");
        assert!((dist - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_whitespace_insignificant() {
        assert_eq!(normalized_distance("a  b", "a b"), 0.0);
    }

    #[test]
    fn test_range_bounds() {
        for (a, b) in [
            ("", "one two three"),
            ("alpha beta", "beta alpha"),
            ("x y z", "x y z w"),
        ] {
            let dist = normalized_distance(a, b);
            assert!((0.0..=1.0).contains(&dist), "{a:?} vs {b:?} gave {dist}");
        }
    }

    #[test]
    fn test_cache_reuse() {
        let mut calc = TextDistance::new();
        let first = calc.normalized("a b c", "a x c", (1, 2));
        let second = calc.normalized("a b c", "a x c", (1, 2));
        assert_eq!(first, second);
        assert_eq!(calc.cache.len(), 1);
    }
}
