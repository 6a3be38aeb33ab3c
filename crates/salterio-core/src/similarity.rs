//! Composite title similarity.
//!
//! `0.4 * sequence + 0.6 * keyword`, where `sequence` is a Ratcliff/Obershelp
//! matched-block ratio over the normalized titles and `keyword` is the
//! Jaccard index of the two keyword sets.

use crate::text::{keywords, normalize};

const SEQUENCE_WEIGHT: f64 = 0.4;
const KEYWORD_WEIGHT: f64 = 0.6;

/// Similarity of two free-text titles, in `[0, 1]` and symmetric.
pub fn similarity(a: &str, b: &str) -> f64 {
    let score = SEQUENCE_WEIGHT * sequence_ratio(&normalize(a), &normalize(b))
        + KEYWORD_WEIGHT * keyword_similarity(a, b);
    score.clamp(0.0, 1.0)
}

/// `2 * M / (len(a) + len(b))` with `M` the total length of the matching
/// blocks. Both scan directions are tried and the larger `M` kept, so the
/// ratio does not depend on argument order.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matched_chars(&a, &b).max(matched_chars(&b, &a));
    2.0 * matched as f64 / total as f64
}

/// Jaccard index of the keyword sets; 0 when either set is empty.
pub fn keyword_similarity(a: &str, b: &str) -> f64 {
    let ka = keywords(a);
    let kb = keywords(b);
    if ka.is_empty() || kb.is_empty() {
        return 0.0;
    }
    let intersection = ka.intersection(&kb).count();
    let union = ka.union(&kb).count();
    intersection as f64 / union as f64
}

/// Total length of the recursively found longest common blocks.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]`, as
/// `(start_in_a, start_in_b, len)`. Earliest block wins ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];
    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            cur[col] = if a[i] == b[j] { prev[col - 1] + 1 } else { 0 };
            if cur[col] > best.2 {
                let k = cur[col];
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn test_similarity_symmetric_and_bounded(a in "\\PC{0,40}", b in "\\PC{0,40}") {
            let ab = similarity(&a, &b);
            prop_assert_eq!(ab, similarity(&b, &a));
            prop_assert!((0.0..=1.0).contains(&ab));
        }

        #[test]
        fn test_similarity_of_title_with_itself(title in "[A-Za-záéíóúñ ]{1,40}") {
            prop_assume!(!normalize(&title).is_empty());
            let score = similarity(&title, &title);
            prop_assert!(score >= SEQUENCE_WEIGHT - 1e-9);
        }
    }

    const TITLES: &[&str] = &[
        "El Buen Pastor",
        "Domingo del Buen Pastor (Ciclo A)",
        "La Transfiguración del Señor",
        "Transfiguracion",
        "Tentaciones en el desierto",
        "abcab",
        "bcaba",
        "",
        "de la",
    ];

    #[test]
    fn test_identity_scores_one() {
        assert_eq!(similarity("El Buen Pastor", "El Buen Pastor"), 1.0);
        assert_eq!(similarity("Transfiguración", "TRANSFIGURACION!"), 1.0);
    }

    #[test]
    fn test_symmetric_and_bounded() {
        for a in TITLES {
            for b in TITLES {
                let ab = similarity(a, b);
                let ba = similarity(b, a);
                assert_eq!(ab, ba, "asymmetric for {a:?} / {b:?}");
                assert!((0.0..=1.0).contains(&ab));
            }
        }
    }

    #[test]
    fn test_sequence_ratio_matches_known_values() {
        assert_eq!(sequence_ratio("abcd", "abcd"), 1.0);
        assert_eq!(sequence_ratio("abcd", "wxyz"), 0.0);
        // "abxcd" vs "abcd": blocks "ab" + "cd" = 4, 2*4/9
        let r = sequence_ratio("abxcd", "abcd");
        assert!((r - 8.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_keyword_component_is_zero_without_keywords() {
        assert_eq!(keyword_similarity("de la", "El Buen Pastor"), 0.0);
        // Only the sequence component contributes.
        let s = similarity("de la", "de la");
        assert!((s - SEQUENCE_WEIGHT).abs() < 1e-12);
    }

    #[test]
    fn test_shared_keywords_dominate() {
        let related = similarity("El Buen Pastor", "Domingo del Buen Pastor (Ciclo A)");
        let unrelated = similarity("El Buen Pastor", "Tentaciones en el desierto");
        assert!(related > 0.5, "related = {related}");
        assert!(unrelated < related);
    }
}
