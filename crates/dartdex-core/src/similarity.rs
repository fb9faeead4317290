//! Normalized string similarity (Ratcliff/Obershelp).
//!
//! # Algorithm
//!
//! 1. Find the longest contiguous run common to both strings. On ties the
//!    run starting earliest in `a` wins, then earliest in `b`.
//! 2. Recurse on the pieces left and right of that run.
//! 3. `ratio = 2·M / (|a| + |b|)` where `M` is the total length of all runs.
//!
//! Lengths are counted in Unicode scalar values, so Hangul syllables weigh
//! one each. The ratio is `1.0` for identical strings (including two empty
//! strings) and `0.0` when nothing is shared. No junk heuristic is applied:
//! company names are far shorter than the sizes where one would matter.

use std::collections::HashMap;

/// Similarity of `a` and `b` in `[0.0, 1.0]`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_chars(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Total length of the matching blocks between `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, &c) in b.iter().enumerate() {
        b2j.entry(c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    // run length ending at (i-1, j) for the previous row
    let mut prev: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut cur: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let len = if j > 0 {
                    prev.get(&(j - 1)).copied().unwrap_or(0) + 1
                } else {
                    1
                };
                cur.insert(j, len);
                if len > best_len {
                    best_i = i + 1 - len;
                    best_j = j + 1 - len;
                    best_len = len;
                }
            }
        }
        prev = cur;
    }
    (best_i, best_j, best_len)
}
