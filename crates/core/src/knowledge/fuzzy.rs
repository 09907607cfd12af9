//! Fuzzy string similarity on a 0-100 scale.
//!
//! `ratio` is the normalized indel similarity `2 * LCS / (len_a + len_b)`,
//! computed over chars so accented letters count once. `partial_ratio`
//! slides the shorter string over the longer one and keeps the best window.

/// Similarity of two whole strings (0-100). Empty input scores 0.
pub fn ratio(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best similarity of the shorter string against any equally long window
/// of the longer one (0-100). Empty input scores 0.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    let mut best = 0;
    for window in long.windows(short.len()) {
        best = best.max(ratio_chars(short, window));
        if best == 100 {
            break;
        }
    }
    best
}

fn ratio_chars(a: &[char], b: &[char]) -> u32 {
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let lcs = lcs_len(a, b);
    ((200 * lcs) as f64 / total as f64).round() as u32
}

/// Length of the longest common subsequence, two-row table.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for a_char in a {
        for (j, b_char) in b.iter().enumerate() {
            curr[j + 1] = if a_char == b_char {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
