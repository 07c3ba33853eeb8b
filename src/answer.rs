//! Grading of free-text answers against a canonical term.
//!
//! A term like "Integrated Development Environment (IDE)" should accept the
//! acronym, the spelled out form, and small typos in either. Grading works on
//! a set of normalized candidate spellings derived from the canonical string,
//! any single candidate match is sufficient.

/// Lowercase the input and strip everything that is not `a-z0-9`.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn push_unique(set: &mut Vec<String>, candidate: String) {
    if !candidate.is_empty() && !set.contains(&candidate) {
        set.push(candidate);
    }
}

/// Normalized alternate spellings accepted for a canonical term:
/// each parenthesized segment, the term with parentheticals removed, and
/// each slash-delimited segment.
pub fn candidates(canonical: &str) -> Vec<String> {
    let mut out = Vec::new();

    let mut stripped = String::new();
    let mut segment = String::new();
    let mut depth = 0usize;
    for c in canonical.chars() {
        match c {
            '(' => {
                depth += 1;
                if depth > 1 {
                    segment.push(c);
                }
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    push_unique(&mut out, normalize(&segment));
                    segment.clear();
                } else {
                    segment.push(c);
                }
            }
            _ => {
                if depth == 0 {
                    stripped.push(c);
                } else {
                    segment.push(c);
                }
            }
        }
    }
    // An unbalanced '(' still contributes its trailing text.
    push_unique(&mut out, normalize(&segment));
    push_unique(&mut out, normalize(&stripped));

    if canonical.contains('/') {
        for part in canonical.split('/') {
            push_unique(&mut out, normalize(part));
        }
    }

    out
}

/// Edit distance with unit cost for insertions, deletions and substitutions.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Whether a raw user answer matches the canonical term.
///
/// Candidates longer than 3 normalized characters tolerate an edit distance
/// of up to a quarter of their length, shorter ones must match exactly so a
/// two letter acronym does not accept arbitrary single-character typos.
pub fn verify(raw_input: &str, canonical_term: &str) -> bool {
    let input = normalize(raw_input);
    if input.is_empty() {
        return false;
    }
    if input == normalize(canonical_term) {
        return true;
    }

    let candidates = candidates(canonical_term);
    if candidates.iter().any(|c| *c == input) {
        return true;
    }

    candidates
        .iter()
        .filter(|c| c.len() > 3)
        .any(|c| levenshtein(&input, c) <= c.len() / 4)
}
