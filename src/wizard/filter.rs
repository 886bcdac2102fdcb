//! List filtering: case-insensitive substring and scored fuzzy subsequence
//! matching.
//!
//! Substring mode preserves the original display order. Fuzzy mode reorders
//! surviving options by descending match quality, so the best match floats to
//! the top as the user types; matched character positions are returned for
//! highlighting.

/// Which matching algorithm a list step uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Substring,
    Fuzzy,
}

/// One option that survived filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterMatch {
    /// Index into the step's full option list
    pub index: usize,
    /// Match quality; only meaningful in fuzzy mode
    pub score: i64,
    /// Char indices of matched label characters, for highlighting
    pub positions: Vec<usize>,
}

/// Filter `labels` by `filter`, ordered per `mode` (original order for
/// substring, descending score for fuzzy).
pub fn filter_labels<'a>(
    labels: impl Iterator<Item = &'a str>,
    filter: &str,
    mode: FilterMode,
) -> Vec<FilterMatch> {
    let mut matches: Vec<FilterMatch> = labels
        .enumerate()
        .filter_map(|(index, label)| match mode {
            FilterMode::Substring => substring_match(label, filter).map(|positions| FilterMatch {
                index,
                score: 0,
                positions,
            }),
            FilterMode::Fuzzy => fuzzy_match(label, filter).map(|(score, positions)| FilterMatch {
                index,
                score,
                positions,
            }),
        })
        .collect();

    if mode == FilterMode::Fuzzy {
        // Stable by construction: equal scores keep original option order
        matches.sort_by(|a, b| b.score.cmp(&a.score));
    }

    matches
}

fn lower(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// Case-insensitive contains. Returns the char positions of the first
/// occurrence, or `None` when the label does not contain the filter.
pub fn substring_match(label: &str, filter: &str) -> Option<Vec<usize>> {
    if filter.is_empty() {
        return Some(Vec::new());
    }

    let label_chars: Vec<char> = label.chars().map(lower).collect();
    let filter_chars: Vec<char> = filter.chars().map(lower).collect();
    if filter_chars.len() > label_chars.len() {
        return None;
    }

    (0..=label_chars.len() - filter_chars.len())
        .find(|&start| label_chars[start..start + filter_chars.len()] == filter_chars[..])
        .map(|start| (start..start + filter_chars.len()).collect())
}

const MATCH_BASE: i64 = 16;
const CONSECUTIVE_BONUS: i64 = 16;
const BOUNDARY_BONUS: i64 = 8;

/// Is `ch` a word-boundary separator within labels?
fn is_separator(ch: char) -> bool {
    matches!(ch, '-' | '_' | '/' | '.' | ' ' | ':')
}

/// Greedy case-insensitive subsequence match with scoring.
///
/// Every filter character must appear in the label, in order. Consecutive
/// matches and matches at word boundaries score higher; gaps cost one point
/// per skipped character, so tight matches beat scattered ones.
pub fn fuzzy_match(label: &str, filter: &str) -> Option<(i64, Vec<usize>)> {
    if filter.is_empty() {
        return Some((0, Vec::new()));
    }

    let label_chars: Vec<char> = label.chars().collect();
    let mut positions = Vec::with_capacity(filter.chars().count());
    let mut score = 0i64;
    let mut next = 0usize;

    for fc in filter.chars().map(lower) {
        let pos = (next..label_chars.len()).find(|&i| lower(label_chars[i]) == fc)?;

        score += MATCH_BASE;
        if pos == 0 || is_separator(label_chars[pos - 1]) {
            score += BOUNDARY_BONUS;
        }
        match positions.last() {
            Some(&prev) if prev + 1 == pos => score += CONSECUTIVE_BONUS,
            Some(&prev) => score -= (pos - prev - 1) as i64,
            None => score -= pos as i64,
        }

        positions.push(pos);
        next = pos + 1;
    }

    Some((score, positions))
}
