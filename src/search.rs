//! Relevance scoring shared by the section tree filter and folder search
//!
//! Scores are integers in `0..=100`:
//! - 100 when the whole text contains the term
//! - +50 per word that contains the term
//! - +25 per word (longer than two characters) that the term contains,
//!   which rewards abbreviation-style queries like "charsheet" vs "char"

/// Upper bound of [`score`]
pub const MAX_SCORE: u32 = 100;

const SUBSTRING_SCORE: u32 = 100;
const WORD_CONTAINS_TERM_SCORE: u32 = 50;
const TERM_CONTAINS_WORD_SCORE: u32 = 25;
const MIN_ABBREVIATION_WORD_LEN: usize = 3;

/// Score `text` against `term`, case-insensitively.
///
/// A blank term scores 0; callers treat a blank query as "no filter".
pub fn score(text: &str, term: &str) -> u32 {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return 0;
    }
    let text = text.to_lowercase();

    let mut total = 0u32;
    if text.contains(&term) {
        total += SUBSTRING_SCORE;
    }

    for word in text.split_whitespace() {
        if word.contains(term.as_str()) {
            total += WORD_CONTAINS_TERM_SCORE;
        }
        if word.chars().count() >= MIN_ABBREVIATION_WORD_LEN && term.contains(word) {
            total += TERM_CONTAINS_WORD_SCORE;
        }
        if total >= MAX_SCORE {
            return MAX_SCORE;
        }
    }

    total.min(MAX_SCORE)
}

/// A corpus document: an id plus the blob of text to score against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDoc<T> {
    pub id: T,
    pub text: String,
}

impl<T> SearchDoc<T> {
    pub fn new(id: T, text: impl Into<String>) -> Self {
        SearchDoc {
            id,
            text: text.into(),
        }
    }
}

/// A ranked hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit<T> {
    pub id: T,
    pub score: u32,
}

/// Rank `corpus` against `term`.
///
/// Non-matching documents (score 0) are dropped. Sorting is stable, so ties
/// keep corpus order. A blank term returns every document in corpus order
/// with score 0.
pub fn search<T: Clone>(corpus: &[SearchDoc<T>], term: &str) -> Vec<SearchHit<T>> {
    if term.trim().is_empty() {
        return corpus
            .iter()
            .map(|doc| SearchHit {
                id: doc.id.clone(),
                score: 0,
            })
            .collect();
    }

    let mut hits: Vec<SearchHit<T>> = corpus
        .iter()
        .filter_map(|doc| {
            let s = score(&doc.text, term);
            (s > 0).then(|| SearchHit {
                id: doc.id.clone(),
                score: s,
            })
        })
        .collect();

    // sort_by is stable
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits
}
