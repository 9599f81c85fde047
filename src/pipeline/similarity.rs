//! Document similarity over sparse lexical vectors.
//!
//! A document vector is the bag of lowercase lemmas of its non-punctuation
//! tokens plus down-weighted character trigrams of each token, so that
//! near-synonyms sharing spelling ("quick"/"quickly") still overlap.

use std::collections::HashMap;

use super::Doc;

const LEMMA_WEIGHT: f64 = 1.0;
const TRIGRAM_WEIGHT: f64 = 0.3;
const STOP_WORD_WEIGHT: f64 = 0.5;

fn vectorize(doc: &Doc) -> HashMap<String, f64> {
    let mut vector: HashMap<String, f64> = HashMap::new();

    for token in doc.tokens.iter().filter(|t| !t.is_punct()) {
        let lemma = if token.lemma.is_empty() {
            token.text.to_lowercase()
        } else {
            token.lemma.to_lowercase()
        };
        let scale = if token.is_stop { STOP_WORD_WEIGHT } else { 1.0 };

        *vector.entry(format!("w:{}", lemma)).or_default() += LEMMA_WEIGHT * scale;

        let padded: Vec<char> = format!("<{}>", token.text.to_lowercase()).chars().collect();
        for gram in padded.windows(3) {
            let key: String = std::iter::once('#').chain(gram.iter().copied()).collect();
            *vector.entry(key).or_default() += TRIGRAM_WEIGHT * scale;
        }
    }

    vector
}

/// Cosine similarity of two processed docs, in `[0, 1]`.
///
/// Identical token sequences score exactly `1.0`. A doc with no
/// non-punctuation tokens has no vector and scores `0.0` against anything.
pub fn cosine_similarity(a: &Doc, b: &Doc) -> f32 {
    let va = vectorize(a);
    let vb = vectorize(b);
    if va.is_empty() || vb.is_empty() {
        tracing::warn!("Similarity requested for a document with no content tokens");
        return 0.0;
    }
    if va == vb {
        return 1.0;
    }

    let dot: f64 = va
        .iter()
        .filter_map(|(key, x)| vb.get(key).map(|y| x * y))
        .sum();
    let norm = |v: &HashMap<String, f64>| v.values().map(|x| x * x).sum::<f64>().sqrt();

    (dot / (norm(&va) * norm(&vb))).clamp(0.0, 1.0) as f32
}
