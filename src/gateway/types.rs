//! Request and response records for the annotation endpoints.

use serde::{Deserialize, Serialize};

/// Body of every single-text endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextRequest {
    pub text: String,
}

/// Body of `/similarity`: an ordered pair of texts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimilarityRequest {
    pub texts: Vec<String>,
}

// ============================================================================
// Named entities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub text: String,
    pub label: String,
    pub start_char: usize,
    pub end_char: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitiesResponse {
    pub entities: Vec<EntityRecord>,
}

// ============================================================================
// Part of speech
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosRecord {
    pub text: String,
    /// Coarse universal tag (NOUN, VERB, ...).
    pub pos: String,
    /// Fine-grained Penn Treebank tag (NN, VBZ, ...).
    pub tag: String,
    pub dep: String,
    pub lemma: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosResponse {
    pub tokens: Vec<PosRecord>,
}

// ============================================================================
// Similarity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResponse {
    pub similarity: f32,
}

// ============================================================================
// Basic analysis
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisToken {
    pub text: String,
    pub lemma: String,
    pub is_stop: bool,
    pub is_punct: bool,
    pub is_alpha: bool,
    pub start_char: usize,
    pub end_char: usize,
}

/// A sentence or noun phrase with its character offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub start_char: usize,
    pub end_char: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicAnalysisResponse {
    pub tokens: Vec<AnalysisToken>,
    pub lemmas: Vec<String>,
    pub sentences: Vec<TextSpan>,
    pub noun_phrases: Vec<TextSpan>,
}

// ============================================================================
// Dependency parse
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub text: String,
    pub dep: String,
    /// Text of the governing token; a root is its own head.
    pub head_text: String,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyResponse {
    pub tokens: Vec<DependencyRecord>,
}
