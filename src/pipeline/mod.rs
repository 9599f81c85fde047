//! Language-processing pipeline abstraction.
//!
//! Provides a `Pipeline` trait for pluggable annotation backends and the
//! annotated document model (`Doc`, `Token`, `Span`) they produce. The
//! built-in `RulePipeline` tags and lemmatizes with the bundled `nlprule`
//! English tokenizer and adds rule-based parsing and entity recognition.

mod lexicon;
mod ner;
mod parser;
mod rules;
mod similarity;
mod tagger;

pub use rules::RulePipeline;
#[cfg(test)]
pub(crate) use rules::english;
pub use similarity::cosine_similarity;

use thiserror::Error;

/// Default cap on input length, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 1_000_000;

/// Identifier of the built-in English pipeline.
pub const DEFAULT_MODEL: &str = "en_rules_sm";

/// Errors raised by a pipeline while annotating text.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Text of length {length} exceeds maximum of {max_length} characters")]
    TextTooLong { length: usize, max_length: usize },

    #[error("Unknown model '{name}' (available: {available})")]
    UnknownModel { name: String, available: String },

    #[error("Failed to load model '{name}': {reason}")]
    LoadFailed { name: String, reason: String },

    #[error("Annotation produced an invalid span [{start}, {end}) for text of length {length}")]
    InvalidSpan {
        start: usize,
        end: usize,
        length: usize,
    },

    /// The annotation job panicked or was cancelled.
    #[error("annotation job aborted")]
    Aborted,

    #[error("Pipeline failed: {0}")]
    Failed(String),
}

/// A single token with its linguistic annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    /// Character offset of the token within the source text.
    pub idx: usize,
    /// Byte offset of the token within the source text.
    pub byte_idx: usize,
    pub lemma: String,
    /// Coarse universal part-of-speech tag (e.g. `NOUN`).
    pub pos: String,
    /// Fine-grained Penn Treebank tag (e.g. `NN`).
    pub tag: String,
    pub dep: String,
    /// Index of the governing token. A sentence root points at itself.
    pub head: usize,
    pub is_stop: bool,
}

impl Token {
    /// Create an unannotated token.
    pub fn new(text: impl Into<String>, idx: usize, byte_idx: usize) -> Self {
        Self {
            text: text.into(),
            idx,
            byte_idx,
            lemma: String::new(),
            pos: String::new(),
            tag: String::new(),
            dep: String::new(),
            head: 0,
            is_stop: false,
        }
    }

    /// Character offset one past the end of the token.
    pub fn end_char(&self) -> usize {
        self.idx + self.text.chars().count()
    }

    pub fn is_punct(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(is_punct_char)
    }

    pub fn is_alpha(&self) -> bool {
        !self.text.is_empty() && self.text.chars().all(char::is_alphabetic)
    }
}

fn is_punct_char(c: char) -> bool {
    match c {
        '$' | '%' | '#' | '&' | '+' | '=' | '<' | '>' | '@' | '^' | '|' | '~' | '`' => false,
        '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{2013}' | '\u{2014}' | '\u{2026}'
        | '\u{00AB}' | '\u{00BB}' => true,
        _ => c.is_ascii_punctuation(),
    }
}

/// A contiguous run of tokens `[start, end)`, optionally labeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl Span {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }
}

/// A processed text: tokens plus document-level spans.
#[derive(Debug, Clone, Default)]
pub struct Doc {
    pub text: String,
    pub tokens: Vec<Token>,
    pub ents: Vec<Span>,
    pub sents: Vec<Span>,
    pub noun_chunks: Vec<Span>,
}

impl Doc {
    pub fn new(text: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            text: text.into(),
            tokens,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Length of the source text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Character offsets `(start_char, end_char)` covered by a span.
    pub fn span_chars(&self, span: &Span) -> (usize, usize) {
        match (self.tokens.get(span.start), span.end.checked_sub(1).and_then(|i| self.tokens.get(i))) {
            (Some(first), Some(last)) if span.start < span.end => (first.idx, last.end_char()),
            _ => (0, 0),
        }
    }

    /// Source text covered by a span, including inner whitespace.
    pub fn span_text(&self, span: &Span) -> &str {
        match (self.tokens.get(span.start), span.end.checked_sub(1).and_then(|i| self.tokens.get(i))) {
            (Some(first), Some(last)) if span.start < span.end => self
                .text
                .get(first.byte_idx..last.byte_idx + last.text.len())
                .unwrap_or(""),
            _ => "",
        }
    }

    /// Indices of the syntactic children of token `i`, in order.
    pub fn children(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(j, t)| *j != i && t.head == i)
            .map(|(j, _)| j)
    }
}

/// Capability interface over a loaded language pipeline.
///
/// Implementations are loaded once and shared read-only across requests,
/// so every method takes `&self`. The stages run in the order
/// `tokenize` → `annotate_pos` → `annotate_dependencies` →
/// `annotate_entities`; `process` chains them.
pub trait Pipeline: Send + Sync {
    /// Model identifier (e.g. "en_rules_sm").
    fn name(&self) -> &str;

    /// Split text into tokens with character offsets.
    fn tokenize(&self, text: &str) -> Result<Doc, PipelineError>;

    /// Assign POS tags, lemmas and stop-word flags.
    fn annotate_pos(&self, doc: &mut Doc) -> Result<(), PipelineError>;

    /// Assign dependency labels and heads, sentence boundaries and noun chunks.
    fn annotate_dependencies(&self, doc: &mut Doc) -> Result<(), PipelineError>;

    /// Assign named entity spans.
    fn annotate_entities(&self, doc: &mut Doc) -> Result<(), PipelineError>;

    /// Semantic similarity between two processed documents.
    fn similarity(&self, a: &Doc, b: &Doc) -> Result<f32, PipelineError>;

    /// Run the full pipeline over `text`.
    fn process(&self, text: &str) -> Result<Doc, PipelineError> {
        let mut doc = self.tokenize(text)?;
        self.annotate_pos(&mut doc)?;
        self.annotate_dependencies(&mut doc)?;
        self.annotate_entities(&mut doc)?;
        Ok(doc)
    }
}

/// Settings applied when loading a pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub max_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

/// Names of the pipelines this build can load.
pub fn available_models() -> &'static [&'static str] {
    &[DEFAULT_MODEL]
}

/// Load a pipeline by model identifier.
pub fn load(name: &str, config: &PipelineConfig) -> Result<Box<dyn Pipeline>, PipelineError> {
    match name {
        DEFAULT_MODEL => {
            let pipeline = RulePipeline::load()?.with_max_length(config.max_length);
            tracing::info!(model = name, max_length = config.max_length, "Loaded pipeline");
            Ok(Box::new(pipeline))
        }
        _ => Err(PipelineError::UnknownModel {
            name: name.to_string(),
            available: available_models().join(", "),
        }),
    }
}

/// Build a doc from `(word, Penn tag)` pairs, joined with single spaces
/// except before closing punctuation and clitics and after `$`.
#[cfg(test)]
pub(crate) fn tagged_doc(words: &[(&str, &str)]) -> Doc {
    let mut text = String::new();
    let mut tokens = Vec::new();
    for (i, (word, _)) in words.iter().enumerate() {
        let glued = matches!(*word, "." | "," | "!" | "?" | "%" | "'s" | "n't" | ")")
            || text.ends_with('$')
            || text.ends_with('(');
        if i > 0 && !glued {
            text.push(' ');
        }
        tokens.push(Token::new(*word, text.chars().count(), text.len()));
        text.push_str(word);
    }
    let chosen: Vec<tagger::Reading> = words
        .iter()
        .map(|(word, tag)| tagger::Reading::new(*tag, word.to_lowercase()))
        .collect();
    tagger::apply(&mut tokens, &chosen);
    Doc::new(text, tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_known_model() {
        let pipeline = load(DEFAULT_MODEL, &PipelineConfig::default()).unwrap();
        assert_eq!(pipeline.name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_load_unknown_model() {
        let err = load("en_core_web_sm", &PipelineConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::UnknownModel { .. }));
        assert!(err.to_string().contains(DEFAULT_MODEL));
    }

    #[test]
    fn test_span_text_and_chars() {
        let doc = english().process("Café society thrives").unwrap();
        let span = Span::new(0, 2, "");
        assert_eq!(doc.span_text(&span), "Café society");
        assert_eq!(doc.span_chars(&span), (0, 12));
    }

    #[test]
    fn test_empty_span() {
        let doc = english().process("hello").unwrap();
        let span = Span::new(1, 1, "");
        assert_eq!(doc.span_text(&span), "");
        assert_eq!(doc.span_chars(&span), (0, 0));
    }

    #[test]
    fn test_token_flags() {
        assert!(Token::new(".", 0, 0).is_punct());
        assert!(Token::new("\u{2014}", 0, 0).is_punct());
        assert!(!Token::new("$", 0, 0).is_punct());
        assert!(Token::new("fox", 0, 0).is_alpha());
        assert!(!Token::new("3rd", 0, 0).is_alpha());
    }
}
