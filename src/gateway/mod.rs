//! Annotation gateway.
//!
//! Each operation validates its request, runs the shared pipeline once and
//! projects the annotated [`Doc`] into plain response records. Nothing here
//! keeps state between calls.

mod error;
mod types;

pub use error::{GatewayError, ValidationError};
pub use types::{
    AnalysisToken, BasicAnalysisResponse, DependencyRecord, DependencyResponse, EntitiesResponse,
    EntityRecord, PosRecord, PosResponse, SimilarityRequest, SimilarityResponse, TextRequest,
    TextSpan,
};

use crate::pipeline::{Doc, Pipeline, PipelineError, Span};

/// Number of texts `/similarity` compares.
pub const SIMILARITY_ARITY: usize = 2;

// ============================================================================
// Validation
// ============================================================================

fn require_text<'a>(field: &str, text: &'a str) -> Result<&'a str, ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(text)
}

impl TextRequest {
    pub fn validate(&self) -> Result<&str, ValidationError> {
        require_text("text", &self.text)
    }
}

impl SimilarityRequest {
    pub fn validate(&self) -> Result<(&str, &str), ValidationError> {
        if self.texts.len() != SIMILARITY_ARITY {
            return Err(ValidationError::new(
                "texts",
                format!(
                    "expected exactly {} texts, got {}",
                    SIMILARITY_ARITY,
                    self.texts.len()
                ),
            ));
        }
        let a = require_text("texts[0]", &self.texts[0])?;
        let b = require_text("texts[1]", &self.texts[1])?;
        Ok((a, b))
    }
}

// ============================================================================
// Projection helpers
// ============================================================================

/// Character offsets of `span`, checked against the source text.
fn checked_offsets(doc: &Doc, span: &Span) -> Result<(usize, usize), PipelineError> {
    let (start, end) = doc.span_chars(span);
    let length = doc.char_len();
    if span.start >= span.end || span.end > doc.len() || start > end || end > length {
        return Err(PipelineError::InvalidSpan { start, end, length });
    }
    Ok((start, end))
}

fn text_span(doc: &Doc, span: &Span) -> Result<TextSpan, PipelineError> {
    let (start_char, end_char) = checked_offsets(doc, span)?;
    Ok(TextSpan {
        text: doc.span_text(span).to_string(),
        start_char,
        end_char,
    })
}

// ============================================================================
// Operations
// ============================================================================

/// Named entities in order of appearance.
pub fn extract_entities(
    pipeline: &dyn Pipeline,
    request: &TextRequest,
) -> Result<EntitiesResponse, GatewayError> {
    let text = request.validate()?;
    let doc = pipeline.process(text)?;

    let mut entities = doc
        .ents
        .iter()
        .map(|span| {
            let (start_char, end_char) = checked_offsets(&doc, span)?;
            Ok(EntityRecord {
                text: doc.span_text(span).to_string(),
                label: span.label.clone(),
                start_char,
                end_char,
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;
    entities.sort_by_key(|e| (e.start_char, e.end_char));

    tracing::debug!(entities = entities.len(), "Extracted entities");
    Ok(EntitiesResponse { entities })
}

/// One POS record per token, in input order.
pub fn tag_pos(pipeline: &dyn Pipeline, request: &TextRequest) -> Result<PosResponse, GatewayError> {
    let text = request.validate()?;
    let doc = pipeline.process(text)?;

    let tokens: Vec<PosRecord> = doc
        .tokens
        .into_iter()
        .map(|t| PosRecord {
            text: t.text,
            pos: t.pos,
            tag: t.tag,
            dep: t.dep,
            lemma: t.lemma,
        })
        .collect();

    tracing::debug!(tokens = tokens.len(), "Tagged parts of speech");
    Ok(PosResponse { tokens })
}

/// Similarity of exactly two texts, as reported by the pipeline.
pub fn compute_similarity(
    pipeline: &dyn Pipeline,
    request: &SimilarityRequest,
) -> Result<SimilarityResponse, GatewayError> {
    let (a, b) = request.validate()?;
    let doc_a = pipeline.process(a)?;
    let doc_b = pipeline.process(b)?;
    let similarity = pipeline.similarity(&doc_a, &doc_b)?;

    tracing::debug!(similarity, "Computed similarity");
    Ok(SimilarityResponse { similarity })
}

/// Tokens with lexical attributes, lemmas, sentences and noun phrases.
pub fn basic_analysis(
    pipeline: &dyn Pipeline,
    request: &TextRequest,
) -> Result<BasicAnalysisResponse, GatewayError> {
    let text = request.validate()?;
    let doc = pipeline.process(text)?;
    let length = doc.char_len();

    let mut tokens = Vec::with_capacity(doc.len());
    for t in &doc.tokens {
        let end_char = t.end_char();
        if end_char > length {
            return Err(PipelineError::InvalidSpan {
                start: t.idx,
                end: end_char,
                length,
            }
            .into());
        }
        tokens.push(AnalysisToken {
            text: t.text.clone(),
            lemma: t.lemma.clone(),
            is_stop: t.is_stop,
            is_punct: t.is_punct(),
            is_alpha: t.is_alpha(),
            start_char: t.idx,
            end_char,
        });
    }
    let lemmas = doc.tokens.iter().map(|t| t.lemma.clone()).collect();
    let sentences = doc
        .sents
        .iter()
        .map(|s| text_span(&doc, s))
        .collect::<Result<Vec<_>, _>>()?;
    let noun_phrases = doc
        .noun_chunks
        .iter()
        .map(|s| text_span(&doc, s))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        tokens = tokens.len(),
        sentences = sentences.len(),
        "Ran basic analysis"
    );
    Ok(BasicAnalysisResponse {
        tokens,
        lemmas,
        sentences,
        noun_phrases,
    })
}

/// One dependency record per token with heads resolved to their text.
pub fn dependency_parse(
    pipeline: &dyn Pipeline,
    request: &TextRequest,
) -> Result<DependencyResponse, GatewayError> {
    let text = request.validate()?;
    let doc = pipeline.process(text)?;

    let tokens = doc
        .tokens
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let head = doc.tokens.get(t.head).ok_or_else(|| {
                PipelineError::Failed(format!(
                    "token {} has head {} outside a document of {} tokens",
                    i,
                    t.head,
                    doc.len()
                ))
            })?;
            Ok(DependencyRecord {
                text: t.text.clone(),
                dep: t.dep.clone(),
                head_text: head.text.clone(),
                children: doc
                    .children(i)
                    .map(|c| doc.tokens[c].text.clone())
                    .collect(),
            })
        })
        .collect::<Result<Vec<_>, PipelineError>>()?;

    tracing::debug!(tokens = tokens.len(), "Parsed dependencies");
    Ok(DependencyResponse { tokens })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Token;

    /// Whitespace tokenizer that tags everything NN and chains heads left.
    struct StubPipeline {
        ents: Vec<Span>,
        score: f32,
    }

    impl StubPipeline {
        fn new() -> Self {
            Self {
                ents: Vec::new(),
                score: 0.5,
            }
        }
    }

    impl Pipeline for StubPipeline {
        fn name(&self) -> &str {
            "stub"
        }

        fn tokenize(&self, text: &str) -> Result<Doc, PipelineError> {
            let mut tokens = Vec::new();
            let mut chars = 0;
            for (byte, word) in text.split(' ').scan(0, |pos, w| {
                let start = *pos;
                *pos += w.len() + 1;
                Some((start, w))
            }) {
                if !word.is_empty() {
                    tokens.push(Token::new(word, chars, byte));
                }
                chars += word.chars().count() + 1;
            }
            Ok(Doc::new(text, tokens))
        }

        fn annotate_pos(&self, doc: &mut Doc) -> Result<(), PipelineError> {
            for t in &mut doc.tokens {
                t.tag = "NN".to_string();
                t.pos = "NOUN".to_string();
                t.lemma = t.text.to_lowercase();
            }
            Ok(())
        }

        fn annotate_dependencies(&self, doc: &mut Doc) -> Result<(), PipelineError> {
            for (i, t) in doc.tokens.iter_mut().enumerate() {
                t.head = i.saturating_sub(1);
                t.dep = if i == 0 { "ROOT" } else { "dep" }.to_string();
            }
            if !doc.is_empty() {
                doc.sents = vec![Span::new(0, doc.len(), "")];
            }
            Ok(())
        }

        fn annotate_entities(&self, doc: &mut Doc) -> Result<(), PipelineError> {
            doc.ents = self.ents.clone();
            Ok(())
        }

        fn similarity(&self, _a: &Doc, _b: &Doc) -> Result<f32, PipelineError> {
            Ok(self.score)
        }
    }

    struct FailingPipeline;

    impl Pipeline for FailingPipeline {
        fn name(&self) -> &str {
            "failing"
        }
        fn tokenize(&self, _text: &str) -> Result<Doc, PipelineError> {
            Err(PipelineError::Failed("boom".to_string()))
        }
        fn annotate_pos(&self, _doc: &mut Doc) -> Result<(), PipelineError> {
            Ok(())
        }
        fn annotate_dependencies(&self, _doc: &mut Doc) -> Result<(), PipelineError> {
            Ok(())
        }
        fn annotate_entities(&self, _doc: &mut Doc) -> Result<(), PipelineError> {
            Ok(())
        }
        fn similarity(&self, _a: &Doc, _b: &Doc) -> Result<f32, PipelineError> {
            Ok(0.0)
        }
    }

    fn text(s: &str) -> TextRequest {
        TextRequest {
            text: s.to_string(),
        }
    }

    #[test]
    fn test_empty_text_rejected_everywhere() {
        let p = StubPipeline::new();
        for input in ["", "   \n"] {
            let req = text(input);
            assert!(extract_entities(&p, &req).unwrap_err().is_client_error());
            assert!(tag_pos(&p, &req).unwrap_err().is_client_error());
            assert!(basic_analysis(&p, &req).unwrap_err().is_client_error());
            assert!(dependency_parse(&p, &req).unwrap_err().is_client_error());
        }
    }

    #[test]
    fn test_similarity_requires_two_texts() {
        let p = StubPipeline::new();
        for texts in [vec![], vec!["a"], vec!["a", "b", "c"]] {
            let req = SimilarityRequest {
                texts: texts.into_iter().map(String::from).collect(),
            };
            match compute_similarity(&p, &req) {
                Err(GatewayError::Validation(e)) => assert_eq!(e.field, "texts"),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_similarity_rejects_empty_member() {
        let p = StubPipeline::new();
        let req = SimilarityRequest {
            texts: vec!["hello".to_string(), "".to_string()],
        };
        match compute_similarity(&p, &req) {
            Err(GatewayError::Validation(e)) => assert_eq!(e.field, "texts[1]"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_similarity_passes_through_score() {
        let p = StubPipeline {
            ents: Vec::new(),
            score: 0.25,
        };
        let req = SimilarityRequest {
            texts: vec!["a b".to_string(), "c d".to_string()],
        };
        assert_eq!(compute_similarity(&p, &req).unwrap().similarity, 0.25);
    }

    #[test]
    fn test_pos_one_record_per_token() {
        let resp = tag_pos(&StubPipeline::new(), &text("one two three")).unwrap();
        let texts: Vec<_> = resp.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert!(resp.tokens.iter().all(|t| t.tag == "NN" && t.pos == "NOUN"));
    }

    #[test]
    fn test_entities_projected_with_offsets() {
        let p = StubPipeline {
            ents: vec![Span::new(2, 4, "ORG"), Span::new(0, 1, "PERSON")],
            score: 0.0,
        };
        let resp = extract_entities(&p, &text("Jane met Acme Corp today")).unwrap();
        assert_eq!(
            resp.entities,
            vec![
                EntityRecord {
                    text: "Jane".to_string(),
                    label: "PERSON".to_string(),
                    start_char: 0,
                    end_char: 4,
                },
                EntityRecord {
                    text: "Acme Corp".to_string(),
                    label: "ORG".to_string(),
                    start_char: 9,
                    end_char: 18,
                },
            ]
        );
    }

    #[test]
    fn test_out_of_range_entity_is_pipeline_error() {
        let p = StubPipeline {
            ents: vec![Span::new(1, 5, "ORG")],
            score: 0.0,
        };
        let err = extract_entities(&p, &text("two words")).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Pipeline(PipelineError::InvalidSpan { .. })
        ));
    }

    #[test]
    fn test_dependency_heads_resolved_to_text() {
        let resp = dependency_parse(&StubPipeline::new(), &text("a b c")).unwrap();
        assert_eq!(resp.tokens[0].head_text, "a");
        assert_eq!(resp.tokens[0].dep, "ROOT");
        assert_eq!(resp.tokens[0].children, vec!["b"]);
        assert_eq!(resp.tokens[2].head_text, "b");
        assert!(resp.tokens[2].children.is_empty());
    }

    #[test]
    fn test_basic_analysis_sentences_and_lemmas() {
        let resp = basic_analysis(&StubPipeline::new(), &text("Hello World")).unwrap();
        assert_eq!(resp.lemmas, vec!["hello", "world"]);
        assert_eq!(resp.sentences.len(), 1);
        assert_eq!(resp.sentences[0].text, "Hello World");
        assert_eq!(resp.sentences[0].end_char, 11);
        assert!(resp.tokens[1].is_alpha);
        assert_eq!(resp.tokens[1].start_char, 6);
    }

    #[test]
    fn test_pipeline_failure_surfaces() {
        let err = tag_pos(&FailingPipeline, &text("anything")).unwrap_err();
        assert!(!err.is_client_error());
        assert!(matches!(err, GatewayError::Pipeline(PipelineError::Failed(_))));
    }
}
