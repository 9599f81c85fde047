//! Built-in English pipeline.
//!
//! Tokenization, sentence splitting, tag readings and lemmas come from the
//! LanguageTool-derived `nlprule` English tokenizer bundled at build time.
//! Dependency arcs, entities and similarity are rule-based.

use std::collections::HashMap;
use std::sync::Arc;

use nlprule::Tokenizer;

use super::tagger::{self, Reading};
use super::{
    ner, parser, similarity, Doc, Pipeline, PipelineError, Span, Token, DEFAULT_MAX_LENGTH,
    DEFAULT_MODEL,
};

/// A token as split and analyzed by the English tokenizer.
struct Analyzed {
    text: String,
    byte_idx: usize,
    sentence: usize,
    readings: Vec<Reading>,
}

/// English pipeline over the bundled tokenizer binary.
#[derive(Clone)]
pub struct RulePipeline {
    tokenizer: Arc<Tokenizer>,
    max_length: usize,
}

impl RulePipeline {
    /// Deserialize the bundled English tokenizer.
    pub fn load() -> Result<Self, PipelineError> {
        let mut bytes: &'static [u8] = include_bytes!(concat!(
            env!("OUT_DIR"),
            "/",
            nlprule::tokenizer_filename!("en")
        ));
        let tokenizer = Tokenizer::from_reader(&mut bytes).map_err(|e| PipelineError::LoadFailed {
            name: DEFAULT_MODEL.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            tokenizer: Arc::new(tokenizer),
            max_length: DEFAULT_MAX_LENGTH,
        })
    }

    /// Reject texts longer than `max_length` characters.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    fn analyze(&self, text: &str) -> Result<Vec<Analyzed>, PipelineError> {
        let mut analyzed = Vec::new();
        let mut cursor = 0;

        for (sentence, parsed) in self.tokenizer.pipe(text).enumerate() {
            for token in parsed.tokens() {
                let word = token.word().text().as_str();
                if word.trim().is_empty() {
                    continue;
                }
                // Tokens come in text order and never overlap.
                let byte_idx = text[cursor..]
                    .find(word)
                    .map(|offset| cursor + offset)
                    .ok_or_else(|| {
                        PipelineError::Failed(format!("token {:?} not found in input", word))
                    })?;
                cursor = byte_idx + word.len();

                let readings = token
                    .word()
                    .tags()
                    .iter()
                    .filter_map(|data| Reading::from_tagger(data.pos().as_str(), data.lemma().as_str()))
                    .collect();
                analyzed.push(Analyzed {
                    text: word.to_string(),
                    byte_idx,
                    sentence,
                    readings,
                });
            }
        }

        Ok(analyzed)
    }
}

impl Pipeline for RulePipeline {
    fn name(&self) -> &str {
        DEFAULT_MODEL
    }

    fn tokenize(&self, text: &str) -> Result<Doc, PipelineError> {
        let length = text.chars().count();
        if length > self.max_length {
            return Err(PipelineError::TextTooLong {
                length,
                max_length: self.max_length,
            });
        }

        let analyzed = self.analyze(text)?;
        let mut tokens = Vec::with_capacity(analyzed.len());
        let mut sents: Vec<Span> = Vec::new();
        let (mut last_byte, mut last_char) = (0, 0);

        for (i, a) in analyzed.iter().enumerate() {
            last_char += text[last_byte..a.byte_idx].chars().count();
            last_byte = a.byte_idx;
            tokens.push(Token::new(a.text.as_str(), last_char, a.byte_idx));

            let same_sentence = i > 0 && analyzed[i - 1].sentence == a.sentence;
            match sents.last_mut() {
                Some(span) if same_sentence => span.end = i + 1,
                _ => sents.push(Span::new(i, i + 1, "")),
            }
        }

        let mut doc = Doc::new(text, tokens);
        doc.sents = sents;
        Ok(doc)
    }

    fn annotate_pos(&self, doc: &mut Doc) -> Result<(), PipelineError> {
        let mut by_offset: HashMap<usize, Vec<Reading>> = self
            .analyze(&doc.text)?
            .into_iter()
            .map(|a| (a.byte_idx, a.readings))
            .collect();
        let readings: Vec<Vec<Reading>> = doc
            .tokens
            .iter()
            .map(|t| by_offset.remove(&t.byte_idx).unwrap_or_default())
            .collect();
        tagger::tag(&mut doc.tokens, &readings);
        Ok(())
    }

    fn annotate_dependencies(&self, doc: &mut Doc) -> Result<(), PipelineError> {
        if doc.tokens.iter().any(|t| t.tag.is_empty()) {
            return Err(PipelineError::Failed(
                "dependency parsing requires part-of-speech tags".to_string(),
            ));
        }
        parser::parse(doc);
        Ok(())
    }

    fn annotate_entities(&self, doc: &mut Doc) -> Result<(), PipelineError> {
        doc.ents = ner::recognize(doc);
        Ok(())
    }

    fn similarity(&self, a: &Doc, b: &Doc) -> Result<f32, PipelineError> {
        Ok(similarity::cosine_similarity(a, b))
    }
}

/// Shared English pipeline for tests; the tokenizer is loaded once.
#[cfg(test)]
pub(crate) fn english() -> RulePipeline {
    use std::sync::LazyLock;

    static ENGLISH: LazyLock<RulePipeline> =
        LazyLock::new(|| RulePipeline::load().expect("bundled English tokenizer should load"));
    ENGLISH.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_runs_all_stages() {
        let doc = english()
            .process("Apple is looking at buying U.K. startup for $1 billion")
            .unwrap();
        assert!(doc.len() >= 10);
        assert!(doc.tokens.iter().all(|t| !t.tag.is_empty() && !t.dep.is_empty()));
        assert_eq!(doc.sents.len(), 1);

        let ents: Vec<(&str, &str)> = doc
            .ents
            .iter()
            .map(|s| (doc.span_text(s), s.label.as_str()))
            .collect();
        assert!(ents.contains(&("Apple", "ORG")));
        assert!(ents.contains(&("$1 billion", "MONEY")));
    }

    #[test]
    fn test_token_offsets_match_text() {
        let text = "Café owners in São Paulo earned 3 million reais.";
        let doc = english().tokenize(text).unwrap();
        for token in &doc.tokens {
            let by_char: String = text.chars().skip(token.idx).take(token.text.chars().count()).collect();
            assert_eq!(by_char, token.text);
            assert_eq!(&text[token.byte_idx..token.byte_idx + token.text.len()], token.text);
        }
    }

    #[test]
    fn test_sentences_from_tokenizer() {
        let doc = english().tokenize("The cat sat. It purred.").unwrap();
        let sents: Vec<&str> = doc.sents.iter().map(|s| doc.span_text(s)).collect();
        assert_eq!(sents, vec!["The cat sat.", "It purred."]);
    }

    #[test]
    fn test_pangram_tags_and_lemmas() {
        let pipeline = english();
        let mut doc = pipeline.tokenize("The quick brown fox jumps over the lazy dog").unwrap();
        pipeline.annotate_pos(&mut doc).unwrap();
        assert_eq!(doc.len(), 9);
        assert_eq!(doc.tokens[3].text, "fox");
        assert_eq!(doc.tokens[3].pos, "NOUN");
        assert!(doc.tokens[3].tag.starts_with("NN"));
        assert_eq!(doc.tokens[4].lemma, "jump");
    }

    #[test]
    fn test_text_too_long() {
        let pipeline = english().with_max_length(10);
        let err = pipeline.process("This text is longer than ten characters").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::TextTooLong {
                max_length: 10,
                ..
            }
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let pipeline = english().with_max_length(5);
        assert!(pipeline.process("ééééé").is_ok());
    }

    #[test]
    fn test_dependencies_require_tags() {
        let pipeline = english();
        let mut doc = pipeline.tokenize("Hello world").unwrap();
        assert!(matches!(
            pipeline.annotate_dependencies(&mut doc),
            Err(PipelineError::Failed(_))
        ));
    }

    #[test]
    fn test_empty_text_produces_empty_doc() {
        let doc = english().process("").unwrap();
        assert!(doc.is_empty());
        assert!(doc.ents.is_empty());
        assert!(doc.sents.is_empty());
    }
}
