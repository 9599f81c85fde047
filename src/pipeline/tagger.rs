//! Part-of-speech selection.
//!
//! The English tokenizer proposes every Penn Treebank tag a word form can
//! carry, each with its lemma. `tag` keeps one reading per token, chosen
//! left to right from the previous choice and the next token's readings,
//! then derives the universal POS tag. Auxiliary use of be/have/do is
//! decided last, once the following verbs are known.

use super::lexicon::{is_be_form, is_do_form, is_have_form, STOP_WORDS};
use super::Token;

/// One dictionary reading of a word form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub tag: String,
    pub lemma: String,
}

impl Reading {
    pub fn new(tag: impl Into<String>, lemma: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            lemma: lemma.into(),
        }
    }

    /// Reading from a tagger tag such as `NN:UN` or `VBZ`.
    ///
    /// Returns `None` for sentence markers, punctuation classes and tags
    /// outside the Penn Treebank set.
    pub fn from_tagger(pos: &str, lemma: &str) -> Option<Self> {
        let tag = pos.split(':').next().unwrap_or(pos);
        if universal_pos(tag) == "X" {
            return None;
        }
        Some(Self::new(tag, lemma))
    }
}

/// Subordinating conjunctions tagged `IN`.
const SUBORDINATORS: &[&str] = &[
    "because", "although", "though", "if", "unless", "whether", "while", "whereas", "that",
];

/// Tags that mark a capitalized word as a function word, not a name.
const FUNCTION_TAGS: &[&str] = &[
    "DT", "PDT", "IN", "CC", "PRP", "PRP$", "MD", "TO", "WDT", "WP", "WP$", "WRB", "EX", "UH",
];

/// Fallback order when context does not decide.
const DEFAULT_ORDER: &[&str] = &[
    "DT", "PRP", "PRP$", "IN", "CC", "TO", "MD", "WDT", "WP", "WRB", "EX", "VBZ", "VBP", "VBD",
    "NN", "NNS", "NNP", "NNPS", "JJ", "RB", "VB", "VBN", "VBG", "CD", "RP", "UH",
];

/// Choose a reading per token, then assign `tag`, `pos`, `lemma` and
/// `is_stop`. `readings[i]` holds the candidates for `tokens[i]`; a token
/// without readings is tagged from its shape.
pub fn tag(tokens: &mut [Token], readings: &[Vec<Reading>]) {
    let mut chosen: Vec<Reading> = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        let options = readings.get(i).map(Vec::as_slice).unwrap_or(&[]);
        let next = readings.get(i + 1).map(Vec::as_slice).unwrap_or(&[]);
        let prev = chosen.last().map(|r| r.tag.as_str()).unwrap_or("");
        let prev_lower = i
            .checked_sub(1)
            .map(|j| normalize(&tokens[j].text))
            .unwrap_or_default();
        chosen.push(choose(&token.text, options, prev, &prev_lower, next));
    }
    apply(tokens, &chosen);
}

/// Assign already chosen readings and derive the coarse tags.
pub fn apply(tokens: &mut [Token], chosen: &[Reading]) {
    let lowers: Vec<String> = tokens.iter().map(|t| normalize(&t.text)).collect();
    let tags: Vec<&str> = chosen.iter().map(|r| r.tag.as_str()).collect();

    for (i, (token, reading)) in tokens.iter_mut().zip(chosen).enumerate() {
        let lower = lowers[i].as_str();
        token.pos = coarse_pos(lower, &tags, i).to_string();
        token.tag = reading.tag.clone();
        token.lemma = if reading.lemma.is_empty() {
            lower.to_string()
        } else {
            reading.lemma.clone()
        };
        token.is_stop = STOP_WORDS.contains(lower);
    }
}

/// Map a Penn Treebank tag to its universal POS tag.
pub fn universal_pos(tag: &str) -> &'static str {
    match tag {
        "NN" | "NNS" => "NOUN",
        "NNP" | "NNPS" => "PROPN",
        "VB" | "VBD" | "VBG" | "VBN" | "VBP" | "VBZ" => "VERB",
        "MD" => "AUX",
        "JJ" | "JJR" | "JJS" => "ADJ",
        "RB" | "RBR" | "RBS" | "WRB" => "ADV",
        "PRP" | "PRP$" | "WP" | "WP$" | "EX" => "PRON",
        "DT" | "PDT" | "WDT" => "DET",
        "IN" | "RP" => "ADP",
        "CC" => "CCONJ",
        "CD" => "NUM",
        "TO" | "POS" => "PART",
        "UH" => "INTJ",
        "$" | "SYM" => "SYM",
        "." | "," | ":" | "``" | "''" | "-LRB-" | "-RRB-" | "HYPH" | "NFP" => "PUNCT",
        _ => "X",
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace('\u{2019}', "'")
}

fn is_capitalized(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_uppercase)
}

fn has(readings: &[Reading], tag: &str) -> bool {
    readings.iter().any(|r| r.tag == tag)
}

fn has_noun(readings: &[Reading]) -> bool {
    readings.iter().any(|r| r.tag.starts_with("NN"))
}

// ============================================================================
// Choosing a reading
// ============================================================================

fn choose(text: &str, options: &[Reading], prev: &str, prev_lower: &str, next: &[Reading]) -> Reading {
    if let Some(tag) = punct_tag(text) {
        return Reading::new(tag, text);
    }
    let lower = normalize(text);
    let lemma_for = |tag: &str| {
        options
            .iter()
            .find(|r| r.tag == tag)
            .map_or_else(|| lower.clone(), |r| r.lemma.clone())
    };

    if let Some(tag) = word_tag(&lower, prev, next) {
        return Reading::new(tag, lemma_for(tag));
    }

    let sentence_start = matches!(prev, "" | "." | "``" | ":");
    if is_capitalized(text)
        && !sentence_start
        && lower != "i"
        && !options.iter().any(|r| FUNCTION_TAGS.contains(&r.tag.as_str()))
    {
        let tag = if has(options, "NNPS") { "NNPS" } else { "NNP" };
        return Reading::new(tag, text);
    }

    if matches!(prev, "DT" | "PRP$" | "POS" | "CD" | "PDT" | "JJ" | "JJR" | "JJS")
        && has(options, "JJ")
        && (has_noun(next) || has(next, "JJ"))
    {
        return Reading::new("JJ", lemma_for("JJ"));
    }

    preferences(prev, prev_lower)
        .iter()
        .chain(DEFAULT_ORDER)
        .find_map(|tag| options.iter().find(|r| r.tag == *tag))
        .or_else(|| options.first())
        .cloned()
        .unwrap_or_else(|| Reading::new(shape_tag(text, &lower), lower.as_str()))
}

/// Tags preferred after the previously chosen tag.
fn preferences(prev: &str, prev_lower: &str) -> &'static [&'static str] {
    match prev {
        "" | "." | "``" | ":" => &["DT", "PRP", "NN", "NNS", "NNP", "JJ", "RB", "IN"],
        "DT" | "PRP$" | "POS" | "CD" | "PDT" | "JJ" | "JJR" | "JJS" => {
            &["NN", "NNS", "NNP", "NNPS", "JJ", "JJR", "JJS", "VBG", "CD"]
        }
        "IN" => &["DT", "PRP$", "PRP", "CD", "NNP", "VBG", "NN", "NNS", "JJ", "RB"],
        "MD" | "TO" => &["VB", "RB"],
        "PRP" | "NN" | "NNS" | "NNP" | "NNPS" | "WDT" | "WP" | "EX" => {
            &["MD", "VBZ", "VBP", "VBD", "RB", "IN", "CC"]
        }
        "RB" => &["VB", "VBD", "VBZ", "VBP", "VBN", "JJ", "RB"],
        _ if prev.starts_with("VB") && is_be_form(prev_lower) => {
            &["VBG", "VBN", "JJ", "RB", "DT", "IN"]
        }
        _ if prev.starts_with("VB") && is_have_form(prev_lower) => &["VBN", "DT", "PRP$", "RB"],
        _ if prev.starts_with("VB") => &["DT", "PRP$", "PRP", "IN", "RP", "RB", "TO", "JJ", "NN", "NNS"],
        _ => &[],
    }
}

/// Words whose tag depends on a neighbour rather than on the dictionary.
fn word_tag(lower: &str, prev: &str, next: &[Reading]) -> Option<&'static str> {
    match lower {
        "to" => {
            let nominal = next
                .iter()
                .any(|r| matches!(r.tag.as_str(), "DT" | "PRP$" | "PRP" | "CD" | "NNP"));
            Some(if has(next, "VB") && !nominal { "TO" } else { "IN" })
        }
        "that" => {
            let modifies_next = !next.is_empty()
                && next
                    .iter()
                    .all(|r| (r.tag.starts_with("NN") && r.tag != "NNP") || r.tag.starts_with("JJ"));
            Some(if modifies_next {
                "DT"
            } else if prev.starts_with("NN") {
                "WDT"
            } else if prev.starts_with("VB") || prev == "JJ" {
                "IN"
            } else {
                "DT"
            })
        }
        "'s" => {
            let possessive = !matches!(prev, "PRP" | "EX" | "WP" | "WDT" | "DT")
                && (has_noun(next) || has(next, "JJ") || has(next, "CD"));
            Some(if possessive { "POS" } else { "VBZ" })
        }
        "there" if next.iter().any(|r| r.lemma == "be") => Some("EX"),
        _ => None,
    }
}

fn punct_tag(text: &str) -> Option<&'static str> {
    let tag = match text {
        "." | "!" | "?" | "..." | "\u{2026}" => ".",
        "," => ",",
        ":" | ";" | "--" | "\u{2013}" | "\u{2014}" => ":",
        "(" | "[" | "{" => "-LRB-",
        ")" | "]" | "}" => "-RRB-",
        "\u{201C}" | "`" | "\u{2018}" => "``",
        "\"" | "\u{201D}" | "'" | "\u{2019}" => "''",
        "-" => "HYPH",
        "$" | "\u{20AC}" | "\u{00A3}" | "\u{00A5}" => "$",
        "%" => "NN",
        "&" => "CC",
        _ if text.chars().all(|c| !c.is_alphanumeric()) => {
            if text.chars().any(|c| "#+=<>@^|~*/\\".contains(c)) {
                "SYM"
            } else {
                "NFP"
            }
        }
        _ => return None,
    };
    Some(tag)
}

/// Tag for a word the dictionary does not know.
fn shape_tag(text: &str, lower: &str) -> &'static str {
    if text.starts_with(|c: char| c.is_ascii_digit()) {
        let ordinal = ["st", "nd", "rd", "th"].iter().any(|s| lower.ends_with(s));
        return if ordinal { "JJ" } else { "CD" };
    }
    if is_capitalized(text) {
        return "NNP";
    }
    match lower {
        _ if lower.len() > 4 && lower.ends_with("ly") => "RB",
        _ if lower.len() > 4 && lower.ends_with("ing") => "VBG",
        _ if lower.len() > 3 && lower.ends_with("ed") => "VBD",
        _ if lower.len() > 3 && lower.ends_with('s') && !lower.ends_with("ss") => "NNS",
        _ => "NN",
    }
}

// ============================================================================
// Coarse tags
// ============================================================================

/// Whether a verb follows position `i`, skipping adverbs and negation.
fn verb_follows(tags: &[&str], i: usize) -> bool {
    tags[i + 1..]
        .iter()
        .find(|t| !t.starts_with("RB"))
        .is_some_and(|t| t.starts_with("VB"))
}

fn coarse_pos(lower: &str, tags: &[&str], i: usize) -> &'static str {
    let tag = tags[i];
    if tag.starts_with("VB") {
        if is_be_form(lower) {
            return "AUX";
        }
        if (is_have_form(lower) || is_do_form(lower)) && verb_follows(tags, i) {
            return "AUX";
        }
    }
    match tag {
        "IN" if SUBORDINATORS.contains(&lower) => "SCONJ",
        "RB" if matches!(lower, "not" | "n't") => "PART",
        _ => universal_pos(tag),
    }
}
