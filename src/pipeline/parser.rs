//! Rule-based dependency parser.
//!
//! Uses the tokenizer's sentences (or splits tagged tokens itself), groups
//! each sentence into noun phrases and single words, then attaches words
//! with a left-to-right pass around the main verb. Labels follow the ClearNLP scheme used by
//! OntoNotes-trained English parsers (`nsubj`, `dobj`, `prep`, `pobj`, ...).

use std::ops::Range;

use super::lexicon::is_be_form;
use super::{Doc, Span, Token};

/// Head index and dependency label for one token.
type Arc = (usize, &'static str);

#[derive(Debug, Clone)]
enum Unit {
    /// Noun phrase with its nominal head.
    Noun { range: Range<usize>, head: usize },
    /// Adjective run without a nominal head ("is lazy").
    Adj { range: Range<usize>, head: usize },
    Word(usize),
}

impl Unit {
    fn head(&self) -> usize {
        match self {
            Unit::Noun { head, .. } | Unit::Adj { head, .. } => *head,
            Unit::Word(k) => *k,
        }
    }

    fn contains(&self, k: usize) -> bool {
        match self {
            Unit::Noun { range, .. } | Unit::Adj { range, .. } => range.contains(&k),
            Unit::Word(w) => *w == k,
        }
    }

    fn is_noun(&self) -> bool {
        matches!(self, Unit::Noun { .. })
    }
}

/// Assign heads and labels, sentence spans and noun chunks to a tagged doc.
pub fn parse(doc: &mut Doc) {
    let bounds = if doc.sents.is_empty() {
        sentence_bounds(doc)
    } else {
        doc.sents.iter().map(|s| s.start..s.end).collect()
    };
    let mut arcs: Vec<Arc> = (0..doc.len()).map(|i| (i, "dep")).collect();
    let mut chunks = Vec::new();

    for range in &bounds {
        let mut parser = SentenceParser {
            tokens: &doc.tokens,
            arcs: &mut arcs,
            range: range.clone(),
        };
        chunks.extend(parser.parse());
    }

    for (token, (head, dep)) in doc.tokens.iter_mut().zip(arcs) {
        token.head = head;
        token.dep = dep.to_string();
    }
    doc.sents = bounds
        .into_iter()
        .map(|r| Span::new(r.start, r.end, ""))
        .collect();
    doc.noun_chunks = chunks;
}

// ============================================================================
// Sentence segmentation
// ============================================================================

fn is_terminal(text: &str) -> bool {
    matches!(text, "." | "!" | "?" | "..." | "\u{2026}")
}

fn is_closer(text: &str) -> bool {
    matches!(text, ")" | "]" | "\"" | "'" | "\u{201D}" | "\u{2019}")
}

/// Token ranges of each sentence. Sentences end at terminal punctuation
/// (plus any closing quote or bracket) or at a blank line.
fn sentence_bounds(doc: &Doc) -> Vec<Range<usize>> {
    let tokens = &doc.tokens;
    let mut bounds = Vec::new();
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        let Some(next) = tokens.get(i + 1) else {
            bounds.push(start..i + 1);
            break;
        };
        let ends_here = (is_terminal(&token.text) && !is_closer(&next.text))
            || (is_closer(&token.text) && i > start && is_terminal(&tokens[i - 1].text));
        let gap = doc
            .text
            .get(token.byte_idx + token.text.len()..next.byte_idx)
            .unwrap_or("");
        if ends_here || gap.contains("\n\n") {
            bounds.push(start..i + 1);
            start = i + 1;
        }
    }

    bounds
}

// ============================================================================
// Sentence parsing
// ============================================================================

fn can_head(tag: &str) -> bool {
    matches!(tag, "NN" | "NNS" | "NNP" | "NNPS" | "CD" | "$")
}

fn starts_noun_phrase(tag: &str) -> bool {
    matches!(tag, "DT" | "PDT" | "PRP$" | "JJ" | "JJR" | "JJS") || can_head(tag)
}

fn inside_noun_phrase(tag: &str) -> bool {
    matches!(tag, "JJ" | "JJR" | "JJS") || can_head(tag)
}

struct SentenceParser<'a> {
    tokens: &'a [Token],
    arcs: &'a mut [Arc],
    range: Range<usize>,
}

impl SentenceParser<'_> {
    fn tag(&self, k: usize) -> &str {
        &self.tokens[k].tag
    }

    fn pos(&self, k: usize) -> &str {
        &self.tokens[k].pos
    }

    fn lower(&self, k: usize) -> String {
        self.tokens[k].text.to_lowercase().replace('\u{2019}', "'")
    }

    fn set(&mut self, k: usize, head: usize, label: &'static str) {
        self.arcs[k] = (head, label);
    }

    fn parse(&mut self) -> Vec<Span> {
        let units = self.chunk();
        let mut chunks = Vec::new();

        for unit in &units {
            match unit {
                Unit::Noun { range, head } => {
                    self.attach_noun_phrase(range.clone(), *head);
                    if matches!(self.pos(*head), "NOUN" | "PROPN" | "PRON") {
                        chunks.push(Span::new(range.start, range.end, ""));
                    }
                }
                Unit::Adj { range, head } => self.attach_modifiers(range.clone(), *head),
                Unit::Word(_) => {}
            }
        }

        let root = self.find_root(&units);
        self.set(root, root, "ROOT");
        let split = units.iter().position(|u| u.contains(root)).unwrap_or(0);
        self.attach_before_root(&units[..split], root);
        self.attach_after_root(&units[split + 1..], root);

        // Only the root may head itself.
        for k in self.range.clone() {
            if k != root && self.arcs[k].0 == k {
                self.set(k, root, "dep");
            }
        }

        chunks
    }

    // ------------------------------------------------------------------
    // Chunking
    // ------------------------------------------------------------------

    fn chunk(&self) -> Vec<Unit> {
        let end = self.range.end;
        let mut units = Vec::new();
        let mut k = self.range.start;

        while k < end {
            let tag = self.tag(k);
            if tag == "PRP" {
                units.push(Unit::Noun { range: k..k + 1, head: k });
                k += 1;
                continue;
            }
            if !starts_noun_phrase(tag) {
                units.push(Unit::Word(k));
                k += 1;
                continue;
            }

            let mut j = k + 1;
            while j < end && self.continues_noun_phrase(j) {
                j += 1;
            }
            let mut last = j;
            while last > k && !can_head(self.tag(last - 1)) {
                last -= 1;
            }

            if last > k {
                units.push(Unit::Noun {
                    range: k..last,
                    head: self.phrase_head(k..last),
                });
                k = last;
            } else if matches!(tag, "DT" | "PDT" | "PRP$") {
                // "the rich", or a demonstrative used as a pronoun
                units.push(Unit::Noun { range: k..j, head: j - 1 });
                k = j;
            } else {
                units.push(Unit::Adj { range: k..j, head: j - 1 });
                k = j;
            }
        }

        units
    }

    fn continues_noun_phrase(&self, j: usize) -> bool {
        let next_inside = j + 1 < self.range.end && inside_noun_phrase(self.tag(j + 1));
        match self.tag(j) {
            "POS" => can_head(self.tag(j - 1)) && next_inside,
            "HYPH" => next_inside,
            tag => inside_noun_phrase(tag),
        }
    }

    /// Head of a noun phrase: the last noun after any possessor, else a
    /// currency symbol, else the last number.
    fn phrase_head(&self, range: Range<usize>) -> usize {
        let seg_start = range
            .clone()
            .rev()
            .find(|&k| self.tag(k) == "POS")
            .map_or(range.start, |p| p + 1);
        let seg = seg_start..range.end;

        seg.clone()
            .rev()
            .find(|&k| self.tag(k).starts_with("NN"))
            .or_else(|| seg.clone().find(|&k| self.tag(k) == "$"))
            .or_else(|| seg.clone().rev().find(|&k| self.tag(k) == "CD"))
            .unwrap_or(range.end - 1)
    }

    fn attach_noun_phrase(&mut self, range: Range<usize>, head: usize) {
        let markers: Vec<usize> = range.clone().filter(|&k| self.tag(k) == "POS").collect();
        let mut seg_start = range.start;

        for marker in markers {
            if marker == seg_start {
                continue;
            }
            let owner = self.phrase_head(seg_start..marker);
            self.attach_modifiers(seg_start..marker, owner);
            self.set(owner, head, "poss");
            self.set(marker, owner, "case");
            seg_start = marker + 1;
        }
        self.attach_modifiers(seg_start..range.end, head);
    }

    fn attach_modifiers(&mut self, range: Range<usize>, head: usize) {
        for k in range.clone() {
            if k == head {
                continue;
            }
            let label = match self.tag(k) {
                "DT" | "PDT" => "det",
                "PRP$" => "poss",
                "JJ" | "JJR" | "JJS" => "amod",
                "CD" if k + 1 < range.end && self.tag(k + 1) == "CD" => {
                    self.set(k, k + 1, "compound");
                    continue;
                }
                "CD" => "nummod",
                "$" => "quantmod",
                "NN" | "NNS" | "NNP" | "NNPS" => "compound",
                "HYPH" => "punct",
                _ => "dep",
            };
            self.set(k, head, label);
        }
    }

    // ------------------------------------------------------------------
    // Attachment
    // ------------------------------------------------------------------

    /// The first main verb; else the last auxiliary of the first
    /// auxiliary chain (copular sentences); else the first noun phrase.
    fn find_root(&self, units: &[Unit]) -> usize {
        let range = self.range.clone();
        if let Some(verb) = range.clone().find(|&k| self.pos(k) == "VERB") {
            return verb;
        }
        if let Some(first) = range.clone().find(|&k| self.pos(k) == "AUX") {
            let mut last = first;
            for k in first + 1..range.end {
                match self.pos(k) {
                    "AUX" => last = k,
                    _ if self.tag(k).starts_with("RB") => {}
                    _ => break,
                }
            }
            return last;
        }
        units
            .iter()
            .find(|u| u.is_noun())
            .or_else(|| {
                units
                    .iter()
                    .find(|u| !matches!(u, Unit::Word(k) if self.tokens[*k].is_punct()))
            })
            .map(Unit::head)
            .unwrap_or(range.start)
    }

    /// Index of the main verb an auxiliary at `k` supports, if any.
    fn supported_verb(&self, k: usize) -> Option<usize> {
        for j in k + 1..self.range.end {
            match self.pos(j) {
                "VERB" => return Some(j),
                "AUX" | "PART" => {}
                _ if self.tag(j).starts_with("RB") => {}
                _ => return None,
            }
        }
        None
    }

    /// Whether a finite verb or auxiliary follows position `from`.
    fn finite_follows(&self, from: usize) -> bool {
        for j in from..self.range.end {
            if self.tag(j).starts_with("RB") {
                continue;
            }
            return matches!(self.tag(j), "VBZ" | "VBD" | "VBP" | "MD") || self.pos(j) == "AUX";
        }
        false
    }

    fn attach_before_root(&mut self, units: &[Unit], root: usize) {
        let passive = self.tag(root) == "VBN"
            && (self.range.start..root)
                .any(|k| self.pos(k) == "AUX" && is_be_form(&self.lower(k)));
        let mut subject: Option<usize> = None;
        let mut pending_prep: Option<usize> = None;
        let mut pending_cc: Option<usize> = None;
        let mut prev_was_noun = false;

        for unit in units {
            let k = unit.head();
            if let Unit::Word(_) = unit {
                let lower = self.lower(k);
                let label = if self.tokens[k].is_punct() {
                    "punct"
                } else if self.pos(k) == "AUX" || self.tag(k) == "MD" {
                    if passive && is_be_form(&lower) {
                        "auxpass"
                    } else {
                        "aux"
                    }
                } else if lower == "not" || lower == "n't" {
                    "neg"
                } else {
                    match self.tag(k) {
                        "RB" | "RBR" | "RBS" | "WRB" => "advmod",
                        "IN" if self.pos(k) == "SCONJ" => "mark",
                        "IN" => {
                            pending_prep = Some(k);
                            "prep"
                        }
                        "TO" => "aux",
                        "CC" if prev_was_noun => {
                            pending_cc = Some(k);
                            prev_was_noun = false;
                            continue;
                        }
                        "CC" => "cc",
                        "EX" => "expl",
                        "UH" => "intj",
                        _ => "dep",
                    }
                };
                self.set(k, root, label);
                prev_was_noun = false;
                continue;
            }

            if let Some(prep) = pending_prep.take() {
                self.set(k, prep, "pobj");
            } else if let (Some(cc), Some(first)) = (pending_cc, subject) {
                self.set(cc, first, "cc");
                self.set(k, first, "conj");
                pending_cc = None;
            } else {
                if let Some(earlier) = subject {
                    self.set(earlier, root, "npadvmod");
                }
                subject = Some(k);
            }
            prev_was_noun = unit.is_noun();
        }

        if let Some(cc) = pending_cc {
            self.set(cc, root, "cc");
        }
        if let Some(subject) = subject {
            self.set(subject, root, if passive { "nsubjpass" } else { "nsubj" });
        }
    }

    fn attach_after_root(&mut self, units: &[Unit], root: usize) {
        let mut verb = root;
        let mut object: Option<usize> = None;
        let mut last_noun: Option<usize> = None;
        let mut prev_was_noun = false;
        let mut prev_was_object = false;

        let mut pending_prep: Option<usize> = None;
        // (conjunction, first conjunct, conjunct is nominal)
        let mut pending_cc: Option<(usize, usize, bool)> = None;
        // Open clauses nest, so these are stacks with the innermost last:
        // (relativizer, antecedent) and (marker or "to", governing verb).
        let mut pending_rel: Vec<(usize, usize)> = Vec::new();
        let mut pending_mark: Vec<(usize, usize)> = Vec::new();
        let mut pending_to: Vec<(usize, usize)> = Vec::new();
        let mut pending_subj: Option<usize> = None;
        let mut pending_neg: Option<usize> = None;
        let mut pending_aux: Vec<usize> = Vec::new();

        for unit in units {
            let k = unit.head();

            match unit {
                Unit::Noun { range, .. } | Unit::Adj { range, .. } => {
                    let is_noun = unit.is_noun();
                    let mut assigned_object = false;
                    if let Some(prep) = pending_prep.take() {
                        self.set(k, prep, "pobj");
                    } else if let Some((_, first, true)) = pending_cc.filter(|_| is_noun) {
                        self.set(k, first, "conj");
                        pending_cc = None;
                    } else if is_noun && self.finite_follows(range.end) {
                        if let Some(earlier) = pending_subj.replace(k) {
                            self.set(earlier, verb, "dep");
                        }
                    } else if self.pos(verb) == "AUX" {
                        self.set(k, verb, if is_noun { "attr" } else { "acomp" });
                    } else if !is_noun {
                        self.set(k, verb, "acomp");
                    } else {
                        if let Some(first) = object.filter(|_| prev_was_object) {
                            self.set(first, verb, "dative");
                        }
                        self.set(k, verb, "dobj");
                        object = Some(k);
                        assigned_object = true;
                    }
                    if is_noun {
                        last_noun = Some(k);
                    }
                    prev_was_noun = is_noun;
                    prev_was_object = assigned_object;
                    continue;
                }
                Unit::Word(_) => {}
            }

            let lower = self.lower(k);
            let tag = self.tag(k).to_string();
            let is_clause_head = self.pos(k) == "VERB"
                || (self.pos(k) == "AUX" && self.supported_verb(k).is_none());

            if self.tokens[k].is_punct() {
                self.set(k, root, "punct");
            } else if is_clause_head {
                let (head, label) = if let Some(prep) = pending_prep.take() {
                    (prep, "pcomp")
                } else if let Some((rel, antecedent)) = pending_rel.pop() {
                    // "the book that the teacher wrote": the relativizer is the object
                    let role = if pending_subj.is_some() { "dobj" } else { "nsubj" };
                    self.set(rel, k, role);
                    (antecedent, "relcl")
                } else if let Some((_, first, false)) = pending_cc {
                    pending_cc = None;
                    (first, "conj")
                } else if let Some(&(mark, governor)) = pending_mark.last() {
                    let label = if self.lower(mark) == "that" { "ccomp" } else { "advcl" };
                    (governor, label)
                } else if pending_subj.is_some() {
                    (verb, "ccomp")
                } else if let Some(&(_, governor)) = pending_to.last() {
                    (governor, "xcomp")
                } else if prev_was_noun && matches!(tag.as_str(), "VBG" | "VBN") {
                    (last_noun.unwrap_or(verb), "acl")
                } else if matches!(tag.as_str(), "VBG" | "VB") {
                    (verb, "xcomp")
                } else {
                    (verb, "dep")
                };
                self.set(k, head, label);

                let passive = tag == "VBN";
                let mut passive_aux = false;
                for aux in pending_aux.drain(..) {
                    let be = is_be_form(&self.lower(aux));
                    passive_aux |= passive && be;
                    self.set(aux, k, if passive && be { "auxpass" } else { "aux" });
                }
                if let Some(neg) = pending_neg.take() {
                    self.set(neg, k, "neg");
                }
                if let Some(subj) = pending_subj.take() {
                    self.set(subj, k, if passive_aux { "nsubjpass" } else { "nsubj" });
                }
                if let Some((mark, _)) = pending_mark.pop() {
                    self.set(mark, k, "mark");
                }
                if let Some((to, _)) = pending_to.pop() {
                    self.set(to, k, "aux");
                }
                verb = k;
                object = None;
            } else if self.pos(k) == "AUX" || tag == "MD" {
                pending_aux.push(k);
            } else if lower == "not" || lower == "n't" {
                if pending_aux.is_empty() {
                    self.set(k, verb, "neg");
                } else if let Some(earlier) = pending_neg.replace(k) {
                    self.set(earlier, verb, "neg");
                }
            } else {
                match tag.as_str() {
                    "RB" | "RBR" | "RBS" | "WRB" => {
                        let modifies_next = k + 1 < self.range.end
                            && matches!(self.tag(k + 1), "JJ" | "JJR" | "JJS" | "RB" | "RBR");
                        self.set(k, if modifies_next { k + 1 } else { verb }, "advmod");
                    }
                    "TO" => pending_to.push((k, verb)),
                    "IN" if self.pos(k) == "SCONJ" || lower == "that" => {
                        pending_mark.push((k, verb))
                    }
                    "IN" => {
                        let head = match last_noun {
                            Some(noun) if lower == "of" && prev_was_noun => noun,
                            _ => verb,
                        };
                        self.set(k, head, "prep");
                        pending_prep = Some(k);
                    }
                    "RP" => self.set(k, verb, "prt"),
                    "CC" => {
                        let (first, nominal) = match last_noun {
                            Some(noun) if prev_was_noun => (noun, true),
                            _ => (verb, false),
                        };
                        self.set(k, first, "cc");
                        pending_cc = Some((k, first, nominal));
                    }
                    "WDT" | "WP" if prev_was_noun => match last_noun {
                        Some(noun) => pending_rel.push((k, noun)),
                        None => self.set(k, verb, "dep"),
                    },
                    "EX" => self.set(k, verb, "expl"),
                    "UH" => self.set(k, root, "intj"),
                    "POS" if k > 0 => self.set(k, k - 1, "case"),
                    _ => self.set(k, verb, "dep"),
                }
            }

            prev_was_noun = false;
            prev_was_object = false;
        }

        // Anything still waiting for a clause hangs off the last one.
        for aux in pending_aux {
            self.set(aux, verb, "aux");
        }
        let leftovers = pending_subj
            .into_iter()
            .chain(pending_neg)
            .chain(pending_mark.into_iter().map(|(mark, _)| mark))
            .chain(pending_to.into_iter().map(|(to, _)| to))
            .chain(pending_rel.into_iter().map(|(rel, _)| rel));
        for k in leftovers {
            self.set(k, verb, "dep");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tagged_doc;
    use crate::pipeline::tagger::{apply, Reading};

    fn parsed(words: &[(&str, &str)]) -> Doc {
        let mut doc = tagged_doc(words);
        parse(&mut doc);
        doc
    }

    fn arc(doc: &Doc, i: usize) -> (&str, &str) {
        let token = &doc.tokens[i];
        (token.dep.as_str(), doc.tokens[token.head].text.as_str())
    }

    fn company_sentence() -> Doc {
        parsed(&[
            ("Apple", "NNP"),
            ("is", "VBZ"),
            ("looking", "VBG"),
            ("at", "IN"),
            ("buying", "VBG"),
            ("U.K.", "NNP"),
            ("startup", "NN"),
            ("for", "IN"),
            ("$", "$"),
            ("1", "CD"),
            ("billion", "CD"),
        ])
    }

    /// Every sentence has one root, the root is the only token that heads
    /// itself, and every head lies inside the sentence.
    fn assert_well_formed(doc: &Doc) {
        assert!(!doc.sents.is_empty());
        for sent in &doc.sents {
            let roots: Vec<usize> = (sent.start..sent.end)
                .filter(|&i| doc.tokens[i].dep == "ROOT")
                .collect();
            assert_eq!(roots.len(), 1, "{}", doc.span_text(sent));
            for i in sent.start..sent.end {
                let token = &doc.tokens[i];
                assert!((sent.start..sent.end).contains(&token.head));
                assert_eq!(
                    token.head == i,
                    token.dep == "ROOT",
                    "{:?} in {:?}",
                    (&token.text, &token.dep),
                    doc.text
                );
            }
        }
    }

    #[test]
    fn test_pangram_tree() {
        let doc = parsed(&[
            ("The", "DT"),
            ("quick", "JJ"),
            ("brown", "JJ"),
            ("fox", "NN"),
            ("jumps", "VBZ"),
            ("over", "IN"),
            ("the", "DT"),
            ("lazy", "JJ"),
            ("dog", "NN"),
        ]);
        assert_eq!(arc(&doc, 4), ("ROOT", "jumps"));
        assert_eq!(arc(&doc, 0), ("det", "fox"));
        assert_eq!(arc(&doc, 1), ("amod", "fox"));
        assert_eq!(arc(&doc, 3), ("nsubj", "jumps"));
        assert_eq!(arc(&doc, 5), ("prep", "jumps"));
        assert_eq!(arc(&doc, 8), ("pobj", "over"));
    }

    #[test]
    fn test_company_sentence_tree() {
        let doc = company_sentence();
        assert_eq!(arc(&doc, 0), ("nsubj", "looking"));
        assert_eq!(arc(&doc, 1), ("aux", "looking"));
        assert_eq!(arc(&doc, 2), ("ROOT", "looking"));
        assert_eq!(arc(&doc, 3), ("prep", "looking"));
        assert_eq!(arc(&doc, 4), ("pcomp", "at"));
        assert_eq!(arc(&doc, 5), ("compound", "startup"));
        assert_eq!(arc(&doc, 6), ("dobj", "buying"));
        assert_eq!(arc(&doc, 7), ("prep", "buying"));
        assert_eq!(arc(&doc, 8), ("pobj", "for"));
        assert_eq!(arc(&doc, 10), ("nummod", "$"));
    }

    #[test]
    fn test_noun_chunks() {
        let doc = company_sentence();
        let chunks: Vec<&str> = doc.noun_chunks.iter().map(|s| doc.span_text(s)).collect();
        assert_eq!(chunks, vec!["Apple", "U.K. startup"]);
    }

    #[test]
    fn test_possessive() {
        let doc = parsed(&[("Apple", "NNP"), ("'s", "POS"), ("shares", "NNS"), ("fell", "VBD")]);
        assert_eq!(arc(&doc, 0), ("poss", "shares"));
        assert_eq!(arc(&doc, 1), ("case", "Apple"));
        assert_eq!(arc(&doc, 2), ("nsubj", "fell"));
        let chunks: Vec<&str> = doc.noun_chunks.iter().map(|s| doc.span_text(s)).collect();
        assert_eq!(chunks, vec!["Apple's shares"]);
    }

    #[test]
    fn test_clausal_complement_and_negation() {
        let doc = parsed(&[
            ("I", "PRP"),
            ("do", "VBP"),
            ("n't", "RB"),
            ("think", "VB"),
            ("he", "PRP"),
            ("left", "VBD"),
        ]);
        assert_eq!(arc(&doc, 3), ("ROOT", "think"));
        assert_eq!(arc(&doc, 1), ("aux", "think"));
        assert_eq!(arc(&doc, 2), ("neg", "think"));
        assert_eq!(arc(&doc, 5), ("ccomp", "think"));
        assert_eq!(arc(&doc, 4), ("nsubj", "left"));
    }

    #[test]
    fn test_copula() {
        let doc = parsed(&[("The", "DT"), ("dog", "NN"), ("is", "VBZ"), ("lazy", "JJ"), (".", ".")]);
        assert_eq!(arc(&doc, 2), ("ROOT", "is"));
        assert_eq!(arc(&doc, 1), ("nsubj", "is"));
        assert_eq!(arc(&doc, 3), ("acomp", "is"));
        assert_eq!(arc(&doc, 4), ("punct", "is"));
    }

    #[test]
    fn test_sentences_split_on_terminal_punctuation() {
        let doc = parsed(&[
            ("Dr.", "NNP"),
            ("Smith", "NNP"),
            ("arrived", "VBD"),
            (".", "."),
            ("He", "PRP"),
            ("sat", "VBD"),
            ("down", "RP"),
            ("!", "."),
            ("Then", "RB"),
            ("it", "PRP"),
            ("rained", "VBD"),
        ]);
        let sents: Vec<&str> = doc.sents.iter().map(|s| doc.span_text(s)).collect();
        assert_eq!(sents, vec!["Dr. Smith arrived.", "He sat down!", "Then it rained"]);
    }

    #[test]
    fn test_sentences_split_on_blank_line() {
        let text = "Hi there\n\nBye now";
        let mut tokens = vec![
            Token::new("Hi", 0, 0),
            Token::new("there", 3, 3),
            Token::new("Bye", 10, 10),
            Token::new("now", 14, 14),
        ];
        let tags = [("UH", "hi"), ("RB", "there"), ("UH", "bye"), ("RB", "now")];
        let chosen: Vec<Reading> = tags.iter().map(|(t, l)| Reading::new(*t, *l)).collect();
        apply(&mut tokens, &chosen);
        let mut doc = Doc::new(text, tokens);
        parse(&mut doc);
        assert_eq!(doc.sents, vec![Span::new(0, 2, ""), Span::new(2, 4, "")]);
    }

    #[test]
    fn test_existing_sentences_are_kept() {
        let mut doc = tagged_doc(&[("Stop", "VB"), ("now", "RB"), ("please", "UH"), ("go", "VB")]);
        doc.sents = vec![Span::new(0, 2, ""), Span::new(2, 4, "")];
        parse(&mut doc);
        assert_eq!(doc.sents.len(), 2);
        assert_eq!(arc(&doc, 0), ("ROOT", "Stop"));
        assert_eq!(arc(&doc, 3), ("ROOT", "go"));
        assert_well_formed(&doc);
    }

    #[test]
    fn test_one_root_per_sentence() {
        let doc = parsed(&[
            ("She", "PRP"),
            ("said", "VBD"),
            ("that", "IN"),
            ("the", "DT"),
            ("plan", "NN"),
            ("works", "VBZ"),
            (".", "."),
            ("We", "PRP"),
            ("agree", "VBP"),
            (",", ","),
            ("and", "CC"),
            ("they", "PRP"),
            ("left", "VBD"),
            ("early", "RB"),
            (".", "."),
        ]);
        assert_eq!(doc.sents.len(), 2);
        assert_well_formed(&doc);
    }

    #[test]
    fn test_nested_relative_clauses() {
        let doc = parsed(&[
            ("She", "PRP"),
            ("read", "VBD"),
            ("the", "DT"),
            ("book", "NN"),
            ("that", "WDT"),
            ("the", "DT"),
            ("teacher", "NN"),
            ("who", "WP"),
            ("retired", "VBD"),
            ("wrote", "VBD"),
            (".", "."),
        ]);
        assert_well_formed(&doc);
        assert_eq!(arc(&doc, 7), ("nsubj", "retired"));
        assert_eq!(arc(&doc, 8), ("relcl", "teacher"));
        assert_eq!(arc(&doc, 9), ("relcl", "book"));
        assert_eq!(arc(&doc, 4).1, "wrote");

        let doc = parsed(&[
            ("We", "PRP"),
            ("saw", "VBD"),
            ("the", "DT"),
            ("house", "NN"),
            ("which", "WDT"),
            ("the", "DT"),
            ("family", "NN"),
            ("which", "WDT"),
            ("moved", "VBD"),
            ("sold", "VBD"),
            (".", "."),
        ]);
        assert_well_formed(&doc);
        assert_eq!(arc(&doc, 4).1, "sold");
    }

    #[test]
    fn test_nested_subordinate_clauses() {
        let doc = parsed(&[
            ("It", "PRP"),
            ("has", "VBZ"),
            ("been", "VBN"),
            ("said", "VBN"),
            ("that", "IN"),
            ("if", "IN"),
            ("you", "PRP"),
            ("wait", "VBP"),
            (",", ","),
            ("it", "PRP"),
            ("comes", "VBZ"),
            (".", "."),
        ]);
        assert_well_formed(&doc);
        assert_eq!(arc(&doc, 3), ("ROOT", "said"));
        assert_eq!(arc(&doc, 5), ("mark", "wait"));
        assert_eq!(arc(&doc, 4), ("mark", "comes"));
        assert_eq!(arc(&doc, 10), ("ccomp", "said"));
    }

    #[test]
    fn test_repeated_infinitive_marker() {
        let doc = parsed(&[
            ("They", "PRP"),
            ("want", "VBP"),
            ("to", "TO"),
            (",", ","),
            ("to", "TO"),
            ("be", "VB"),
            ("honest", "JJ"),
            (",", ","),
            ("leave", "VB"),
            (".", "."),
        ]);
        assert_well_formed(&doc);
        assert_eq!(arc(&doc, 4), ("aux", "be"));
        assert_eq!(arc(&doc, 2), ("aux", "leave"));
        assert_eq!(arc(&doc, 8), ("xcomp", "want"));
    }
}
