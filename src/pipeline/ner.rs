//! Named entity recognition over a tagged doc.
//!
//! Candidates come from three extractors: gazetteers of known names,
//! regex patterns for numeric expressions (money, dates, times, ...) and
//! runs of proper nouns classified by titles and organization suffixes.
//! Overlapping candidates are resolved longest-first, so "$1 billion"
//! wins over the bare cardinal "1".

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use super::{Doc, Span, Token};

/// OntoNotes entity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Norp,
    Fac,
    Org,
    Gpe,
    Loc,
    Product,
    Event,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
}

impl EntityLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Norp => "NORP",
            EntityLabel::Fac => "FAC",
            EntityLabel::Org => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Loc => "LOC",
            EntityLabel::Product => "PRODUCT",
            EntityLabel::Event => "EVENT",
            EntityLabel::Date => "DATE",
            EntityLabel::Time => "TIME",
            EntityLabel::Percent => "PERCENT",
            EntityLabel::Money => "MONEY",
            EntityLabel::Quantity => "QUANTITY",
            EntityLabel::Ordinal => "ORDINAL",
            EntityLabel::Cardinal => "CARDINAL",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    start: usize,
    end: usize,
    label: EntityLabel,
    priority: u8,
}

/// Find entity spans in a tagged doc, ordered by position.
pub fn recognize(doc: &Doc) -> Vec<Span> {
    let mut candidates = Vec::new();

    extract_gazetteer(doc, &mut candidates);
    extract_numeric(doc, &mut candidates);
    extract_proper_runs(doc, &mut candidates);

    resolve(candidates)
}

fn resolve(mut candidates: Vec<Candidate>) -> Vec<Span> {
    candidates.sort_by(|a, b| {
        (b.end - b.start)
            .cmp(&(a.end - a.start))
            .then(b.priority.cmp(&a.priority))
            .then(a.start.cmp(&b.start))
    });

    let mut accepted: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let overlaps = accepted
            .iter()
            .any(|a| candidate.start < a.end && a.start < candidate.end);
        if !overlaps {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|c| c.start);
    accepted
        .into_iter()
        .map(|c| Span::new(c.start, c.end, c.label.as_str()))
        .collect()
}

// ============================================================================
// Gazetteers
// ============================================================================

const ORGANIZATIONS: &[&str] = &[
    "Apple", "Google", "Alphabet", "Microsoft", "Amazon", "Facebook", "Meta", "Tesla", "IBM",
    "Intel", "Nvidia", "Netflix", "Twitter", "OpenAI", "Samsung", "Sony", "Toyota", "Ford",
    "Boeing", "Airbus", "Oracle", "Adobe", "Uber", "Spotify", "Walmart", "Disney", "Reuters",
    "Goldman Sachs", "JPMorgan", "Morgan Stanley", "Wells Fargo", "Harvard", "Stanford", "MIT",
    "Oxford University", "United Nations", "European Union", "World Bank", "Congress", "Senate",
    "Parliament", "Supreme Court", "Federal Reserve", "New York Times", "Washington Post",
    "BBC", "CNN", "UN", "EU", "WHO", "IMF", "OPEC",
];

const AGENCY_ACRONYMS: &[&str] = &[
    "CIA", "FBI", "NSA", "NSC", "DOD", "DOJ", "DOE", "DIA", "NRO", "NGA", "DEA", "ATF", "ICE",
    "CBP", "TSA", "FEMA", "ODNI", "DARPA", "USAID", "EPA", "IRS", "SEC", "FTC", "FCC", "FAA",
    "NASA", "NIST", "NIH", "CDC", "FDA", "USDA", "HHS", "DHS", "KGB", "MI5", "MI6", "GCHQ",
    "NATO", "INTERPOL", "GAO", "CBO", "OMB",
];

const AGENCY_NAMES: &[&str] = &[
    "Central Intelligence Agency",
    "Federal Bureau of Investigation",
    "National Security Agency",
    "National Security Council",
    "Department of Defense",
    "Department of Justice",
    "Department of State",
    "Department of Energy",
    "Department of Homeland Security",
    "Defense Intelligence Agency",
    "Drug Enforcement Administration",
    "Government Accountability Office",
    "Office of Management and Budget",
    "Joint Chiefs of Staff",
    "White House",
    "State Department",
    "Pentagon",
    "Secret Service",
    "U.S. Army",
    "U.S. Navy",
    "U.S. Air Force",
    "National Guard",
];

const COUNTRIES: &[&str] = &[
    "U.K.", "UK", "U.S.", "US", "USA", "U.S.A.", "United States", "United Kingdom", "America",
    "Britain", "Great Britain", "England", "Scotland", "Wales", "Ireland", "Canada", "Mexico",
    "Brazil", "Argentina", "France", "Germany", "Italy", "Spain", "Portugal", "Netherlands",
    "Belgium", "Switzerland", "Austria", "Sweden", "Norway", "Denmark", "Finland", "Poland",
    "Greece", "Turkey", "Russia", "Ukraine", "China", "Japan", "Korea", "South Korea",
    "North Korea", "India", "Pakistan", "Iran", "Iraq", "Israel", "Egypt", "Nigeria", "Kenya",
    "South Africa", "Australia", "New Zealand", "Vietnam", "Indonesia", "Singapore",
    "Saudi Arabia", "Afghanistan", "Cuba",
];

const US_STATES: &[&str] = &[
    "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado", "Connecticut",
    "Delaware", "Florida", "Georgia", "Hawaii", "Idaho", "Illinois", "Indiana", "Iowa", "Kansas",
    "Kentucky", "Louisiana", "Maine", "Maryland", "Massachusetts", "Michigan", "Minnesota",
    "Mississippi", "Missouri", "Montana", "Nebraska", "Nevada", "New Hampshire", "New Jersey",
    "New Mexico", "New York", "North Carolina", "North Dakota", "Ohio", "Oklahoma", "Oregon",
    "Pennsylvania", "Rhode Island", "South Carolina", "South Dakota", "Tennessee", "Texas",
    "Utah", "Vermont", "Virginia", "Washington", "West Virginia", "Wisconsin", "Wyoming",
];

const CITIES: &[&str] = &[
    "Washington D.C.", "London", "Paris", "Berlin", "Madrid", "Rome", "Moscow", "Tokyo",
    "Beijing", "Shanghai", "Hong Kong", "Seoul", "Mumbai", "Delhi", "New Delhi", "Sydney",
    "Toronto", "Vancouver", "Chicago", "Boston", "Seattle", "San Francisco", "Los Angeles",
    "New York City", "Miami", "Dallas", "Houston", "Atlanta", "Denver", "Austin", "Dubai",
    "Cairo", "Istanbul", "Amsterdam", "Dublin", "Vienna", "Zurich", "Geneva", "Brussels",
    "Kabul", "Baghdad", "Tehran", "Havana", "Langley", "Quantico",
];

const NATIONALITIES: &[&str] = &[
    "American", "Americans", "British", "English", "French", "German", "Germans", "Italian",
    "Spanish", "Chinese", "Japanese", "Korean", "Indian", "Russian", "Russians", "Canadian",
    "Mexican", "Brazilian", "Australian", "European", "Europeans", "African", "Asian", "Israeli",
    "Iranian", "Ukrainian", "Democrat", "Democrats", "Democratic", "Republican", "Republicans",
    "Christian", "Christians", "Muslim", "Muslims", "Jewish", "Catholic", "Buddhist",
];

const REGIONS: &[&str] = &[
    "Europe", "Asia", "Africa", "Antarctica", "North America", "South America",
    "Latin America", "Middle East", "Silicon Valley", "Pacific Ocean", "Atlantic Ocean",
    "Indian Ocean", "Mediterranean", "Sahara", "Alps", "Himalayas", "Mount Everest",
    "the Pacific", "the Atlantic", "Midwest",
];

const FACILITIES: &[&str] = &[
    "Eiffel Tower", "Golden Gate Bridge", "Empire State Building", "Statue of Liberty",
    "Heathrow", "JFK Airport", "Times Square", "Central Park", "Camp David", "Fort Meade",
];

const EVENTS: &[&str] = &[
    "World War I", "World War II", "Cold War", "World Cup", "Olympics", "Olympic Games",
    "Super Bowl", "Brexit", "Great Depression",
];

const PRODUCTS: &[&str] = &[
    "iPhone", "iPad", "iPod", "MacBook", "Android", "Windows", "Xbox", "PlayStation", "Kindle",
    "ChatGPT", "Model S", "Model 3",
];

/// Most tokens a gazetteer entry can span ("U.S." may split as "U.S" ".").
const GAZETTEER_WINDOW: usize = 8;

/// Gazetteer entries keyed by their surface text, inner whitespace collapsed.
static GAZETTEER: LazyLock<HashMap<&'static str, EntityLabel>> = LazyLock::new(|| {
    let groups: [(EntityLabel, &[&str]); 11] = [
        (EntityLabel::Org, ORGANIZATIONS),
        (EntityLabel::Org, AGENCY_ACRONYMS),
        (EntityLabel::Org, AGENCY_NAMES),
        (EntityLabel::Gpe, COUNTRIES),
        (EntityLabel::Gpe, US_STATES),
        (EntityLabel::Gpe, CITIES),
        (EntityLabel::Norp, NATIONALITIES),
        (EntityLabel::Loc, REGIONS),
        (EntityLabel::Fac, FACILITIES),
        (EntityLabel::Event, EVENTS),
        (EntityLabel::Product, PRODUCTS),
    ];

    let mut map = HashMap::new();
    for (label, entries) in groups {
        for entry in entries {
            map.entry(*entry).or_insert(label);
        }
    }
    map
});

/// Longest gazetteer entry whose text is exactly tokens `i..end`.
fn gazetteer_match(doc: &Doc, i: usize) -> Option<(usize, EntityLabel)> {
    let tokens = &doc.tokens;
    let start = tokens[i].byte_idx;
    let last = (i + GAZETTEER_WINDOW).min(tokens.len());

    (i + 1..=last).rev().find_map(|end| {
        let final_token = &tokens[end - 1];
        let surface = doc
            .text
            .get(start..final_token.byte_idx + final_token.text.len())?;
        let key = surface.split_whitespace().collect::<Vec<_>>().join(" ");
        GAZETTEER.get(key.as_str()).map(|label| (end, *label))
    })
}

fn extract_gazetteer(doc: &Doc, candidates: &mut Vec<Candidate>) {
    for i in 0..doc.tokens.len() {
        if let Some((end, label)) = gazetteer_match(doc, i) {
            candidates.push(Candidate {
                start: i,
                end,
                label,
                priority: 5,
            });
        }
    }
}

// ============================================================================
// Numeric expressions
// ============================================================================

const NUMBER_WORD: &str = "zero|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|\
    thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|thirty|forty|fifty|\
    sixty|seventy|eighty|ninety|hundred|thousand|million|billion|trillion|dozen";

const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|\
    November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec";

const WEEKDAYS: &str = "Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday";

fn number() -> String {
    format!(r"(?:\d+(?:[.,]\d+)*|(?i:{w})(?:[\s-](?i:{w}))*)", w = NUMBER_WORD)
}

static NUMERIC_PATTERNS: LazyLock<Vec<(EntityLabel, Regex)>> = LazyLock::new(|| {
    let num = number();
    let scale = r"(?:\s+(?i:thousand|million|billion|trillion))?";
    let patterns = [
        (
            EntityLabel::Money,
            format!(
                r"[$€£¥]\s?\d+(?:[.,]\d+)*{scale}|\b{num}{scale}\s+(?i:dollars?|euros?|pounds|yen|yuan|cents?|usd|eur|gbp)\b"
            ),
        ),
        (
            EntityLabel::Percent,
            format!(r"\b{num}(?:\s?%|\s+(?i:percent|per\s+cent)\b)"),
        ),
        (
            EntityLabel::Quantity,
            format!(
                r"\b{num}\s+(?i:km|kilometers?|kilometres?|miles?|meters?|metres?|feet|foot|inch(?:es)?|kg|kilograms?|grams?|pounds|lbs?|tons?|tonnes?|liters?|litres?|gallons?|acres?|hectares?|degrees?|mph)\b"
            ),
        ),
        (
            EntityLabel::Time,
            r"\b\d{1,2}(?::\d{2}){1,2}(?:\s*(?:[aApP]\.[mM]\.|[aApP][mM]\b))?|\b\d{1,2}\s*(?:[aApP]\.[mM]\.|[aApP][mM]\b)|\b(?i:noon|midnight|tonight)\b|\b(?:\d{1,2}|(?i:one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve))\s+o'clock\b"
                .to_string(),
        ),
        (
            EntityLabel::Date,
            format!(
                r"\b(?:{months})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?\b(?:,?\s+\d{{4}}\b)?|\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:{months})\b(?:,?\s+\d{{4}}\b)?|\b(?:January|February|March|April|June|July|August|September|October|November|December)(?:,?\s+\d{{4}})?\b|\bMay,?\s+\d{{4}}\b|\b\d{{4}}-\d{{1,2}}-\d{{1,2}}\b|\b\d{{1,2}}/\d{{1,2}}/\d{{2,4}}\b|\b(?:{weekdays})s?\b|\b(?i:today|yesterday|tomorrow)\b|\b(?i:last|next|this|the\s+past|the\s+next|the\s+coming)\s+(?:(?i:week|month|year|decade|century|weekend|quarter|spring|summer|fall|autumn|winter)|{weekdays}|{months})\b|\b{num}\s+(?i:days?|weeks?|months?|years?|decades?|centuries)(?:\s+(?i:ago|old|later|earlier))?\b|\b(?:the\s+)?(?:1[0-9]|20)\d0s\b|\b(?:1[0-9]|20)\d{{2}}\b",
                months = MONTHS,
                weekdays = WEEKDAYS,
            ),
        ),
        (
            EntityLabel::Ordinal,
            r"\b(?i:first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth|eleventh|twelfth|hundredth|thousandth)\b|\b\d+(?:st|nd|rd|th)\b"
                .to_string(),
        ),
        (EntityLabel::Cardinal, format!(r"\b{num}\b")),
    ];

    patterns
        .into_iter()
        .map(|(label, pattern)| {
            let re = Regex::new(&pattern).expect("numeric entity pattern should compile");
            (label, re)
        })
        .collect()
});

/// Token range exactly covering the byte range `[start, end)`, if any.
fn token_range(tokens: &[Token], start: usize, end: usize) -> Option<(usize, usize)> {
    let first = tokens.partition_point(|t| t.byte_idx < start);
    if tokens.get(first)?.byte_idx != start {
        return None;
    }
    let last = tokens[first..]
        .iter()
        .position(|t| t.byte_idx + t.text.len() == end)?;
    Some((first, first + last + 1))
}

fn extract_numeric(doc: &Doc, candidates: &mut Vec<Candidate>) {
    for (label, pattern) in NUMERIC_PATTERNS.iter() {
        let priority = match label {
            EntityLabel::Ordinal => 1,
            EntityLabel::Cardinal => 0,
            _ => 4,
        };
        for m in pattern.find_iter(&doc.text) {
            if let Some((start, end)) = token_range(&doc.tokens, m.start(), m.end()) {
                candidates.push(Candidate {
                    start,
                    end,
                    label: *label,
                    priority,
                });
            }
        }
    }
}

// ============================================================================
// Proper-noun runs: people and organizations
// ============================================================================

static TITLES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "President", "Vice", "Secretary", "Director", "General", "Admiral", "Colonel", "Major",
        "Captain", "Lieutenant", "Sergeant", "Agent", "Ambassador", "Senator", "Representative",
        "Congressman", "Congresswoman", "Governor", "Mayor", "Judge", "Justice", "Chairman",
        "Chairwoman", "CEO", "Prime", "Minister", "Chancellor", "King", "Queen", "Prince",
        "Princess", "Sir", "Dame", "Lord", "Lady", "Pope", "Professor", "Dr.", "Prof.", "Mr.",
        "Mrs.", "Ms.", "Gen.", "Gov.", "Sen.", "Rep.", "Rev.", "Capt.", "Col.", "Lt.", "Sgt.",
    ]
    .into_iter()
    .collect()
});

static ORG_SUFFIXES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "Inc.", "Inc", "Corp.", "Corp", "Corporation", "Ltd.", "Ltd", "LLC", "Co.", "Company",
        "Group", "Holdings", "Bank", "University", "College", "Institute", "Foundation",
        "Association", "Agency", "Committee", "Council", "Party", "Airlines", "Motors",
        "Technologies", "Labs", "Systems", "Partners", "Capital", "Ventures", "Times", "Post",
        "Journal", "News",
    ]
    .into_iter()
    .collect()
});

static ORG_HEADS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "University", "Bank", "Department", "Ministry", "Bureau", "Office", "Institute",
        "Board", "Commission", "Federal", "National",
    ]
    .into_iter()
    .collect()
});

// Capitalized pairs that look like names but aren't.
static NAME_STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "The United",
        "United States",
        "Top Secret",
        "National Security",
        "Foreign Affairs",
        "Central Intelligence",
        "Federal Bureau",
        "Happy New",
        "New Year",
        "Dear Sir",
    ]
    .into_iter()
    .collect()
});

static CALENDAR_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| MONTHS.split('|').chain(WEEKDAYS.split('|')).collect());

const RUN_CONNECTORS: &[&str] = &["of", "for", "&", "the"];

fn is_proper(token: &Token) -> bool {
    matches!(token.tag.as_str(), "NNP" | "NNPS")
}

/// Maximal runs of proper nouns, allowing connectors ("Bank of America").
fn proper_runs(tokens: &[Token]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if !is_proper(&tokens[i]) {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i + 1;
        loop {
            match tokens.get(end) {
                Some(t) if is_proper(t) => end += 1,
                Some(t)
                    if RUN_CONNECTORS.contains(&t.text.as_str())
                        && tokens.get(end + 1).is_some_and(is_proper) =>
                {
                    end += 2
                }
                _ => break,
            }
        }
        runs.push((start, end));
        i = end;
    }
    runs
}

fn is_plausible_name(doc: &Doc, start: usize, end: usize) -> bool {
    let parts = &doc.tokens[start..end];
    if parts.len() < 2 || parts.len() > 4 {
        return false;
    }
    let words_only = parts.iter().all(|t| {
        t.text.chars().count() >= 2
            && t.text.starts_with(char::is_uppercase)
            && t.text.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\'')
    });
    if !words_only {
        return false;
    }
    let joined = parts.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ");
    if NAME_STOPWORDS.contains(joined.as_str()) {
        return false;
    }
    !parts.iter().any(|t| CALENDAR_WORDS.contains(t.text.as_str()))
        && (start..end).all(|i| gazetteer_match(doc, i).is_none())
}

fn extract_proper_runs(doc: &Doc, candidates: &mut Vec<Candidate>) {
    let tokens = &doc.tokens;
    for (start, end) in proper_runs(tokens) {
        let first = tokens[start].text.as_str();
        let last = tokens[end - 1].text.as_str();
        let has_connector = (start..end).any(|i| !is_proper(&tokens[i]));

        if end - start > 1 && (ORG_SUFFIXES.contains(last) || ORG_HEADS.contains(first)) {
            candidates.push(Candidate {
                start,
                end,
                label: EntityLabel::Org,
                priority: 4,
            });
            continue;
        }

        let name_start = (start..end)
            .find(|&i| !TITLES.contains(tokens[i].text.as_str()))
            .unwrap_or(end);
        let name_end = (name_start..end)
            .find(|&i| !is_proper(&tokens[i]))
            .unwrap_or(end);

        if name_start > start && name_start < name_end {
            candidates.push(Candidate {
                start: name_start,
                end: name_end,
                label: EntityLabel::Person,
                priority: 3,
            });
        } else if !has_connector && is_plausible_name(doc, start, end) {
            candidates.push(Candidate {
                start,
                end,
                label: EntityLabel::Person,
                priority: 2,
            });
        }
    }
}
