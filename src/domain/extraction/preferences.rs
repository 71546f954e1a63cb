//! Budget, interest, pace and must-see/avoid extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::trip::{BudgetTier, Pace, Preferences};

/// Budget keyword table, most specific tier first.
const BUDGET_TABLE: &[(BudgetTier, &[&str])] = &[
    (
        BudgetTier::Luxury,
        &[
            "luxury", "luxurious", "high-end", "high end", "upscale", "five-star", "5-star",
            "five star", "5 star", "splurge", "lavish", "premium",
        ],
    ),
    (
        BudgetTier::Mid,
        &[
            "mid-range", "mid range", "midrange", "moderate budget", "mid-budget",
            "reasonably priced", "not too expensive",
        ],
    ),
    (
        BudgetTier::Budget,
        &[
            "budget", "cheap", "affordable", "backpacking", "backpacker", "low-cost",
            "low cost", "inexpensive", "shoestring", "economical",
        ],
    ),
];

/// Pace keyword table.
const PACE_TABLE: &[(Pace, &[&str])] = &[
    (
        Pace::Relaxed,
        &[
            "relaxed", "relaxing", "slow pace", "slow-paced", "leisurely", "laid-back",
            "laid back", "easy-going", "unhurried", "chill",
        ],
    ),
    (
        Pace::Packed,
        &[
            "packed", "action-packed", "fast-paced", "fast paced", "busy", "see everything",
            "as much as possible", "intense",
        ],
    ),
    (
        Pace::Moderate,
        &["moderate pace", "moderately paced", "balanced", "not too rushed", "mix of"],
    ),
];

/// Interest vocabulary: canonical interest and the words that signal it.
const INTEREST_TABLE: &[(&str, &[&str])] = &[
    ("food", &["food", "foodie", "cuisine", "culinary", "restaurants", "street food", "eating"]),
    ("history", &["history", "historic", "historical", "ancient", "ruins"]),
    ("art", &["art", "arts", "gallery", "galleries"]),
    ("museums", &["museum", "museums"]),
    ("culture", &["culture", "cultural", "traditions"]),
    ("nature", &["nature", "outdoors", "wildlife", "national park", "national parks"]),
    ("beaches", &["beach", "beaches", "coast", "seaside"]),
    ("nightlife", &["nightlife", "bars", "clubs", "clubbing", "party", "partying"]),
    ("shopping", &["shopping", "markets", "boutiques"]),
    ("adventure", &["adventure", "adrenaline", "extreme sports"]),
    ("architecture", &["architecture", "cathedrals", "churches", "castles"]),
    ("music", &["music", "concerts", "live music"]),
    ("wine", &["wine", "vineyards", "wineries", "wine tasting"]),
    ("hiking", &["hiking", "hike", "trekking", "trails"]),
    ("photography", &["photography", "photos"]),
    ("wellness", &["spa", "wellness", "yoga"]),
    ("sports", &["sports", "football", "soccer", "surfing", "skiing", "diving"]),
];

type KeywordRegex<T> = Vec<(T, Regex)>;

fn keyword_alternation(keywords: &[&str]) -> Regex {
    let alternation = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation)).expect("keyword pattern is valid")
}

fn compile_table<T: Copy>(table: &[(T, &[&str])]) -> KeywordRegex<T> {
    table
        .iter()
        .map(|(value, keywords)| (*value, keyword_alternation(keywords)))
        .collect()
}

static BUDGET: Lazy<KeywordRegex<BudgetTier>> = Lazy::new(|| compile_table(BUDGET_TABLE));
static PACE: Lazy<KeywordRegex<Pace>> = Lazy::new(|| compile_table(PACE_TABLE));
static INTERESTS: Lazy<KeywordRegex<&'static str>> = Lazy::new(|| compile_table(INTEREST_TABLE));

static MUST_SEE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:must[\s-]+(?:see|visit|do)|have\s+to\s+see|can'?t\s+miss|cannot\s+miss|don'?t\s+want\s+to\s+miss)\s*(?:is|are|:)?\s+([^.!?;\n]+)",
    )
    .expect("must-see pattern is valid")
});

static AVOID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:avoid(?:ing)?|skip(?:ping)?|stay\s+away\s+from|not\s+interested\s+in|hate)\s+([^.!?;\n]+)",
    )
    .expect("avoid pattern is valid")
});

static PHRASE_STOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:but|while|because|although|though|so|if|when|then|also|please|for\s+\d+)\b",
    )
    .expect("phrase stop pattern is valid")
});

static ITEM_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i),|&|\band\b|\bor\b").expect("item split pattern is valid"));

/// Extracts preferences, or `None` if nothing preference-related is present.
pub fn extract_preferences(original: &str, lowercase: &str) -> Option<Preferences> {
    let prefs = Preferences {
        budget: extract_budget(lowercase),
        interests: extract_interests(lowercase),
        pace: extract_pace(lowercase),
        must_see: capture_items(&MUST_SEE, original),
        avoid: capture_items(&AVOID, original),
    };
    (!prefs.is_empty()).then_some(prefs)
}

pub fn extract_budget(lowercase: &str) -> Option<BudgetTier> {
    BUDGET
        .iter()
        .find(|(_, re)| re.is_match(lowercase))
        .map(|(tier, _)| *tier)
}

pub fn extract_pace(lowercase: &str) -> Option<Pace> {
    PACE.iter()
        .find(|(_, re)| re.is_match(lowercase))
        .map(|(pace, _)| *pace)
}

/// Canonical interests mentioned in the text, deduplicated, in table order.
pub fn extract_interests(lowercase: &str) -> Vec<String> {
    INTERESTS
        .iter()
        .filter(|(_, re)| re.is_match(lowercase))
        .map(|(interest, _)| interest.to_string())
        .collect()
}

fn capture_items(re: &Regex, original: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for caps in re.captures_iter(original) {
        let Some(phrase) = caps.get(1) else { continue };
        let phrase = phrase.as_str();
        let phrase = match PHRASE_STOP.find(phrase) {
            Some(stop) => &phrase[..stop.start()],
            None => phrase,
        };
        for item in ITEM_SPLIT.split(phrase) {
            let item = item
                .trim()
                .trim_end_matches(|c: char| !c.is_alphanumeric() && c != ')')
                .trim();
            if item.is_empty() || item.eq_ignore_ascii_case("please") {
                continue;
            }
            if !items.iter().any(|i| i.eq_ignore_ascii_case(item)) {
                items.push(item.to_string());
            }
        }
    }
    items
}
