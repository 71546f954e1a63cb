//! Pattern tables for the classifier, in priority order.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::InputType;
use crate::domain::vocabulary::NUMBER_PATTERN;

/// One row of the priority table: the input type and the patterns that signal it.
pub(crate) struct PatternRule {
    pub input_type: InputType,
    pub patterns: Vec<Regex>,
}

impl PatternRule {
    pub fn matches(&self, lowercase: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(lowercase))
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("classifier pattern is valid"))
        .collect()
}

/// Rules tested against the lowercased message; the first matching rule wins.
pub(crate) static PRIORITY_TABLE: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    vec![
        PatternRule {
            input_type: InputType::Question,
            patterns: compile(&[
                r"^(?:what|where|when|how|why|which|who|whose|is|are|can|could|would|should|do|does|did|will|shall)\b",
                r"\?\s*$",
            ]),
        },
        PatternRule {
            input_type: InputType::Modification,
            patterns: compile(&[
                r"^(?:please\s+)?(?:add|remove|change|extend|replace|swap|delete|drop|shorten|switch|update|move|cut|make\s+it)\b",
                r"\binstead(?:\s+of)?\b",
                r"^actually\b",
                r"\b(?:don't|do not|no longer|not anymore|never mind|nevermind|rather than|cancel)\b",
            ]),
        },
        PatternRule {
            input_type: InputType::Structured,
            patterns: compile(&[
                &format!(
                    r"\b{}\s*(?:-\s*)?(?:days?|nights?|weeks?)\s+(?:in|at|to|around|across)\b",
                    NUMBER_PATTERN
                ),
                r"\bfrom\s+[a-z][\w\s]*?\s+to\s+[a-z0-9]",
                r"\bplan(?:ning)?\s+(?:a|an|my|our|the)?\s*(?:trip|vacation|holiday|getaway|itinerary)\b",
                r"\b(?:weekend|week|fortnight)\s+(?:in|at|to)\s+\w",
                r"\b(?:trip|vacation|holiday|getaway|itinerary)\s+(?:to|in|for)\s+\w",
            ]),
        },
        PatternRule {
            input_type: InputType::Conversational,
            patterns: compile(&[
                r"^(?:hi|hello|hey|thanks|thank you|please|great|cool|ok|okay|sure|yes|yeah|yep|no|nope|perfect|awesome|sounds good)\b",
                r"\b(?:i|we)\s+(?:want|need|wanna|hope|plan|would like|'d like)\b",
                r"\b(?:i'd|we'd)\s+(?:like|love)\b",
                r"\b(?:i'm|i am|we're|we are)\s+(?:thinking|planning|looking|hoping)\b",
            ]),
        },
    ]
});

/// Topical keywords that raise complexity.
pub(crate) const TOPICAL_KEYWORDS: &[&str] = &[
    "budget", "cheap", "luxury", "romantic", "honeymoon", "family", "kids", "adventure",
    "relax", "food", "culture", "history", "nightlife", "museum", "beach", "hiking",
];

/// Constraint keywords that raise complexity.
pub(crate) const CONSTRAINT_KEYWORDS: &[&str] = &[
    "must", "avoid", "without", "only", "except", "need", "have to", "can't", "don't",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(input_type: InputType) -> &'static PatternRule {
        PRIORITY_TABLE
            .iter()
            .find(|r| r.input_type == input_type)
            .unwrap()
    }

    #[test]
    fn priority_order_is_question_modification_structured_conversational() {
        let order: Vec<_> = PRIORITY_TABLE.iter().map(|r| r.input_type).collect();
        assert_eq!(
            order,
            vec![
                InputType::Question,
                InputType::Modification,
                InputType::Structured,
                InputType::Conversational
            ]
        );
    }

    #[test]
    fn question_patterns() {
        let q = rule(InputType::Question);
        assert!(q.matches("what is there to do in rome"));
        assert!(q.matches("rome in may?"));
        assert!(!q.matches("may 5 to may 10 in rome"));
    }

    #[test]
    fn modification_patterns() {
        let m = rule(InputType::Modification);
        assert!(m.matches("add 2 days in florence"));
        assert!(m.matches("actually make it 4 days"));
        assert!(m.matches("let's do porto instead of lisbon"));
        assert!(!m.matches("3 days in london"));
    }

    #[test]
    fn structured_patterns() {
        let s = rule(InputType::Structured);
        assert!(s.matches("3 days in london"));
        assert!(s.matches("five nights in tokyo"));
        assert!(s.matches("from london to paris"));
        assert!(s.matches("plan a trip to japan"));
        assert!(s.matches("weekend in rome"));
        assert!(!s.matches("i want to go to paris for 5 days"));
    }

    #[test]
    fn conversational_patterns() {
        let c = rule(InputType::Conversational);
        assert!(c.matches("i want to go to paris for 5 days"));
        assert!(c.matches("thanks!"));
        assert!(c.matches("we're thinking about somewhere warm"));
        assert!(!c.matches("asdfghjkl qwerty"));
    }
}
