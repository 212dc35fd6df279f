//! Keyword classification and argument extraction.
//!
//! Everything here is a deterministic function over the query text. The
//! planner uses these heuristics when the model is unavailable and to pull
//! tool arguments (a city, a page title) out of the query in every case.

use crate::types::{PlanSource, QueryPlan};
use regex::Regex;
use std::sync::LazyLock;

/// Substrings that suggest the query is about current weather.
pub const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "temperature",
    "forecast",
    "rain",
    "snow",
    "cloud",
    "humid",
    "°c",
    "°f",
    "degrees",
];

/// Substrings that suggest the query wants an encyclopedic lookup.
pub const LOOKUP_KEYWORDS: &[&str] = &[
    "who",
    "what is",
    "when was",
    "history of",
    "invented",
    "discovered",
    "tell me about",
    "explain",
    "biography",
];

const KEYWORD_REASONING: &str = "Using keyword-based analysis due to API limitations";

const QUESTION_WORDS: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "which", "tell", "me", "about", "explain",
];

static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"weather in (.+?)(?:\?|$| today| now)",
        r"temperature in (.+?)(?:\?|$| today)",
        r"forecast for (.+?)(?:\?|$| today)",
        r"how.*weather.*in (.+?)(?:\?|$)",
        r"what.*weather.*in (.+?)(?:\?|$)",
        r"weather.*like.*in (.+?)(?:\?|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("location pattern is a valid regex"))
    .collect()
});

static LOCATION_FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:right now|today|now|like)\b").expect("filler pattern is a valid regex")
});

static SEARCH_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"who (?:is|was|invented|created|discovered) (.+)",
        r"what is (.+)",
        r"tell me about (.+)",
        r"explain (.+)",
        r"when was (.+)",
        r"history of (.+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("search pattern is a valid regex"))
    .collect()
});

pub fn needs_weather(query: &str) -> bool {
    let lower = query.to_lowercase();
    WEATHER_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn needs_wikipedia(query: &str) -> bool {
    let lower = query.to_lowercase();
    LOOKUP_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Classify a query with keywords alone. Arguments are not filled in.
pub fn keyword_plan(query: &str) -> QueryPlan {
    QueryPlan {
        needs_weather: needs_weather(query),
        needs_wikipedia: needs_wikipedia(query),
        reasoning: KEYWORD_REASONING.to_string(),
        source: PlanSource::Keyword,
        location: None,
        search_term: None,
    }
}

/// Pull a city name out of a weather question.
///
/// Tries the phrase patterns on the lowercased query first, then falls back
/// to a capitalised word following `in`, `at` or `for`.
pub fn extract_location(query: &str) -> Option<String> {
    let lower = query.to_lowercase();

    for pattern in LOCATION_PATTERNS.iter() {
        let Some(captured) = pattern.captures(&lower).and_then(|c| c.get(1)) else {
            continue;
        };

        let location = LOCATION_FILLER.replace_all(captured.as_str(), "");
        let location = collapse_whitespace(&location);
        if !location.is_empty() {
            return Some(title_case(&location));
        }
    }

    let words: Vec<&str> = query.split_whitespace().collect();
    words.windows(2).find_map(|pair| {
        let preposition = pair[0].to_lowercase();
        if !matches!(preposition.as_str(), "in" | "at" | "for") {
            return None;
        }
        let candidate = pair[1].trim_matches(|c| matches!(c, '?' | '.' | '!' | ',' | '"'));
        candidate
            .chars()
            .next()
            .filter(|c| c.is_uppercase())
            .map(|_| candidate.to_string())
    })
}

/// Pull a page title out of a factual question.
pub fn extract_search_term(query: &str) -> Option<String> {
    let clean = query
        .trim()
        .trim_matches(|c| matches!(c, '?' | '.' | '!'))
        .trim();
    if clean.is_empty() {
        return None;
    }

    let lower = clean.to_lowercase();
    for pattern in SEARCH_PATTERNS.iter() {
        if let Some(term) = pattern.captures(&lower).and_then(|c| c.get(1)) {
            let term = term.as_str().trim();
            if !term.is_empty() {
                return Some(title_case(term));
            }
        }
    }

    let words: Vec<&str> = clean.split_whitespace().collect();
    if words.len() > 2 {
        let main: Vec<&str> = words
            .iter()
            .copied()
            .filter(|w| !QUESTION_WORDS.contains(&w.to_lowercase().as_str()))
            .take(3)
            .collect();
        if !main.is_empty() {
            return Some(title_case(&main.join(" ")));
        }
    }

    Some(title_case(clean))
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }

    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
