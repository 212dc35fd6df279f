//! Keyword classification and argument extraction tables.

use rstest::rstest;
use sage::agents::extract::{
    extract_location, extract_search_term, keyword_plan, needs_weather, needs_wikipedia,
};
use sage::agents::reasoning::parse_response;
use sage::types::PlanSource;

#[rstest]
#[case("What's the weather in London?", true, false)]
#[case("Will it rain tomorrow", true, false)]
#[case("Is it humid in Singapore", true, false)]
#[case("Is it 30°C outside?", true, false)]
#[case("Who invented the telephone?", false, true)]
#[case("Tell me about the Roman Empire", false, true)]
#[case("history of jazz", false, true)]
#[case("Explain quantum entanglement", false, true)]
#[case("Write me a poem", false, false)]
#[case("What's 2 + 2?", false, false)]
fn test_keyword_classification(
    #[case] query: &str,
    #[case] weather: bool,
    #[case] wikipedia: bool,
) {
    assert_eq!(needs_weather(query), weather, "weather for {query:?}");
    assert_eq!(needs_wikipedia(query), wikipedia, "wikipedia for {query:?}");
}

#[test]
fn test_keyword_plan_is_deterministic() {
    let a = keyword_plan("Who discovered penicillin?");
    let b = keyword_plan("Who discovered penicillin?");

    assert_eq!(a.needs_wikipedia, b.needs_wikipedia);
    assert_eq!(a.needs_weather, b.needs_weather);
    assert_eq!(a.reasoning, b.reasoning);
    assert_eq!(a.source, PlanSource::Keyword);
}

#[rstest]
#[case("What is the weather in Paris?", Some("Paris"))]
#[case("weather in new york today", Some("New York"))]
#[case("Temperature in Tokyo?", Some("Tokyo"))]
#[case("forecast for san francisco", Some("San Francisco"))]
#[case("How is the weather looking in Berlin?", Some("Berlin"))]
#[case("What's the weather like in rome right now?", Some("Rome"))]
#[case("Is it snowing at Denver?", Some("Denver"))]
#[case("Is it snowing outside?", None)]
fn test_extract_location(#[case] query: &str, #[case] expected: Option<&str>) {
    assert_eq!(extract_location(query).as_deref(), expected);
}

#[rstest]
#[case("Who is Marie Curie?", "Marie Curie")]
#[case("Who invented the light bulb?", "The Light Bulb")]
#[case("What is photosynthesis?", "Photosynthesis")]
#[case("Tell me about the eiffel tower", "The Eiffel Tower")]
#[case("Explain general relativity.", "General Relativity")]
#[case("When was the printing press invented?", "The Printing Press Invented")]
#[case("history of the internet", "The Internet")]
#[case("Can you describe black holes in detail", "Can You Describe")]
#[case("Mount Everest", "Mount Everest")]
fn test_extract_search_term(#[case] query: &str, #[case] expected: &str) {
    assert_eq!(extract_search_term(query).as_deref(), Some(expected));
}

#[rstest]
#[case("REASONING: looked it up\nANSWER: 42", "looked it up", "42")]
#[case("reasoning: lower\nanswer: case", "lower", "case")]
#[case("Some thoughts.\nAnswer: done", "Some thoughts.", "done")]
fn test_parse_response_markers(
    #[case] raw: &str,
    #[case] reasoning: &str,
    #[case] answer: &str,
) {
    assert_eq!(
        parse_response(raw),
        (reasoning.to_string(), answer.to_string())
    );
}
