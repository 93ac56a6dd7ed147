//! Naming conventions of the generated pytest code.
//!
//! Mamba titles are free text; pytest needs `TestCamelCase` classes and
//! `test_snake_case` functions.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix pytest uses to collect test classes.
pub const CLASS_PREFIX: &str = "Test";

/// Prefix pytest uses to collect test functions.
pub const FUNCTION_PREFIX: &str = "test_";

static WORD_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());
static ACRONYM_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap());
static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").unwrap());

/// Class name for a group title: `"simple thing1 2"` becomes `TestSimpleThing12`.
#[must_use]
pub fn class_name(title: &str) -> String {
    let mut name = String::from(CLASS_PREFIX);
    for word in WORD_SEPARATOR.split(title) {
        name.push_str(&capitalize(word));
    }
    name
}

/// Function name for an example title: `"CamelCase Space"` becomes
/// `test_camel_case_space`.
#[must_use]
pub fn example_name(title: &str) -> String {
    let words: Vec<String> = WORD_SEPARATOR.split(title).map(snake_case).collect();
    format!("{FUNCTION_PREFIX}{}", words.join("_").trim_end_matches('_'))
}

/// Name of an example folded into its enclosing group.
///
/// `prefixed_example_name("TestA", "test_b")` is `test_a_b`.
#[must_use]
pub fn prefixed_example_name(class_name: &str, example_name: &str) -> String {
    let rest = example_name
        .strip_prefix(FUNCTION_PREFIX)
        .unwrap_or(example_name);
    format!("{}_{rest}", snake_case(class_name))
}

/// Snake case of a single CamelCase word: `HTTPServer` becomes `http_server`.
#[must_use]
pub fn snake_case(word: &str) -> String {
    let word = ACRONYM_BOUNDARY.replace_all(word, "${1}_${2}");
    let word = CAMEL_BOUNDARY.replace_all(&word, "${1}_${2}");
    word.replace('-', "_").to_lowercase()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("simple thing1 2"), "TestSimpleThing12");
        assert_eq!(class_name("snake_case space"), "TestSnakeCaseSpace");
        assert_eq!(class_name("CamelCase Space"), "TestCamelCaseSpace");
        assert_eq!(class_name("A"), "TestA");
    }

    #[test]
    fn test_class_name_keeps_inner_capitals() {
        assert_eq!(class_name("the HTTPServer"), "TestTheHTTPServer");
    }

    #[test]
    fn test_example_name() {
        assert_eq!(example_name("simple thing1 2"), "test_simple_thing1_2");
        assert_eq!(example_name("snake_case space"), "test_snake_case_space");
        assert_eq!(example_name("CamelCase Space"), "test_camel_case_space");
        assert_eq!(example_name("b"), "test_b");
    }

    #[test]
    fn test_example_name_strips_trailing_punctuation() {
        assert_eq!(example_name("I'm a method..."), "test_i_m_a_method");
        assert_eq!(example_name("works!"), "test_works");
    }

    #[test]
    fn test_snake_case_acronyms() {
        assert_eq!(snake_case("HTTPServer"), "http_server");
        assert_eq!(snake_case("TestSomeThing"), "test_some_thing");
        assert_eq!(snake_case("kebab-case"), "kebab_case");
    }

    #[test]
    fn test_prefixed_example_name() {
        assert_eq!(prefixed_example_name("TestA", "test_b"), "test_a_b");
        assert_eq!(
            prefixed_example_name("TestWhenEmpty", "test_returns_none"),
            "test_when_empty_returns_none"
        );
    }
}
