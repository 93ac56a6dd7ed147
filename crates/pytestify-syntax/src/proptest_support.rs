//! Property-based testing support with arbitrary generators.
//!
//! This module provides proptest strategies for generating mamba specs and
//! titles to test parser and naming invariants.

use proptest::prelude::*;

/// Generate a free-text title (letters, digits, punctuation and spaces).
pub fn arb_title() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 _'.!-]{0,30}"
}

/// Generate a simple statement line body.
fn arb_statement() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("pass".to_string()),
        "[a-z]{1,8}".prop_map(|name| format!("{name} = 1")),
        "[a-z]{1,8}".prop_map(|name| format!("assert {name}")),
        "[a-z]{1,8}".prop_map(|name| format!("self.{name} = 2")),
    ]
}

/// Generate one `with it(...)` example at `indent`.
fn arb_example(indent: usize) -> impl Strategy<Value = String> {
    (arb_title(), proptest::collection::vec(arb_statement(), 1..4)).prop_map(move |(title, body)| {
        let mut out = format!("{}with it('{}'):\n", " ".repeat(indent), title.replace('\'', ""));
        for statement in body {
            out.push_str(&format!("{}{statement}\n", " ".repeat(indent + 4)));
        }
        out
    })
}

/// Generate a spec with one top-level group, an optional setup, examples and
/// optionally a nested context.
pub fn arb_simple_spec() -> impl Strategy<Value = String> {
    (
        arb_title(),
        any::<bool>(),
        any::<bool>(),
        proptest::collection::vec(arb_example(4), 1..4),
        proptest::option::of((arb_title(), proptest::collection::vec(arb_example(8), 1..3))),
    )
        .prop_map(|(title, capturing, setup, examples, nested)| {
            let mut out = String::from("from mamba import description, context, it\n\n");
            let as_self = if capturing { " as self" } else { "" };
            out.push_str(&format!("with description('{}'){as_self}:\n", title.replace('\'', "")));
            if setup {
                out.push_str("    with before.each:\n        self.value = 1\n\n");
            }
            for example in examples {
                out.push_str(&example);
            }
            if let Some((title, examples)) = nested {
                out.push_str(&format!("    with context('{}'):\n", title.replace('\'', "")));
                for example in examples {
                    out.push_str(&example);
                }
            }
            out
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CodeChunk, Node};
    use crate::names::{class_name, example_name};
    use crate::span::Span;
    use crate::Parser;

    proptest! {
        /// Any generated spec should parse without error.
        #[test]
        fn parse_generated_specs(spec in arb_simple_spec()) {
            let result = Parser::parse(&spec);
            prop_assert!(result.is_ok(), "Failed to parse:\n{}\nError: {:?}", spec, result.err());
        }

        /// A generated spec has exactly one top-level group after the import line.
        #[test]
        fn one_top_level_group(spec in arb_simple_spec()) {
            if let Ok(root) = Parser::parse(&spec) {
                let groups = root.children.iter().filter(|n| matches!(n, Node::Group(_))).count();
                prop_assert_eq!(groups, 1);
            }
        }

        /// Arbitrary text never panics the parser.
        #[test]
        fn parse_never_panics(source in "[ a-z():'#\n]{0,200}") {
            let _ = Parser::parse(&source);
        }

        /// Generated names are valid Python identifiers with the pytest prefixes.
        #[test]
        fn names_are_identifiers(title in arb_title()) {
            let class = class_name(&title);
            let function = example_name(&title);
            prop_assert!(class.starts_with("Test"));
            prop_assert!(function.starts_with("test_"));
            prop_assert!(class.chars().all(|c| c.is_ascii_alphanumeric()), "{}", class);
            prop_assert!(function.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'), "{}", function);
        }

        /// Re-indenting twice is the same as re-indenting once to the final baseline.
        #[test]
        fn reindent_composes(
            lines in proptest::collection::vec("[a-z]{1,6}", 1..6),
            from in 0usize..8,
            via in 0usize..8,
            to in 0usize..8,
        ) {
            let text: String = lines.iter().map(|l| format!("{}{l}\n", " ".repeat(from))).collect();
            let chunk = CodeChunk::new(from, text, Span::dummy());
            prop_assert_eq!(chunk.reindent(via).reindent(to), chunk.reindent(to));
        }
    }
}
