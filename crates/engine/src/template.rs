//! `{{var}}` template expansion against a variable pool.

use std::collections::{BTreeMap, HashMap};

use {rand::Rng, thiserror::Error};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    /// The identifier is absent from the pool map, or its pool is empty.
    #[error("unknown variable: {name}")]
    UnknownVariable { name: String },
}

/// Expand every `{{identifier}}` placeholder in `text`.
///
/// One value is drawn uniformly at random per distinct identifier; repeated
/// references within a single call reuse the drawn value, and the next call
/// re-randomizes. Anything that merely looks like a placeholder (`{{`, with
/// no well-formed identifier and closing braces) passes through unchanged.
pub fn expand(text: &str, vars: &BTreeMap<String, Vec<String>>) -> Result<String, ExpandError> {
    expand_with(text, vars, |pool| {
        pool[rand::rng().random_range(0..pool.len())].clone()
    })
}

/// Implementation with an injectable chooser, testable without randomness.
fn expand_with(
    text: &str,
    vars: &BTreeMap<String, Vec<String>>,
    mut choose: impl FnMut(&[String]) -> String,
) -> Result<String, ExpandError> {
    let mut out = String::with_capacity(text.len());
    // First resolution wins for the duration of this expansion.
    let mut chosen: HashMap<&str, String> = HashMap::new();

    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        match after.find("}}") {
            Some(end) if end > 0 && after[..end].chars().all(is_ident_char) => {
                let name = &after[..end];
                if let Some(value) = chosen.get(name) {
                    out.push_str(value);
                } else {
                    let pool = vars
                        .get(name)
                        .filter(|p| !p.is_empty())
                        .ok_or_else(|| ExpandError::UnknownVariable { name: name.into() })?;
                    let value = choose(pool);
                    out.push_str(&value);
                    chosen.insert(name, value);
                }
                rest = &after[end + 2..];
            },
            // Not a recognized placeholder — keep the braces literal.
            _ => {
                out.push_str("{{");
                rest = after;
            },
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(ToString::to_string).collect()))
            .collect()
    }

    #[test]
    fn text_without_placeholders_is_identity() {
        let pool = vars(&[("animal", &["cat"])]);
        assert_eq!(expand("a plain prompt", &pool).unwrap(), "a plain prompt");
    }

    #[test]
    fn repeated_placeholder_resolves_consistently() {
        let pool = vars(&[("x", &["red", "green", "blue"])]);
        for _ in 0..20 {
            let out = expand("{{x}} and {{x}} and {{x}}", &pool).unwrap();
            let parts: Vec<&str> = out.split(" and ").collect();
            assert_eq!(parts[0], parts[1]);
            assert_eq!(parts[1], parts[2]);
        }
    }

    #[test]
    fn distinct_placeholders_draw_independently() {
        let pool = vars(&[("a", &["1"]), ("b", &["2"])]);
        assert_eq!(expand("{{a}}-{{b}}", &pool).unwrap(), "1-2");
    }

    #[test]
    fn missing_variable_fails() {
        assert_eq!(
            expand("{{missing}}", &BTreeMap::new()),
            Err(ExpandError::UnknownVariable {
                name: "missing".into()
            })
        );
    }

    #[test]
    fn empty_pool_counts_as_unknown() {
        let pool = vars(&[("animal", &[])]);
        assert!(expand("{{animal}}", &pool).is_err());
    }

    #[test]
    fn stray_braces_pass_through() {
        let pool = vars(&[("b", &["B"])]);
        assert_eq!(expand("a {{ b", &pool).unwrap(), "a {{ b");
        assert_eq!(expand("{{}}", &pool).unwrap(), "{{}}");
        assert_eq!(expand("{{not closed", &pool).unwrap(), "{{not closed");
        assert_eq!(expand("{{no spaces}}", &pool).unwrap(), "{{no spaces}}");
    }

    #[test]
    fn malformed_open_before_real_placeholder() {
        let pool = vars(&[("b", &["B"])]);
        assert_eq!(expand("{{a{{b}}", &pool).unwrap(), "{{aB");
    }

    #[test]
    fn chooser_sees_each_pool_once() {
        let pool = vars(&[("x", &["only"])]);
        let mut calls = 0;
        let out = expand_with("{{x}} {{x}}", &pool, |p| {
            calls += 1;
            p[0].clone()
        })
        .unwrap();
        assert_eq!(out, "only only");
        assert_eq!(calls, 1);
    }

    #[test]
    fn draws_are_uniform_over_the_pool() {
        // With 200 draws over two values, both should show up.
        let pool = vars(&[("x", &["cat", "dog"])]);
        let mut seen_cat = false;
        let mut seen_dog = false;
        for _ in 0..200 {
            match expand("{{x}}", &pool).unwrap().as_str() {
                "cat" => seen_cat = true,
                "dog" => seen_dog = true,
                other => panic!("unexpected draw: {other}"),
            }
        }
        assert!(seen_cat && seen_dog);
    }
}
