/// Replace `${ENV_VAR}` placeholders in config string values.
///
/// Unresolvable variables are left as-is so the error surfaces where the
/// value is used, not at load time.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

/// Implementation with an injectable lookup, testable without touching the
/// process environment.
fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            out.push(ch);
            continue;
        }
        chars.next(); // consume '{'
        let mut name = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == '}' {
                closed = true;
                break;
            }
            name.push(c);
        }
        match (closed && !name.is_empty()).then(|| lookup(&name)).flatten() {
            Some(value) => out.push_str(&value),
            None => {
                // Unresolved or malformed — emit the literal text back.
                out.push_str("${");
                out.push_str(&name);
                if closed {
                    out.push('}');
                }
            },
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_var() {
        let lookup = |name: &str| (name == "PL_HOST").then(|| "10.0.0.5".to_string());
        assert_eq!(
            substitute_env_with("http://${PL_HOST}:9222", lookup),
            "http://10.0.0.5:9222"
        );
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env_with("${PL_DOES_NOT_EXIST}", |_| None),
            "${PL_DOES_NOT_EXIST}"
        );
    }

    #[test]
    fn unterminated_placeholder_is_literal() {
        assert_eq!(substitute_env_with("${OOPS", |_| None), "${OOPS");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
