//! Structural playbook validation.
//!
//! Validates a raw JSON document against the playbook shape and returns the
//! *complete* set of violations in one pass, so a caller can fix a document in
//! a single round trip. Referential completeness of `{{var}}` uses is
//! deliberately not checked here; an unresolved reference is a runtime
//! attempt failure, not a save-time error.

use serde_json::Value;

use crate::types::Playbook;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Dotted path into the document, e.g. "prompts[0].retries".
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Result of validating a playbook document.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Error diagnostics rendered as strings, for API payloads.
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(ToString::to_string)
            .collect()
    }
}

const TOP_LEVEL_KEYS: &[&str] = &["prompts", "vars", "params"];
const PROMPT_KEYS: &[&str] = &["text", "retries", "enabled"];
const PARAMS_KEYS: &[&str] = &["waitMin", "waitMax"];

/// Validate the structural shape of a raw playbook document.
#[must_use]
pub fn validate_value(value: &Value) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let Some(root) = value.as_object() else {
        diagnostics.push(Diagnostic::error("", "playbook must be a JSON object"));
        return ValidationResult { diagnostics };
    };

    for key in root.keys() {
        if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
            diagnostics.push(unknown_field(key, "", TOP_LEVEL_KEYS));
        }
    }

    if let Some(prompts) = root.get("prompts") {
        check_prompts(prompts, &mut diagnostics);
    }
    if let Some(vars) = root.get("vars") {
        check_vars(vars, &mut diagnostics);
    }
    if let Some(params) = root.get("params") {
        check_params(params, &mut diagnostics);
    }

    ValidationResult { diagnostics }
}

/// Validate a raw document and, when it is structurally sound, deserialize it
/// into a typed [`Playbook`] with defaults applied.
pub fn parse_playbook(value: Value) -> Result<Playbook, ValidationResult> {
    let mut result = validate_value(&value);
    if result.has_errors() {
        return Err(result);
    }
    match serde_json::from_value(value) {
        Ok(playbook) => Ok(playbook),
        Err(e) => {
            result
                .diagnostics
                .push(Diagnostic::error("", format!("deserialization failed: {e}")));
            Err(result)
        },
    }
}

fn check_prompts(prompts: &Value, diagnostics: &mut Vec<Diagnostic>) {
    let Some(entries) = prompts.as_array() else {
        diagnostics.push(Diagnostic::error("prompts", "must be an array"));
        return;
    };
    // An empty array is valid: zero enabled prompts is a runtime-idle
    // condition, not a malformed document.
    for (i, entry) in entries.iter().enumerate() {
        let path = format!("prompts[{i}]");
        let Some(obj) = entry.as_object() else {
            diagnostics.push(Diagnostic::error(path, "must be an object"));
            continue;
        };

        for key in obj.keys() {
            if !PROMPT_KEYS.contains(&key.as_str()) {
                diagnostics.push(unknown_field(key, &path, PROMPT_KEYS));
            }
        }

        match obj.get("text") {
            Some(Value::String(_)) => {},
            Some(_) => diagnostics.push(Diagnostic::error(format!("{path}.text"), "must be a string")),
            None => diagnostics.push(Diagnostic::error(format!("{path}.text"), "is required")),
        }

        if let Some(retries) = obj.get("retries") {
            match retries.as_i64() {
                Some(n) if n >= 0 => {},
                Some(n) => diagnostics.push(Diagnostic::error(
                    format!("{path}.retries"),
                    format!("must be a non-negative integer (got {n})"),
                )),
                None => diagnostics.push(Diagnostic::error(
                    format!("{path}.retries"),
                    "must be a non-negative integer",
                )),
            }
        }

        if let Some(enabled) = obj.get("enabled")
            && !enabled.is_boolean()
        {
            diagnostics.push(Diagnostic::error(format!("{path}.enabled"), "must be a boolean"));
        }
    }
}

fn check_vars(vars: &Value, diagnostics: &mut Vec<Diagnostic>) {
    let Some(map) = vars.as_object() else {
        diagnostics.push(Diagnostic::error("vars", "must be an object"));
        return;
    };
    for (name, pool) in map {
        let path = format!("vars.{name}");
        if name.is_empty() {
            diagnostics.push(Diagnostic::error("vars", "variable names must be non-empty"));
        } else if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            // The expander only recognizes [A-Za-z0-9_] identifiers, so this
            // pool could never be referenced.
            diagnostics.push(Diagnostic::warning(
                path.clone(),
                "name contains characters that {{...}} references cannot express",
            ));
        }

        let Some(values) = pool.as_array() else {
            diagnostics.push(Diagnostic::error(path, "must be an array of strings"));
            continue;
        };
        if values.is_empty() {
            diagnostics.push(Diagnostic::error(path, "must not be empty"));
            continue;
        }
        for (i, v) in values.iter().enumerate() {
            if !v.is_string() {
                diagnostics.push(Diagnostic::error(format!("{path}[{i}]"), "must be a string"));
            }
        }
    }
}

fn check_params(params: &Value, diagnostics: &mut Vec<Diagnostic>) {
    let Some(obj) = params.as_object() else {
        diagnostics.push(Diagnostic::error("params", "must be an object"));
        return;
    };

    for key in obj.keys() {
        if !PARAMS_KEYS.contains(&key.as_str()) {
            diagnostics.push(unknown_field(key, "params", PARAMS_KEYS));
        }
    }

    let wait_min = match obj.get("waitMin") {
        None => None,
        Some(v) => match v.as_f64() {
            Some(n) if n >= 0.0 => Some(n),
            Some(n) => {
                diagnostics.push(Diagnostic::error(
                    "params.waitMin",
                    format!("must be non-negative (got {n})"),
                ));
                None
            },
            None => {
                diagnostics.push(Diagnostic::error("params.waitMin", "must be a number"));
                None
            },
        },
    };

    let wait_max = match obj.get("waitMax") {
        None => None,
        Some(v) => {
            let n = v.as_f64();
            if n.is_none() {
                diagnostics.push(Diagnostic::error("params.waitMax", "must be a number"));
            }
            n
        },
    };

    if let (Some(min), Some(max)) = (wait_min, wait_max)
        && max < min
    {
        diagnostics.push(Diagnostic::error(
            "params.waitMax",
            format!("waitMax ({max}) must be greater than or equal to waitMin ({min})"),
        ));
    }
}

fn unknown_field(key: &str, prefix: &str, known: &[&str]) -> Diagnostic {
    let path = if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    };
    let message = match suggest(key, known) {
        Some(s) => format!("unknown field (did you mean \"{s}\"?)"),
        None => "unknown field".into(),
    };
    Diagnostic::warning(path, message)
}

// ── Did-you-mean suggestions ────────────────────────────────────────────────

/// Best candidate within edit distance 3, if any.
fn suggest<'a>(needle: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, levenshtein(needle, c)))
        .filter(|(_, d)| *d > 0 && *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c)
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }
    let b_len = b.chars().count();
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_len]
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn empty_prompts_array_is_valid() {
        let result = validate_value(&json!({ "prompts": [] }));
        assert!(!result.has_errors(), "got: {:?}", result.diagnostics);
    }

    #[test]
    fn non_object_root_is_an_error() {
        let result = validate_value(&json!([1, 2, 3]));
        assert!(result.has_errors());
    }

    #[test]
    fn negative_retries_rejected() {
        let result = validate_value(&json!({
            "prompts": [{ "text": "hi", "retries": -1 }]
        }));
        assert!(result.has_errors());
        assert!(
            result
                .error_messages()
                .iter()
                .any(|m| m.contains("prompts[0].retries"))
        );
    }

    #[test]
    fn wait_range_inversion_names_both_fields() {
        let result = validate_value(&json!({
            "params": { "waitMin": 10, "waitMax": 5 }
        }));
        assert!(result.has_errors());
        let messages = result.error_messages().join("; ");
        assert!(messages.contains("waitMax"), "got: {messages}");
        assert!(messages.contains("waitMin"), "got: {messages}");
    }

    #[test]
    fn all_violations_reported_in_one_pass() {
        let result = validate_value(&json!({
            "prompts": [
                { "retries": "three" },
                { "text": 42 }
            ],
            "vars": { "animal": [] },
            "params": { "waitMin": -1 }
        }));
        let errors = result.error_messages();
        // missing text, bad retries, non-string text, empty pool, negative min
        assert_eq!(errors.len(), 5, "got: {errors:?}");
    }

    #[test]
    fn missing_var_reference_is_not_checked() {
        // Referencing an undefined variable is a runtime failure by design.
        let result = validate_value(&json!({
            "prompts": [{ "text": "draw {{missing}}" }],
            "vars": {}
        }));
        assert!(!result.has_errors());
    }

    #[test]
    fn unknown_field_is_a_warning_with_suggestion() {
        let result = validate_value(&json!({ "promts": [] }));
        assert!(!result.has_errors());
        let d = &result.diagnostics[0];
        assert_eq!(d.severity, Severity::Warning);
        assert!(d.message.contains("prompts"), "got: {}", d.message);
    }

    #[test]
    fn odd_var_name_is_a_warning() {
        let result = validate_value(&json!({ "vars": { "my var": ["x"] } }));
        assert!(!result.has_errors());
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn non_string_pool_value_rejected() {
        let result = validate_value(&json!({ "vars": { "animal": ["cat", 3] } }));
        assert!(result.has_errors());
        assert!(
            result
                .error_messages()
                .iter()
                .any(|m| m.contains("vars.animal[1]"))
        );
    }

    #[test]
    fn parse_playbook_applies_defaults() {
        let playbook = parse_playbook(json!({
            "prompts": [{ "text": "hi" }]
        }))
        .unwrap();
        assert_eq!(playbook.prompts[0].retries, 3);
        assert_eq!(playbook.params.wait_min, 7.0);
    }

    #[test]
    fn parse_playbook_surfaces_all_errors() {
        let err = parse_playbook(json!({
            "prompts": [{ "text": 1 }],
            "params": { "waitMin": 3, "waitMax": 1 }
        }))
        .unwrap_err();
        assert_eq!(err.error_messages().len(), 2);
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("prompts", "prompts"), 0);
        assert_eq!(levenshtein("promts", "prompts"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
    }
}
