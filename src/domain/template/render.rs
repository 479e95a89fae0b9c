//! Variable substitution over template content.
//!
//! Placeholders look like `{{name}}`: two opening braces, one or more
//! non-`}` characters, two closing braces. Whitespace inside the braces
//! is trimmed before lookup, so `{{name}}` and `{{ name }}` refer to the
//! same variable; replacement happens per occurrence, so both spellings
//! are substituted.

use serde_json::{Map, Value};

/// Result of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub content: String,
    /// Trimmed placeholder name -> supplied value, for every placeholder
    /// present in both the template and the variable map.
    pub used: Map<String, Value>,
    /// Trimmed placeholder names found in the template but absent from
    /// the map, deduplicated, in order of first appearance.
    pub missing: Vec<String>,
}

/// One placeholder occurrence. `start..end` spans the full `{{...}}`
/// token; `inner` is the text between the braces, untrimmed.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Occurrence<'a> {
    start: usize,
    end: usize,
    inner: &'a str,
}

/// Scan for placeholder occurrences.
///
/// Matches what the pattern `\{\{([^}]+)\}\}` would: after `{{`, a
/// non-empty run of non-`}` bytes must be immediately followed by `}}`.
/// A failed candidate resumes the scan one byte further, so text like
/// `{{a} {{b}}` still yields the later placeholder. All delimiters are
/// ASCII, which keeps byte positions on UTF-8 character boundaries.
fn scan(content: &str) -> Vec<Occurrence<'_>> {
    let bytes = content.as_bytes();
    let mut occurrences = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            let inner_start = i + 2;
            let mut j = inner_start;
            while j < bytes.len() && bytes[j] != b'}' {
                j += 1;
            }
            if j > inner_start && j + 1 < bytes.len() && bytes[j] == b'}' && bytes[j + 1] == b'}' {
                occurrences.push(Occurrence {
                    start: i,
                    end: j + 2,
                    inner: &content[inner_start..j],
                });
                i = j + 2;
                continue;
            }
        }
        i += 1;
    }

    occurrences
}

/// Render `content` against `variables`.
///
/// The output is rebuilt in a single left-to-right pass: a substituted
/// value is copied verbatim and never re-scanned, so values containing
/// `{{...}}` text do not expand further. Placeholders whose name is
/// missing from the map are left exactly as written.
pub fn render_content(content: &str, variables: &Map<String, Value>) -> Rendered {
    let occurrences = scan(content);

    let mut output = String::with_capacity(content.len());
    let mut used = Map::new();
    let mut missing: Vec<String> = Vec::new();
    let mut cursor = 0;

    for occurrence in &occurrences {
        output.push_str(&content[cursor..occurrence.start]);

        let name = occurrence.inner.trim();
        match variables.get(name) {
            Some(value) => {
                output.push_str(&value_to_string(value));
                if !used.contains_key(name) {
                    used.insert(name.to_string(), value.clone());
                }
            }
            None => {
                output.push_str(&content[occurrence.start..occurrence.end]);
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
            }
        }

        cursor = occurrence.end;
    }
    output.push_str(&content[cursor..]);

    Rendered {
        content: output,
        used,
        missing,
    }
}

/// String form of a variable value: strings as-is, numbers and booleans
/// via display, null as empty, arrays and objects as compact JSON.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => value.to_string(),
    }
}

/// Distinct trimmed placeholder names, in order of first appearance.
pub fn placeholder_names(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for occurrence in scan(content) {
        let name = occurrence.inner.trim();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_render_simple() {
        let result = render_content(
            "Hi {{name}}, welcome to {{company}}!",
            &vars(&[("name", json!("Ana")), ("company", json!("Acme"))]),
        );
        assert_eq!(result.content, "Hi Ana, welcome to Acme!");
        assert_eq!(result.used.len(), 2);
        assert_eq!(result.used["name"], json!("Ana"));
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_render_missing_left_verbatim() {
        let result = render_content(
            "Hi {{name}}, call {{contact_phone}}",
            &vars(&[("name", json!("Bo"))]),
        );
        assert_eq!(result.content, "Hi Bo, call {{contact_phone}}");
        assert_eq!(result.missing, vec!["contact_phone"]);
        assert_eq!(result.used.len(), 1);
    }

    #[test]
    fn test_no_partial_substitution() {
        // A missing variable leaves every one of its occurrences intact.
        let result = render_content("{{x}} and {{x}} again", &Map::new());
        assert_eq!(result.content, "{{x}} and {{x}} again");
        assert_eq!(result.missing, vec!["x"]);
    }

    #[test]
    fn test_repeated_placeholder_replaced_everywhere() {
        let result = render_content(
            "{{name}}, {{name}}, {{name}}",
            &vars(&[("name", json!("Kai"))]),
        );
        assert_eq!(result.content, "Kai, Kai, Kai");
        assert_eq!(result.used.len(), 1);
    }

    #[test]
    fn test_whitespace_variants_are_one_variable() {
        // {{ name }} and {{name}} trim to the same key and both occurrences
        // must be replaced.
        let result = render_content(
            "Hello {{name}} / {{ name }} / {{name }}",
            &vars(&[("name", json!("Ana"))]),
        );
        assert_eq!(result.content, "Hello Ana / Ana / Ana");
        assert_eq!(result.used.len(), 1);
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_whitespace_variant_missing_reported_once() {
        let result = render_content("{{name}} {{ name }}", &Map::new());
        assert_eq!(result.missing, vec!["name"]);
    }

    #[test]
    fn test_completeness() {
        // Every distinct placeholder lands in exactly one of used/missing.
        let result = render_content(
            "{{a}} {{b}} {{a}} {{c}}",
            &vars(&[("a", json!("1")), ("c", json!("3"))]),
        );
        let used_names: Vec<&String> = result.used.keys().collect();
        assert_eq!(used_names.len(), 2);
        assert_eq!(result.missing, vec!["b"]);
        for name in ["a", "b", "c"] {
            let in_used = result.used.contains_key(name);
            let in_missing = result.missing.iter().any(|m| m == name);
            assert!(in_used ^ in_missing, "{name} must be in exactly one set");
        }
    }

    #[test]
    fn test_idempotence() {
        let variables = vars(&[("name", json!("Ana")), ("count", json!(3))]);
        let content = "Hi {{name}}, {{count}} new items, {{missing}} left";
        let first = render_content(content, &variables);
        let second = render_content(content, &variables);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_recursive_expansion() {
        // A substituted value containing placeholder syntax stays verbatim.
        let result = render_content(
            "{{a}} {{b}}",
            &vars(&[("a", json!("{{b}}")), ("b", json!("beta"))]),
        );
        assert_eq!(result.content, "{{b}} beta");
    }

    #[test]
    fn test_value_conversions() {
        let result = render_content(
            "n={{n}} b={{b}} s={{s}} nil={{nil}} list={{list}}",
            &vars(&[
                ("n", json!(42)),
                ("b", json!(true)),
                ("s", json!("text")),
                ("nil", Value::Null),
                ("list", json!([1, 2])),
            ]),
        );
        assert_eq!(result.content, "n=42 b=true s=text nil= list=[1,2]");
    }

    #[test]
    fn test_empty_template_and_empty_variables() {
        let result = render_content("", &Map::new());
        assert_eq!(result.content, "");
        assert!(result.used.is_empty());
        assert!(result.missing.is_empty());

        let result = render_content("no placeholders here", &Map::new());
        assert_eq!(result.content, "no placeholders here");
    }

    #[test]
    fn test_unterminated_braces_not_matched() {
        let result = render_content("literal {{ without close", &vars(&[("x", json!("y"))]));
        assert_eq!(result.content, "literal {{ without close");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_empty_placeholder_not_matched() {
        let result = render_content("{{}} stays", &Map::new());
        assert_eq!(result.content, "{{}} stays");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_single_close_brace_aborts_candidate() {
        // `{{a}b}}` has a single `}` inside, which the pattern rejects;
        // a later well-formed placeholder still matches.
        let result = render_content("{{a}b}} {{c}}", &vars(&[("c", json!("ok"))]));
        assert_eq!(result.content, "{{a}b}} ok");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_nested_braces_first_close_wins() {
        // The inner text may itself contain `{` characters; the first `}}`
        // after `{{` terminates the match.
        let result = render_content("{{{{name}}}}", &vars(&[("{{name", json!("v"))]));
        assert_eq!(result.content, "v}}");
    }

    #[test]
    fn test_multibyte_content() {
        let result = render_content(
            "こんにちは {{name}} — 你好 {{名前}}",
            &vars(&[("name", json!("Ana")), ("名前", json!("アナ"))]),
        );
        assert_eq!(result.content, "こんにちは Ana — 你好 アナ");
    }

    #[test]
    fn test_placeholder_names_deduplicated() {
        let names = placeholder_names("{{a}} {{ b }} {{a}} {{b}}");
        assert_eq!(names, vec!["a", "b"]);

        assert!(placeholder_names("plain text").is_empty());
    }
}
