use std::sync::OnceLock;

use regex::Regex;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `{{ env.VAR }}` with an optional `| default("fallback")` clause
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*env\.([A-Za-z0-9_]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
            .expect("must be valid regex")
    })
}

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// Runs before deserialization so config structs hold plain
/// String/SecretString values. A missing variable is an error unless the
/// placeholder carries a `default("...")` clause. TOML comment lines are
/// passed through untouched.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut output = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut last_end = 0;
        for captures in placeholder_re().captures_iter(line) {
            let whole = captures.get(0).expect("capture 0 always present");
            let var_name = &captures[1];
            let fallback = captures.get(2).map(|m| m.as_str());

            output.push_str(&line[last_end..whole.start()]);

            match std::env::var(var_name) {
                Ok(value) => output.push_str(&value),
                Err(_) => match fallback {
                    Some(default) => output.push_str(default),
                    None => return Err(format!("environment variable not found: `{var_name}`")),
                },
            }

            last_end = whole.end();
        }
        output.push_str(&line[last_end..]);
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_without_placeholders() {
        let input = "key = \"value\"";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_set_variable() {
        temp_env::with_var("SB_TEST_VAR", Some("hello"), || {
            let result = expand_env("key = \"{{ env.SB_TEST_VAR }}\"").unwrap();
            assert_eq!(result, "key = \"hello\"");
        });
    }

    #[test]
    fn missing_variable_errors() {
        temp_env::with_var_unset("SB_MISSING", || {
            let err = expand_env("key = \"{{ env.SB_MISSING }}\"").unwrap_err();
            assert!(err.contains("SB_MISSING"));
        });
    }

    #[test]
    fn missing_variable_uses_default() {
        temp_env::with_var_unset("SB_MISSING", || {
            let result = expand_env("key = \"{{ env.SB_MISSING | default(\"fallback\") }}\"").unwrap();
            assert_eq!(result, "key = \"fallback\"");
        });
    }

    #[test]
    fn set_variable_wins_over_default() {
        temp_env::with_var("SB_SET", Some("actual"), || {
            let result = expand_env("key = \"{{ env.SB_SET | default(\"fallback\") }}\"").unwrap();
            assert_eq!(result, "key = \"actual\"");
        });
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("SB_MISSING", || {
            let input = "# key = \"{{ env.SB_MISSING }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
