//! `{variable}` substitution for command templates.
//!
//! - `{name}` substitutes the value of variable `name`
//! - `{{` and `}}` render literal braces
//!
//! Undefined variables are an error rather than an empty substitution, so a
//! typo in a configured command never silently drops an argument.

use std::collections::HashMap;
use std::fmt;

/// Error type for template rendering failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A variable was referenced but not provided.
    UndefinedVariable { name: String, position: usize },
    /// A `{` was found without a matching `}`.
    UnmatchedBrace { position: usize },
    /// An empty variable name was found (e.g., `{}`).
    EmptyVariableName { position: usize },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UndefinedVariable { name, position } => write!(
                f,
                "undefined variable '{}' at position {} in template",
                name, position
            ),
            TemplateError::UnmatchedBrace { position } => {
                write!(f, "unmatched '{{' at position {} in template", position)
            }
            TemplateError::EmptyVariableName { position } => write!(
                f,
                "empty variable name '{{}}' at position {} in template",
                position
            ),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Render a template string by substituting variables.
///
/// ```
/// use utask::template::{render_template, vars};
///
/// let vars = vars([("module", "fuzz_task"), ("input_url", "gs://b/in.json")]);
/// let cmd = render_template("submit {module} {input_url}", &vars).unwrap();
/// assert_eq!(cmd, "submit fuzz_task gs://b/in.json");
/// ```
pub fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut result = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                result.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, c)) => name.push(c),
                        None => return Err(TemplateError::UnmatchedBrace { position: pos }),
                    }
                }

                let name = name.trim();
                if name.is_empty() {
                    return Err(TemplateError::EmptyVariableName { position: pos });
                }

                let value =
                    variables
                        .get(name)
                        .ok_or_else(|| TemplateError::UndefinedVariable {
                            name: name.to_string(),
                            position: pos,
                        })?;
                result.push_str(value);
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                }
                result.push('}');
            }
            _ => result.push(ch),
        }
    }

    Ok(result)
}

/// Build a variables map from key-value pairs.
pub fn vars<I, K, V>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
