//! `{variable}` substitution for agent command templates.
//!
//! - `{name}` substitutes variable `name` (surrounding whitespace is trimmed)
//! - `{{` and `}}` render literal braces
//!
//! Undefined variables are an error rather than an empty substitution, so a
//! typo in `agents.yaml` fails loudly instead of running a wrong command.

use std::collections::HashMap;
use std::fmt;

/// Template rendering failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    UndefinedVariable { name: String, position: usize },
    UnmatchedBrace { position: usize },
    EmptyVariableName { position: usize },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::UndefinedVariable { name, position } => {
                write!(f, "undefined variable '{}' at position {}", name, position)
            }
            TemplateError::UnmatchedBrace { position } => {
                write!(f, "unmatched '{{' at position {}", position)
            }
            TemplateError::EmptyVariableName { position } => {
                write!(f, "empty variable name at position {}", position)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Render `template`, substituting `{name}` placeholders from `variables`.
pub fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(TemplateError::UnmatchedBrace { position: pos });
                }

                let name = name.trim();
                if name.is_empty() {
                    return Err(TemplateError::EmptyVariableName { position: pos });
                }
                let value = variables
                    .get(name)
                    .ok_or_else(|| TemplateError::UndefinedVariable {
                        name: name.to_string(),
                        position: pos,
                    })?;
                out.push_str(value);
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            _ => out.push(ch),
        }
    }

    Ok(out)
}
