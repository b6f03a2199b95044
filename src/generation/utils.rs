//! Identifier and literal helpers for emitting Python
//!
//! Names from OpenAPI documents are free-form (`petId`, `X-Request-ID`,
//! `pet-data`); these helpers turn them into valid Python identifiers and
//! turn JSON default values into Python literals.

use serde_json::Value as JsonValue;

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Converts a string to snake_case.
///
/// # Examples
/// ```
/// use fastapi_codegen::generation::utils::to_snake_case;
///
/// assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
/// assert_eq!(to_snake_case("X-Request-ID"), "x_request_id");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for ch in s.chars() {
        if ch.is_uppercase() {
            if prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else if !result.is_empty() && !result.ends_with('_') {
            // any separator: '-', '_', ' ', '.', ...
            result.push('_');
            prev_is_lowercase = false;
        }
    }

    result.trim_matches('_').to_string()
}

/// Converts a string to PascalCase.
///
/// # Examples
/// ```
/// use fastapi_codegen::generation::utils::to_proper_case;
///
/// assert_eq!(to_proper_case("pet-data"), "PetData");
/// ```
pub fn to_proper_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

pub fn is_python_keyword(s: &str) -> bool {
    PYTHON_KEYWORDS.contains(&s)
}

/// `true` when `s` can be used verbatim as a Python name
pub fn is_python_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') && !is_python_keyword(s)
}

/// snake_case Python identifier for a parameter or field name
pub fn python_identifier(s: &str) -> String {
    let snake = to_snake_case(s);
    if snake.is_empty() {
        return "field".to_string();
    }
    if snake.starts_with(|ch: char| ch.is_ascii_digit()) {
        return format!("field_{snake}");
    }
    if is_python_keyword(&snake) {
        return format!("{snake}_");
    }
    snake
}

/// Class name for a schema name. Valid identifiers are kept as written.
pub fn class_name(s: &str) -> String {
    if is_python_identifier(s) {
        return s.to_string();
    }
    let proper = to_proper_case(s);
    if proper.is_empty() {
        "Model".to_string()
    } else if proper.starts_with(|ch: char| ch.is_ascii_digit()) {
        format!("Model{proper}")
    } else if is_python_keyword(&proper) {
        format!("{proper}_")
    } else {
        proper
    }
}

/// Single-quoted Python string literal
pub fn python_string(s: &str) -> String {
    let mut literal = String::with_capacity(s.len() + 2);
    literal.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '\'' => literal.push_str("\\'"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            other => literal.push(other),
        }
    }
    literal.push('\'');
    literal
}

/// Text that can sit between `"""` delimiters: backslashes are escaped,
/// embedded triple quotes are replaced and a trailing quote is padded
pub fn docstring_text(s: &str) -> String {
    let text = s.trim().replace('\\', "\\\\").replace("\"\"\"", "'''");
    if text.ends_with('"') {
        format!("{text} ")
    } else {
        text
    }
}

/// Python literal for a JSON value
pub fn python_literal(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "None".to_string(),
        JsonValue::Bool(true) => "True".to_string(),
        JsonValue::Bool(false) => "False".to_string(),
        JsonValue::Number(number) => number.to_string(),
        JsonValue::String(s) => python_string(s),
        JsonValue::Array(items) => format!(
            "[{}]",
            items.iter().map(python_literal).collect::<Vec<_>>().join(", ")
        ),
        JsonValue::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(key, value)| format!("{}: {}", python_string(key), python_literal(value)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
