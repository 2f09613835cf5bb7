//! Filtering of column defaults the runtime would supply anyway.
//!
//! Non-nullable scalar columns are zero-initialized by the generated code, so
//! a default constraint that restates that zero value carries no information
//! and is dropped. Everything else is preserved verbatim.

/// Types whose implicit default is the literal `0`.
const ZERO_TYPES: &[&str] = &[
    "bigint",
    "bit",
    "decimal",
    "float",
    "int",
    "money",
    "numeric",
    "real",
    "smallint",
    "smallmoney",
    "tinyint",
];

/// Types whose implicit default is the literal `0.0`.
const ZERO_DECIMAL_TYPES: &[&str] = &["decimal", "float", "money", "numeric", "real", "smallmoney"];

/// Type-specific spellings of the implicit default.
const IMPLICIT_LITERALS: &[(&str, &[&str])] = &[
    ("CONVERT([real],(0))", &["real"]),
    ("0.0000000000000000e+000", &["float"]),
    ("'0001-01-01'", &["date"]),
    ("'1900-01-01T00:00:00.000'", &["datetime", "smalldatetime"]),
    ("'0001-01-01T00:00:00.000'", &["datetime2"]),
    ("'0001-01-01T00:00:00.000+00:00'", &["datetimeoffset"]),
    ("'00:00:00'", &["time"]),
    (
        "'00000000-0000-0000-0000-000000000000'",
        &["uniqueidentifier"],
    ),
];

/// Normalize a raw default expression.
///
/// Returns `None` when the default is empty, `NULL`, or restates the implicit
/// value of a non-nullable column of `system_type_name`.
pub fn filter_clr_default(
    system_type_name: Option<&str>,
    is_nullable: bool,
    raw_default: &str,
) -> Option<String> {
    let value = strip_parentheses(raw_default.trim());

    if value.is_empty() || value.eq_ignore_ascii_case("null") {
        return None;
    }
    if is_nullable {
        return Some(value.to_string());
    }

    if let Some(type_name) = system_type_name {
        if is_implicit_default(&type_name.to_ascii_lowercase(), value) {
            return None;
        }
    }

    Some(value.to_string())
}

fn is_implicit_default(type_name: &str, value: &str) -> bool {
    match value {
        "0" => ZERO_TYPES.contains(&type_name),
        "0.0" => ZERO_DECIMAL_TYPES.contains(&type_name),
        _ => IMPLICIT_LITERALS
            .iter()
            .any(|(literal, types)| literal.eq_ignore_ascii_case(value) && types.contains(&type_name)),
    }
}

/// Remove balanced outer parentheses, repeatedly: `((0))` -> `0`.
///
/// `(1) + (2)` is left alone because its first and last parentheses do not
/// pair with each other.
pub fn strip_parentheses(value: &str) -> &str {
    let mut value = value;
    while value.len() >= 2 && value.starts_with('(') && value.ends_with(')') && encloses(value) {
        value = value[1..value.len() - 1].trim();
    }
    value
}

/// Whether the opening parenthesis at the start closes at the very end.
fn encloses(value: &str) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    let last = value.len() - 1;

    for (i, c) in value.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == last;
                }
            }
            _ => {}
        }
    }
    false
}
