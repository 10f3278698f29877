//! Identifier cleanup applied once at load time.
//!
//! Source exports pad ids with leading zeros and sometimes carry an `SC000`
//! prefix on component codes. Component codes (breakdown `CU` and `CHILD CU`)
//! lose both; stock codes (breakdown `STOCK CODE`, primary `Stock Code1`) lose
//! only the zeros. Backup catalog ids are kept as exported.

/// Literal prefix stripped (case-insensitively) from component identifiers.
pub const COMPONENT_PREFIX: &str = "SC000";

/// Strip leading `'0'` characters. An all-zero id becomes the empty string.
pub fn strip_leading_zeros(id: &str) -> &str {
    id.trim_start_matches('0')
}

/// Strip the `SC000` prefix if the id starts with it, ignoring case.
pub fn strip_component_prefix(id: &str) -> &str {
    match id.get(..COMPONENT_PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(COMPONENT_PREFIX) => &id[COMPONENT_PREFIX.len()..],
        _ => id,
    }
}

/// Full normalization: leading zeros, then the prefix, repeated until the value
/// stops changing. Returns `None` when nothing is left (absent identifier).
pub fn normalize_id(raw: &str) -> Option<String> {
    let mut current = raw.trim();
    loop {
        let next = strip_component_prefix(strip_leading_zeros(current));
        if next.len() == current.len() {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        None
    } else {
        Some(current.to_string())
    }
}

/// Normalization for component-code cells that may be empty (null) in the source.
pub fn normalize_cell(cell: Option<&str>) -> Option<String> {
    cell.and_then(normalize_id)
}

/// Stock codes: leading zeros only, the prefix is part of the code.
/// `None` when nothing is left.
pub fn normalize_stock_code(raw: &str) -> Option<String> {
    let stripped = strip_leading_zeros(raw.trim());
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

pub fn stock_code_cell(cell: Option<&str>) -> Option<String> {
    cell.and_then(normalize_stock_code)
}
