//! Identifier sanitization for generated output.
//!
//! Section ids, project titles and section names end up in places with
//! strict character rules: HTML fragment anchors, npm package names and
//! JavaScript component names. User text can contain anything, so it is
//! reduced to a safe form here:
//!
//! - [`slugify`]: lowercase ASCII alphanumerics separated by single dashes
//!   (`"Our Team!"` → `"our-team"`), used for anchors and package names.
//! - [`component_name`]: PascalCase identifier that always starts with a
//!   letter (`"2024 results"` → `"Section2024Results"`), used for exported
//!   component files.

const MAX_SLUG_LEN: usize = 60;

/// Lowercase dash-separated slug.
///
/// - Non-alphanumeric ASCII characters become dashes
/// - Consecutive dashes collapse, leading/trailing dashes are stripped
/// - Truncated to `MAX_SLUG_LEN` characters, breaking at the last dash
///   before the limit
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_dash = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let trimmed = slug.trim_end_matches('-');

    if trimmed.len() <= MAX_SLUG_LEN {
        trimmed.to_string()
    } else {
        let truncated = &trimmed[..MAX_SLUG_LEN];
        match truncated.rfind('-') {
            Some(pos) => truncated[..pos].to_string(),
            None => truncated.to_string(),
        }
    }
}

/// PascalCase identifier for a generated component.
///
/// Words come from [`slugify`]. Names that would be empty or start with a
/// digit get a `Section` prefix so the result is a valid identifier.
pub fn component_name(name: &str) -> String {
    let pascal: String = slugify(name)
        .split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    match pascal.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => pascal,
        _ => format!("Section{pascal}"),
    }
}
