//! Site style settings.
//!
//! Handles the [`Settings`] object that sits next to the project: colors,
//! typography, header alignment, navigation layout, dark mode, buttons and
//! the analytics snippet. Settings persist as camelCase JSON alongside the
//! project and can also be loaded from a `settings.toml` overlay merged onto
//! the stock defaults.
//!
//! ## Settings Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! primaryColor = "#2563eb"   # Header background, button fill
//! secondaryColor = "#7c3aed" # Link and hover accents
//! titleSize = "40"           # Section heading size in px
//! contentSize = "16"         # Body text size in px
//! logoSize = "120"           # Logo height in px
//! fontStyle = "system"       # system | serif | mono
//! headerAlignment = "center" # left | center | right
//! layoutStyle = "single"     # single | sections | menu
//! darkMode = false
//! analyticsCode = ""         # Injected verbatim into exported <head>
//!
//! [[buttons]]                # Up to 3
//! type = "link"              # file | link | email
//! label = "Visit site"
//! href = "example.com"
//! ```
//!
//! Unknown keys in a `settings.toml` overlay are rejected to catch typos
//! early. Saved JSON records are read leniently: unknown keys are ignored.

use crate::buttons::{Button, FileAttachment, MAX_BUTTONS};
use crate::contrast::contrast_color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Settings validation error: {0}")]
    Validation(String),
}

/// Font family choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    System,
    Serif,
    Mono,
}

impl FontStyle {
    /// CSS `font-family` stack.
    pub fn font_family(self) -> &'static str {
        match self {
            FontStyle::System => {
                "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif"
            }
            FontStyle::Serif => "Georgia, 'Times New Roman', Times, serif",
            FontStyle::Mono => "ui-monospace, SFMono-Regular, Menlo, Consolas, monospace",
        }
    }
}

/// Horizontal alignment of the header section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderAlignment {
    Left,
    #[default]
    Center,
    Right,
}

impl HeaderAlignment {
    pub fn as_css(self) -> &'static str {
        match self {
            HeaderAlignment::Left => "left",
            HeaderAlignment::Center => "center",
            HeaderAlignment::Right => "right",
        }
    }
}

/// Navigation presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStyle {
    /// One scrolling page, no navigation, buttons in the footer.
    #[default]
    Single,
    /// Sticky bar with one link per section, buttons on the right.
    Sections,
    /// Hamburger trigger opening a dropdown of links and buttons.
    Menu,
}

macro_rules! lowercase_enum_str {
    ($ty:ty, $what:literal, [$($variant:ident => $name:literal),+]) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    other => Err(format!(
                        concat!("unknown ", $what, " '{}' (expected one of:", $(" ", $name,)+ ")"),
                        other
                    )),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $name,)+
                })
            }
        }
    };
}

lowercase_enum_str!(FontStyle, "font style", [System => "system", Serif => "serif", Mono => "mono"]);
lowercase_enum_str!(HeaderAlignment, "alignment", [Left => "left", Center => "center", Right => "right"]);
lowercase_enum_str!(LayoutStyle, "layout", [Single => "single", Sections => "sections", Menu => "menu"]);

/// Style settings for the generated site.
///
/// All fields have defaults; a settings file need only name what it
/// overrides. The four `Option` fields at the end are the legacy button
/// fields, present only on records written by old versions and cleared by
/// [`crate::buttons::migrate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub primary_color: String,
    pub secondary_color: String,
    /// Pixel sizes are kept as strings, the way the color picker and size
    /// inputs hand them over (`"40"`, `"16px"`).
    pub title_size: String,
    pub content_size: String,
    pub logo_size: String,
    pub font_style: FontStyle,
    pub header_alignment: HeaderAlignment,
    pub layout_style: LayoutStyle,
    pub dark_mode: bool,
    pub buttons: Vec<Button>,
    /// Raw snippet injected verbatim into exported documents.
    pub analytics_code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_file: Option<FileAttachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_button_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_button_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_button_text: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            primary_color: "#2563eb".to_string(),
            secondary_color: "#7c3aed".to_string(),
            title_size: "40".to_string(),
            content_size: "16".to_string(),
            logo_size: "120".to_string(),
            font_style: FontStyle::default(),
            header_alignment: HeaderAlignment::default(),
            layout_style: LayoutStyle::default(),
            dark_mode: false,
            buttons: Vec::new(),
            analytics_code: String::new(),
            uploaded_file: None,
            download_button_text: None,
            contact_button_url: None,
            contact_button_text: None,
        }
    }
}

impl Settings {
    /// Validate values are usable by the renderer.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (key, value) in [
            ("primaryColor", &self.primary_color),
            ("secondaryColor", &self.secondary_color),
        ] {
            if !is_hex_color(value) {
                return Err(SettingsError::Validation(format!(
                    "{key} must be a #rgb or #rrggbb color, got '{value}'"
                )));
            }
        }
        for (key, value) in [
            ("titleSize", &self.title_size),
            ("contentSize", &self.content_size),
            ("logoSize", &self.logo_size),
        ] {
            if parse_px(value).is_none() {
                return Err(SettingsError::Validation(format!(
                    "{key} must be a positive pixel size, got '{value}'"
                )));
            }
        }
        if self.buttons.len() > MAX_BUTTONS {
            return Err(SettingsError::Validation(format!(
                "at most {MAX_BUTTONS} buttons are allowed, found {}",
                self.buttons.len()
            )));
        }
        Ok(())
    }

    /// Whether any legacy single-button field is still set.
    pub fn has_legacy_fields(&self) -> bool {
        self.uploaded_file.is_some()
            || self.download_button_text.is_some()
            || self.contact_button_url.is_some()
            || self.contact_button_text.is_some()
    }
}

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse `"16"` or `"16px"` into a positive number of pixels.
pub fn parse_px(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite() && *n > 0.0)
}

/// Render a size setting as a CSS pixel length, falling back on garbage.
fn css_px(value: &str, fallback: f64) -> String {
    format!("{}px", parse_px(value).unwrap_or(fallback))
}

// =============================================================================
// Settings loading, merging, and validation
// =============================================================================

/// Convert settings to a `toml::Value::Table` to merge overrides onto.
pub fn settings_value(settings: &Settings) -> Result<toml::Value, SettingsError> {
    Ok(toml::Value::try_from(settings)?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so an overlay
///   `buttons` array replaces the whole list.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Every top-level key a settings overlay may name.
const SETTINGS_KEYS: &[&str] = &[
    "primaryColor",
    "secondaryColor",
    "titleSize",
    "contentSize",
    "logoSize",
    "fontStyle",
    "headerAlignment",
    "layoutStyle",
    "darkMode",
    "buttons",
    "analyticsCode",
    "uploadedFile",
    "downloadButtonText",
    "contactButtonUrl",
    "contactButtonText",
];

fn reject_unknown_keys(overlay: &toml::Value) -> Result<(), SettingsError> {
    let Some(table) = overlay.as_table() else {
        return Ok(());
    };
    match table.keys().find(|key| !SETTINGS_KEYS.contains(&key.as_str())) {
        Some(key) => Err(SettingsError::Validation(format!("unknown field '{key}'"))),
        None => Ok(()),
    }
}

/// Merge a TOML overlay onto `base`, then deserialize and validate.
pub fn apply_overlay(base: &Settings, overlay: toml::Value) -> Result<Settings, SettingsError> {
    reject_unknown_keys(&overlay)?;
    let merged = merge_toml(settings_value(base)?, overlay);
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load a `settings.toml` file and apply it on top of `base`.
pub fn load_settings_file(base: &Settings, path: &Path) -> Result<Settings, SettingsError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    apply_overlay(base, overlay)
}

/// Returns a fully-commented stock `settings.toml` with all keys and explanations.
///
/// Used by the `gen-settings` CLI command.
pub fn stock_settings_toml() -> &'static str {
    r##"# docsite settings
# ================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Apply with: docsite settings --file settings.toml
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
# Header background and button fill. Text on top of it is picked
# automatically (dark or light) for contrast.
primaryColor = "#2563eb"

# Link and hover accents.
secondaryColor = "#7c3aed"

# ---------------------------------------------------------------------------
# Typography (pixel sizes; "16" and "16px" are both accepted)
# ---------------------------------------------------------------------------
titleSize = "40"
contentSize = "16"
logoSize = "120"

# system | serif | mono
fontStyle = "system"

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
# left | center | right
headerAlignment = "center"

# single   - one scrolling page, buttons in the footer
# sections - sticky navigation bar with a link per section
# menu     - hamburger button opening a dropdown
layoutStyle = "single"

darkMode = false

# ---------------------------------------------------------------------------
# Analytics
# ---------------------------------------------------------------------------
# Inserted verbatim into the <head> of exported pages.
analyticsCode = ""

# ---------------------------------------------------------------------------
# Buttons (at most 3)
# ---------------------------------------------------------------------------
buttons = []
# [[buttons]]
# id = "button-1"
# type = "link"        # file | link | email
# label = "Visit site"
# href = "example.com"
"##
}

/// Generate CSS custom properties from settings.
///
/// Text colors over the primary color are computed with
/// [`contrast_color`] so any picked color stays readable.
pub fn generate_theme_css(settings: &Settings) -> String {
    let (bg, text, muted, surface, border) = if settings.dark_mode {
        ("#0f172a", "#e2e8f0", "#94a3b8", "#1e293b", "#334155")
    } else {
        ("#ffffff", "#111827", "#6b7280", "#f8fafc", "#e5e7eb")
    };
    format!(
        r#":root {{
    --color-primary: {primary};
    --color-on-primary: {on_primary};
    --color-secondary: {secondary};
    --color-on-secondary: {on_secondary};
    --color-bg: {bg};
    --color-text: {text};
    --color-text-muted: {muted};
    --color-surface: {surface};
    --color-border: {border};
    --font-family: {font};
    --title-size: {title_size};
    --content-size: {content_size};
    --logo-size: {logo_size};
    --header-align: {align};
}}"#,
        primary = settings.primary_color,
        on_primary = contrast_color(&settings.primary_color),
        secondary = settings.secondary_color,
        on_secondary = contrast_color(&settings.secondary_color),
        font = settings.font_style.font_family(),
        title_size = css_px(&settings.title_size, 40.0),
        content_size = css_px(&settings.content_size, 16.0),
        logo_size = css_px(&settings.logo_size, 120.0),
        align = settings.header_alignment.as_css(),
    )
}
