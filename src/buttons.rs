//! Call-to-action buttons.
//!
//! A site carries at most [`MAX_BUTTONS`] buttons, each one of three kinds:
//!
//! | Kind    | Target                             | Default label |
//! |---------|------------------------------------|---------------|
//! | `file`  | an uploaded file, embedded as data URI | Download  |
//! | `link`  | an external URL                    | Visit site    |
//! | `email` | an email address                   | Email us      |
//!
//! The kind-specific target lives inside [`ButtonAction`], so a button can
//! only ever carry the field matching its kind.
//!
//! ## Legacy settings
//!
//! Early versions had a single download button and a single contact button,
//! stored as loose settings fields (`uploadedFile`, `downloadButtonText`,
//! `contactButtonUrl`, `contactButtonText`). [`migrate`] turns those into
//! entries of the button list once and clears them; see its docs for the rules.

use crate::project::new_id;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Maximum number of buttons on a site.
pub const MAX_BUTTONS: usize = 3;

/// Label for migrated contact buttons without legacy text.
pub const LEGACY_CONTACT_LABEL: &str = "Contact Us";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ButtonError {
    #[error("A site can have at most {MAX_BUTTONS} buttons")]
    LimitReached,
}

/// The three button kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonKind {
    File,
    Link,
    Email,
}

impl ButtonKind {
    /// Label used when a button's own label is blank.
    pub fn default_label(self) -> &'static str {
        match self {
            ButtonKind::File => "Download",
            ButtonKind::Link => "Visit site",
            ButtonKind::Email => "Email us",
        }
    }
}

impl FromStr for ButtonKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(ButtonKind::File),
            "link" => Ok(ButtonKind::Link),
            "email" => Ok(ButtonKind::Email),
            other => Err(format!(
                "unknown button type '{other}' (expected file, link or email)"
            )),
        }
    }
}

impl fmt::Display for ButtonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ButtonKind::File => "file",
            ButtonKind::Link => "link",
            ButtonKind::Email => "email",
        })
    }
}

/// A file offered for download, embedded in the site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileAttachment {
    pub name: String,
    pub size: u64,
    #[serde(alias = "type")]
    pub mime_type: String,
    #[serde(alias = "data")]
    pub data_uri: String,
}

/// What a button does, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ButtonAction {
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<FileAttachment>,
    },
    Link {
        #[serde(default)]
        href: String,
    },
    Email {
        #[serde(default)]
        email: String,
    },
}

impl ButtonAction {
    /// An action of the given kind with its target not yet filled in.
    pub fn empty(kind: ButtonKind) -> Self {
        match kind {
            ButtonKind::File => ButtonAction::File { file: None },
            ButtonKind::Link => ButtonAction::Link {
                href: String::new(),
            },
            ButtonKind::Email => ButtonAction::Email {
                email: String::new(),
            },
        }
    }

    pub fn kind(&self) -> ButtonKind {
        match self {
            ButtonAction::File { .. } => ButtonKind::File,
            ButtonAction::Link { .. } => ButtonKind::Link,
            ButtonAction::Email { .. } => ButtonKind::Email,
        }
    }
}

/// A configured call-to-action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(flatten)]
    pub action: ButtonAction,
}

impl Button {
    /// A new button with the kind's default label and an empty target.
    pub fn new(kind: ButtonKind) -> Self {
        Self {
            id: new_id("button"),
            label: kind.default_label().to_string(),
            action: ButtonAction::empty(kind),
        }
    }

    pub fn kind(&self) -> ButtonKind {
        self.action.kind()
    }

    /// The label to display, falling back to the kind's default when blank.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            self.kind().default_label()
        } else {
            &self.label
        }
    }
}

/// A partial update for [`update_button`].
///
/// Target fields that don't match the button's kind are ignored. Setting
/// `kind` to a different kind replaces the target with an empty one first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ButtonPatch {
    pub kind: Option<ButtonKind>,
    pub label: Option<String>,
    pub href: Option<String>,
    pub email: Option<String>,
    pub file: Option<FileAttachment>,
}

// ============================================================================
// Operations
// ============================================================================

/// Append a button of the given kind. Returns the new button's id.
pub fn add_button(settings: &mut Settings, kind: ButtonKind) -> Result<String, ButtonError> {
    if settings.buttons.len() >= MAX_BUTTONS {
        return Err(ButtonError::LimitReached);
    }
    let button = Button::new(kind);
    let id = button.id.clone();
    settings.buttons.push(button);
    Ok(id)
}

/// Merge `patch` into the button with `id`. Returns false if no such button.
pub fn update_button(settings: &mut Settings, id: &str, patch: ButtonPatch) -> bool {
    let Some(button) = settings.buttons.iter_mut().find(|b| b.id == id) else {
        return false;
    };

    if let Some(kind) = patch.kind.filter(|&k| k != button.kind()) {
        button.action = ButtonAction::empty(kind);
    }
    if let Some(label) = patch.label {
        button.label = label;
    }
    match &mut button.action {
        ButtonAction::File { file } => {
            if patch.file.is_some() {
                *file = patch.file;
            }
        }
        ButtonAction::Link { href } => {
            if let Some(new_href) = patch.href {
                *href = new_href;
            }
        }
        ButtonAction::Email { email } => {
            if let Some(new_email) = patch.email {
                *email = new_email;
            }
        }
    }
    true
}

/// Remove the button with `id`. Returns false if no such button.
pub fn remove_button(settings: &mut Settings, id: &str) -> bool {
    let before = settings.buttons.len();
    settings.buttons.retain(|b| b.id != id);
    settings.buttons.len() != before
}

/// Move the button at `from` so it ends up at `to`. Out-of-range is a no-op.
pub fn reorder_buttons(settings: &mut Settings, from: usize, to: usize) -> bool {
    let len = settings.buttons.len();
    if from >= len || to >= len {
        return false;
    }
    let button = settings.buttons.remove(from);
    settings.buttons.insert(to, button);
    true
}

// ============================================================================
// Legacy migration
// ============================================================================

/// Whether a legacy contact value should become an email button.
fn looks_like_email(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.contains('@') && !lower.starts_with("http://") && !lower.starts_with("https://")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Convert legacy download/contact fields into the button list.
///
/// - If `buttons` is already populated, legacy fields are dropped and the
///   list is left alone.
/// - Otherwise a legacy uploaded file becomes a `file` button (label from
///   the legacy download text, else "Download"), followed by a legacy contact
///   URL as a `link` button, or an `email` button when the value contains `@`
///   and has no `http(s)://` prefix (label from the legacy contact text, else
///   "Contact Us").
/// - The result is capped at [`MAX_BUTTONS`] and all legacy fields are cleared.
///
/// Running it again on its own output changes nothing.
pub fn migrate(mut settings: Settings) -> Settings {
    let uploaded_file = settings.uploaded_file.take();
    let download_text = non_blank(settings.download_button_text.take());
    let contact_url = non_blank(settings.contact_button_url.take());
    let contact_text = non_blank(settings.contact_button_text.take());

    if !settings.buttons.is_empty() {
        debug!("buttons already configured, dropping legacy fields");
        return settings;
    }

    let mut buttons = Vec::new();
    if let Some(file) = uploaded_file {
        buttons.push(Button {
            id: new_id("button"),
            label: download_text.unwrap_or_else(|| ButtonKind::File.default_label().to_string()),
            action: ButtonAction::File { file: Some(file) },
        });
    }
    if let Some(url) = contact_url {
        let action = if looks_like_email(&url) {
            ButtonAction::Email { email: url }
        } else {
            ButtonAction::Link { href: url }
        };
        buttons.push(Button {
            id: new_id("button"),
            label: contact_text.unwrap_or_else(|| LEGACY_CONTACT_LABEL.to_string()),
            action,
        });
    }
    buttons.truncate(MAX_BUTTONS);

    if !buttons.is_empty() {
        info!(count = buttons.len(), "migrated legacy buttons");
    }
    settings.buttons = buttons;
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn legacy_file() -> FileAttachment {
        FileAttachment {
            name: "a.pdf".into(),
            size: 1024,
            mime_type: "application/pdf".into(),
            data_uri: "data:application/pdf;base64,JVBERi0=".into(),
        }
    }

    // =========================================================================
    // add / update / remove / reorder
    // =========================================================================

    #[test]
    fn add_button_assigns_default_label() {
        let mut settings = Settings::default();
        add_button(&mut settings, ButtonKind::File).unwrap();
        add_button(&mut settings, ButtonKind::Link).unwrap();
        add_button(&mut settings, ButtonKind::Email).unwrap();
        let labels: Vec<&str> = settings.buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Download", "Visit site", "Email us"]);
        assert_eq!(settings.buttons[1].action, ButtonAction::Link { href: String::new() });
    }

    #[test]
    fn fourth_button_rejected() {
        let mut settings = Settings::default();
        for _ in 0..MAX_BUTTONS {
            add_button(&mut settings, ButtonKind::Link).unwrap();
        }
        let before = settings.buttons.clone();
        assert_eq!(
            add_button(&mut settings, ButtonKind::Email),
            Err(ButtonError::LimitReached)
        );
        assert_eq!(settings.buttons, before);
    }

    #[test]
    fn update_button_merges_matching_fields() {
        let mut settings = Settings::default();
        let id = add_button(&mut settings, ButtonKind::Link).unwrap();
        let found = update_button(
            &mut settings,
            &id,
            ButtonPatch {
                label: Some("Docs".into()),
                href: Some("example.com/docs".into()),
                email: Some("ignored@example.com".into()),
                ..ButtonPatch::default()
            },
        );
        assert!(found);
        assert_eq!(settings.buttons[0].label, "Docs");
        assert_eq!(
            settings.buttons[0].action,
            ButtonAction::Link {
                href: "example.com/docs".into()
            }
        );
    }

    #[test]
    fn update_button_kind_change_resets_target() {
        let mut settings = Settings::default();
        let id = add_button(&mut settings, ButtonKind::Link).unwrap();
        update_button(
            &mut settings,
            &id,
            ButtonPatch {
                href: Some("example.com".into()),
                ..ButtonPatch::default()
            },
        );
        update_button(
            &mut settings,
            &id,
            ButtonPatch {
                kind: Some(ButtonKind::Email),
                email: Some("hi@example.com".into()),
                ..ButtonPatch::default()
            },
        );
        assert_eq!(
            settings.buttons[0].action,
            ButtonAction::Email {
                email: "hi@example.com".into()
            }
        );
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut settings = Settings::default();
        add_button(&mut settings, ButtonKind::Link).unwrap();
        let before = settings.buttons.clone();
        assert!(!update_button(&mut settings, "nope", ButtonPatch::default()));
        assert_eq!(settings.buttons, before);
    }

    #[test]
    fn remove_button_filters_by_id() {
        let mut settings = Settings::default();
        let a = add_button(&mut settings, ButtonKind::Link).unwrap();
        let b = add_button(&mut settings, ButtonKind::Email).unwrap();
        assert!(remove_button(&mut settings, &a));
        assert!(!remove_button(&mut settings, &a));
        assert_eq!(settings.buttons.len(), 1);
        assert_eq!(settings.buttons[0].id, b);
    }

    #[test]
    fn reorder_moves_to_target() {
        let mut settings = Settings::default();
        let a = add_button(&mut settings, ButtonKind::File).unwrap();
        let b = add_button(&mut settings, ButtonKind::Link).unwrap();
        let c = add_button(&mut settings, ButtonKind::Email).unwrap();
        assert!(reorder_buttons(&mut settings, 0, 2));
        let ids: Vec<&str> = settings.buttons.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec![b.as_str(), c.as_str(), a.as_str()]);
    }

    #[test]
    fn reorder_out_of_range_is_noop() {
        let mut settings = Settings::default();
        add_button(&mut settings, ButtonKind::File).unwrap();
        let before = settings.buttons.clone();
        assert!(!reorder_buttons(&mut settings, 0, 1));
        assert!(!reorder_buttons(&mut settings, 3, 0));
        assert_eq!(settings.buttons, before);
    }

    #[test]
    fn display_label_falls_back_per_kind() {
        let mut button = Button::new(ButtonKind::Email);
        button.label = "  ".into();
        assert_eq!(button.display_label(), "Email us");
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    #[test]
    fn button_serializes_flat_with_type_tag() {
        let button = Button {
            id: "b1".into(),
            label: "Write".into(),
            action: ButtonAction::Email {
                email: "a@b.c".into(),
            },
        };
        let json = serde_json::to_value(&button).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "b1", "label": "Write", "type": "email", "email": "a@b.c"})
        );
        let back: Button = serde_json::from_value(json).unwrap();
        assert_eq!(back, button);
    }

    #[test]
    fn legacy_file_shape_is_accepted() {
        let file: FileAttachment = serde_json::from_str(
            r#"{"name": "a.pdf", "size": 3, "type": "application/pdf", "data": "data:x"}"#,
        )
        .unwrap();
        assert_eq!(file.mime_type, "application/pdf");
        assert_eq!(file.data_uri, "data:x");
    }

    // =========================================================================
    // migrate
    // =========================================================================

    #[test]
    fn migrate_file_and_email_contact() {
        let settings = Settings {
            uploaded_file: Some(legacy_file()),
            contact_button_url: Some("foo@bar.com".into()),
            ..Settings::default()
        };
        let migrated = migrate(settings);

        assert_eq!(migrated.buttons.len(), 2);
        assert_eq!(migrated.buttons[0].label, "Download");
        assert_eq!(
            migrated.buttons[0].action,
            ButtonAction::File {
                file: Some(legacy_file())
            }
        );
        assert_eq!(migrated.buttons[1].label, "Contact Us");
        assert_eq!(
            migrated.buttons[1].action,
            ButtonAction::Email {
                email: "foo@bar.com".into()
            }
        );
        assert!(!migrated.has_legacy_fields());
    }

    #[test]
    fn migrate_url_with_at_sign_stays_link() {
        let settings = Settings {
            contact_button_url: Some("https://example.com/@team".into()),
            contact_button_text: Some("Team".into()),
            ..Settings::default()
        };
        let migrated = migrate(settings);
        assert_eq!(migrated.buttons.len(), 1);
        assert_eq!(migrated.buttons[0].label, "Team");
        assert_eq!(migrated.buttons[0].kind(), ButtonKind::Link);
    }

    #[test]
    fn migrate_uses_legacy_download_text() {
        let settings = Settings {
            uploaded_file: Some(legacy_file()),
            download_button_text: Some("Get the brochure".into()),
            ..Settings::default()
        };
        let migrated = migrate(settings);
        assert_eq!(migrated.buttons[0].label, "Get the brochure");
    }

    #[test]
    fn migrate_skips_when_buttons_present() {
        let mut settings = Settings::default();
        add_button(&mut settings, ButtonKind::Link).unwrap();
        let existing = settings.buttons.clone();
        settings.uploaded_file = Some(legacy_file());
        settings.contact_button_text = Some("stale".into());

        let migrated = migrate(settings);
        assert_eq!(migrated.buttons, existing);
        assert!(!migrated.has_legacy_fields());
    }

    #[test]
    fn migrate_twice_is_stable() {
        let settings = Settings {
            uploaded_file: Some(legacy_file()),
            contact_button_url: Some("example.com".into()),
            ..Settings::default()
        };
        let once = migrate(settings);
        let twice = migrate(once.clone());
        assert_eq!(once.buttons, twice.buttons);
        assert!(!once.has_legacy_fields());
        assert!(!twice.has_legacy_fields());
    }

    #[test]
    fn migrate_without_legacy_fields_yields_no_buttons() {
        let migrated = migrate(Settings::default());
        assert!(migrated.buttons.is_empty());
    }
}
