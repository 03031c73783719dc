//! The website project: an ordered list of sections holding content blocks.
//!
//! A [`Project`] is what the editor manipulates and what the render pipeline
//! reads. Its central invariant is the **header rule**: exactly one section is
//! flagged `is_header`, and it sits at index 0. The header is the site's
//! hero/title area; it is shown without a name or icon and never appears as a
//! labelled navigation entry.
//!
//! Rather than rejecting states that break the rule, the model heals them.
//! [`ensure_header_exists`] runs after load, import, blank-project creation
//! and every mutation (see [`crate::app::AppContext::update_project`]):
//!
//! ```text
//! no header          → synthesize one at index 0 from the project title
//! several headers    → keep the first, demote the rest
//! header not at 0    → splice it back to the front
//! ```
//!
//! ## Persisted shape
//!
//! Projects serialize to camelCase JSON:
//!
//! ```text
//! { "title": "...", "logoUrl": "data:...",
//!   "sections": [ { "id", "name", "icon", "isHeader", "showIcon", "collapsed",
//!                   "content": [ { "type": "text", "id", "value", "allowHtml" },
//!                                { "type": "image", "id", "url", "caption" } ] } ] }
//! ```
//!
//! Older records lack `showIcon`; it is kept as `None` on load and filled in
//! with `true` by [`apply_icon_defaults`]. Readers go through
//! [`Section::shows_icon`], which treats `None` as `true`, so rendering a legacy
//! project never depends on the fill-in having run.

use crate::import::ImportedDocument;
use maud::html;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// Icon given to sections created without one.
pub const DEFAULT_ICON: &str = "📄";

/// Icon stored on synthesized header sections (never rendered).
pub const HEADER_ICON: &str = "🏠";

/// Header heading text when the project has no title.
pub const FALLBACK_HEADER_TITLE: &str = "Header";

/// Name given to sections created by "add section".
pub const NEW_SECTION_NAME: &str = "New Section";

/// Title of a freshly created blank project.
pub const BLANK_PROJECT_TITLE: &str = "My Website";

/// Placeholder markup for new text blocks.
pub const PLACEHOLDER_TEXT: &str = "<p>Click to edit this text.</p>";

/// Generate a fresh opaque id with a readable prefix (`section-…`, `block-…`).
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

fn new_section_id() -> String {
    new_id("section")
}

fn new_block_id() -> String {
    new_id("block")
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

/// A website project being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    /// Logo as a data URI, shown in the header section.
    #[serde(default, alias = "logoImage", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub sections: Vec<Section>,
}

/// A named region of the generated site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default = "new_section_id")]
    pub id: String,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub is_header: bool,
    /// `None` only for legacy records; see [`Section::shows_icon`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_icon: Option<bool>,
    /// Editor-only fold state; has no effect on rendering.
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// An atomic unit of section content, rendered in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ContentBlock {
    Text {
        #[serde(default = "new_block_id")]
        id: String,
        #[serde(default)]
        value: String,
        /// Whether `value` is trusted markup (header rendering only).
        #[serde(default)]
        allow_html: bool,
    },
    Image {
        #[serde(default = "new_block_id")]
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        /// Editor-produced rich text, rendered as markup.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

impl ContentBlock {
    /// A text block with the given markup.
    pub fn text(value: impl Into<String>, allow_html: bool) -> Self {
        ContentBlock::Text {
            id: new_block_id(),
            value: value.into(),
            allow_html,
        }
    }

    /// A text block holding the editor's placeholder paragraph.
    pub fn placeholder_text() -> Self {
        Self::text(PLACEHOLDER_TEXT, false)
    }

    /// An image block; both fields may be filled in later.
    pub fn image(url: Option<String>, caption: Option<String>) -> Self {
        ContentBlock::Image {
            id: new_block_id(),
            url,
            caption,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ContentBlock::Text { id, .. } | ContentBlock::Image { id, .. } => id,
        }
    }
}

impl Section {
    /// A regular (non-header) section.
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            id: new_section_id(),
            name: name.into(),
            icon: icon.into(),
            is_header: false,
            show_icon: Some(true),
            collapsed: false,
            content: Vec::new(),
        }
    }

    /// A header section whose only content is the title as a level-1 heading.
    pub fn header(title: &str) -> Self {
        let heading = if title.trim().is_empty() {
            FALLBACK_HEADER_TITLE
        } else {
            title
        };
        let markup = html! { h1 { (heading) } }.into_string();
        Self {
            id: new_section_id(),
            name: FALLBACK_HEADER_TITLE.to_string(),
            icon: HEADER_ICON.to_string(),
            is_header: true,
            show_icon: Some(false),
            collapsed: false,
            content: vec![ContentBlock::text(markup, true)],
        }
    }

    /// Builder-style content append.
    pub fn with_content(mut self, content: Vec<ContentBlock>) -> Self {
        self.content = content;
        self
    }

    /// Whether the icon is shown next to the name. Missing means shown.
    pub fn shows_icon(&self) -> bool {
        self.show_icon.unwrap_or(true)
    }
}

impl Project {
    /// A new blank project: the header plus one "Content" section.
    pub fn blank() -> Self {
        Self::titled(BLANK_PROJECT_TITLE)
    }

    /// A blank project with the given title in its header.
    pub fn titled(title: &str) -> Self {
        let mut project = Self {
            title: title.to_string(),
            logo_url: None,
            sections: vec![
                Section::header(title),
                Section::new("Content", DEFAULT_ICON)
                    .with_content(vec![ContentBlock::placeholder_text()]),
            ],
        };
        normalize(&mut project);
        project
    }

    /// Adopt the output of a document import.
    ///
    /// The importer's intro blocks follow the title heading in the header;
    /// each imported section gets a fresh id and visible icon.
    pub fn from_import(doc: ImportedDocument) -> Self {
        let mut header = Section::header(&doc.title);
        header.content.extend(doc.intro);

        let mut sections = vec![header];
        sections.extend(doc.sections.into_iter().map(|imported| {
            let icon = if imported.icon.trim().is_empty() {
                DEFAULT_ICON.to_string()
            } else {
                imported.icon
            };
            Section::new(imported.name, icon).with_content(imported.content)
        }));

        let mut project = Self {
            title: doc.title,
            logo_url: None,
            sections,
        };
        normalize(&mut project);
        project
    }

    /// The header section. Only meaningful on a normalized project.
    pub fn header(&self) -> Option<&Section> {
        self.sections.first().filter(|s| s.is_header)
    }

    /// Number of sections flagged as header.
    pub fn header_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_header).count()
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// What a normalization pass had to fix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderRepair {
    /// A header section was created because none existed.
    pub synthesized: bool,
    /// Number of extra header flags cleared.
    pub demoted: usize,
    /// Former index of a header that was moved to the front.
    pub moved_from: Option<usize>,
}

impl HeaderRepair {
    /// True when the project already satisfied the header rule.
    pub fn is_clean(&self) -> bool {
        !self.synthesized && self.demoted == 0 && self.moved_from.is_none()
    }
}

/// Guarantee exactly one header section, at index 0. Idempotent.
pub fn ensure_header_exists(project: &mut Project) -> HeaderRepair {
    if project.sections.iter().any(|s| s.is_header) {
        return enforce_header_position(project);
    }

    warn!(title = %project.title, "project has no header section, synthesizing one");
    project.sections.insert(0, Section::header(&project.title));
    HeaderRepair {
        synthesized: true,
        ..HeaderRepair::default()
    }
}

/// Move the first header to index 0 and demote any later header flags.
///
/// Does nothing when no section is flagged; [`ensure_header_exists`] covers
/// that case.
pub fn enforce_header_position(project: &mut Project) -> HeaderRepair {
    let mut repair = HeaderRepair::default();
    let Some(first) = project.sections.iter().position(|s| s.is_header) else {
        return repair;
    };

    for section in project.sections.iter_mut().skip(first + 1) {
        if section.is_header {
            section.is_header = false;
            repair.demoted += 1;
        }
    }

    if first != 0 {
        let header = project.sections.remove(first);
        project.sections.insert(0, header);
        repair.moved_from = Some(first);
    }

    if !repair.is_clean() {
        warn!(
            demoted = repair.demoted,
            moved_from = ?repair.moved_from,
            "repaired header placement"
        );
    }
    repair
}

/// Fill in `show_icon = true` on non-header sections that lack the field.
///
/// Returns the number of sections updated. No other field is touched.
pub fn apply_icon_defaults(project: &mut Project) -> usize {
    let mut filled = 0;
    for section in project.sections.iter_mut().filter(|s| !s.is_header) {
        if section.show_icon.is_none() {
            section.show_icon = Some(true);
            filled += 1;
        }
    }
    if filled > 0 {
        debug!(filled, "defaulted missing show_icon flags");
    }
    filled
}

/// Full normalization pass: header rule, then icon defaults.
pub fn normalize(project: &mut Project) -> HeaderRepair {
    let repair = ensure_header_exists(project);
    apply_icon_defaults(project);
    repair
}

// ============================================================================
// Tests
// ============================================================================
