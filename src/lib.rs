//! # Docsite
//!
//! Turns documents into small websites. A Markdown file, a text file, an
//! image or a slideshow is imported into a **project**: a title plus an
//! ordered list of sections holding text and image blocks. The project is
//! edited section by section, styled through a settings object, previewed,
//! and exported as a static page or a React project.
//!
//! # Architecture: Model → Render → Export
//!
//! ```text
//! import    document  →  Project            (sections + content blocks)
//! edit      Project   →  Project            (section ops, always re-normalized)
//! render    Project + Settings → HTML       (pure, shared by preview and export)
//! export    HTML      →  out/               (index.html, or a Vite/React tree)
//! ```
//!
//! The model and the renderer are pure functions over plain data. All state
//! lives in one [`app::AppContext`] owned by the caller, and persistence is
//! a JSON record written through [`persistence::Store`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`project`] | Project, section and content block types; header normalization |
//! | [`sections`] | Section and content editing: add, delete, move, rename, icons |
//! | [`buttons`] | Call-to-action buttons (max 3) and legacy settings migration |
//! | [`settings`] | Style settings, `settings.toml` overlays, theme CSS |
//! | [`contrast`] | Text color choice for a background color (WCAG luminance) |
//! | [`render`] | Markup generation with Maud: navigation, sections, buttons |
//! | [`import`] | Document import: Markdown, text, images, PPTX, PDF, placeholder fallback |
//! | [`export`] | `html` and `react` export targets |
//! | [`persistence`] | Saved-record format, validity check, file and memory backends |
//! | [`autosave`] | Debounce and periodic sweep scheduling for saves |
//! | [`app`] | Session state, command layer, user notices |
//! | [`slug`] | Anchors, package names and component names from user text |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Heal, Don't Reject
//!
//! A project always has exactly one header section, at index 0. Instead of
//! refusing states that break this, [`project::normalize`] repairs them after
//! every load, import and edit: a missing header is synthesized from the
//! title, extra header flags are cleared, a misplaced header is moved back.
//! User-facing validation (empty names, a fourth button, bad uploads) is the
//! only kind of rejection, and it leaves state untouched.
//!
//! ## One Renderer
//!
//! The preview and both export targets go through [`render`]. The React
//! target embeds each section's rendered markup in its own component, so an
//! export never drifts from what the preview showed.
//!
//! ## No JavaScript in Generated Pages
//!
//! The static page works without scripts: the hamburger menu is a checkbox
//! and label, download buttons are `download` links with data URIs, and all
//! styles are inlined.

pub mod app;
pub mod autosave;
pub mod buttons;
pub mod contrast;
pub mod export;
pub mod import;
pub mod output;
pub mod persistence;
pub mod project;
pub mod render;
pub mod sections;
pub mod settings;
pub mod slug;

#[cfg(test)]
pub(crate) mod test_helpers;
