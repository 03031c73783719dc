//! Application state and the command layer over it.
//!
//! [`AppContext`] owns the project and settings for a session. UI bindings
//! (the CLI here) call its methods instead of the model functions directly,
//! which gives every edit the same treatment:
//!
//! 1. run the operation
//! 2. on success, re-normalize the project and mark it for saving
//! 3. on rejection, leave state as it was and queue an error [`Notice`]
//!
//! Notices are transient; the binding layer drains and displays them.

use crate::autosave::Autosave;
use crate::buttons::{self, ButtonKind, ButtonPatch};
use crate::export::{self, ExportOutcome};
use crate::import;
use crate::persistence::{StorageBackend, Store, StoreError};
use crate::project::{self, Project};
use crate::render;
use crate::sections::{self, Direction};
use crate::settings::{self, Settings};
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.message),
            NoticeLevel::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// The state of one editing session.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub project: Project,
    pub settings: Settings,
    notices: Vec<Notice>,
    autosave: Autosave,
}

impl AppContext {
    /// Wrap an existing project, normalizing it and migrating its settings.
    pub fn new(mut project: Project, settings: Settings) -> Self {
        project::normalize(&mut project);
        Self {
            project,
            settings: buttons::migrate(settings),
            notices: Vec::new(),
            autosave: Autosave::new(Instant::now()),
        }
    }

    /// A session on a new blank project with default settings.
    pub fn blank() -> Self {
        Self::new(Project::blank(), Settings::default())
    }

    /// Resume the stored project, or start blank when there is none.
    ///
    /// A stored record that cannot be read also starts blank, with an error
    /// notice; the unreadable file is kept as a backup on the first save.
    pub fn restore<B: StorageBackend>(store: &Store<B>) -> Self {
        match store.load() {
            Some(record) => Self::new(record.project, record.settings),
            None if store.has_record() => {
                let mut ctx = Self::blank();
                ctx.notify(
                    NoticeLevel::Error,
                    "Saved project could not be read; starting blank (the old file is kept as a backup)",
                );
                ctx
            }
            None => Self::blank(),
        }
    }

    // ------------------------------------------------------------------------
    // Notices
    // ------------------------------------------------------------------------

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    fn reject(&mut self, error: impl fmt::Display) {
        warn!(error = %error, "operation rejected");
        self.notify(NoticeLevel::Error, error.to_string());
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Take all pending notices.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ------------------------------------------------------------------------
    // Mutation entry points
    // ------------------------------------------------------------------------

    /// Apply a project edit. On success the project is re-normalized and
    /// scheduled for saving; on error a notice is queued and `None` returned.
    pub fn update_project<T, E: fmt::Display>(
        &mut self,
        op: impl FnOnce(&mut Project) -> Result<T, E>,
    ) -> Option<T> {
        match op(&mut self.project) {
            Ok(value) => {
                project::normalize(&mut self.project);
                self.autosave.mark_changed(Instant::now());
                Some(value)
            }
            Err(e) => {
                self.reject(e);
                None
            }
        }
    }

    /// Apply an edit that cannot fail.
    pub fn edit_project<T>(&mut self, op: impl FnOnce(&mut Project) -> T) -> T {
        let value = op(&mut self.project);
        project::normalize(&mut self.project);
        self.autosave.mark_changed(Instant::now());
        value
    }

    /// Apply a swap. Only a swap that changed the order schedules a save.
    fn reorder_project<E: fmt::Display>(
        &mut self,
        op: impl FnOnce(&mut Project) -> Result<bool, E>,
    ) -> bool {
        match op(&mut self.project) {
            Ok(true) => {
                project::normalize(&mut self.project);
                self.autosave.mark_changed(Instant::now());
                true
            }
            Ok(false) => false,
            Err(e) => {
                self.reject(e);
                false
            }
        }
    }

    /// Apply a settings edit, with the same notice handling as
    /// [`AppContext::update_project`].
    pub fn update_settings<T, E: fmt::Display>(
        &mut self,
        op: impl FnOnce(&mut Settings) -> Result<T, E>,
    ) -> Option<T> {
        match op(&mut self.settings) {
            Ok(value) => {
                self.autosave.mark_changed(Instant::now());
                Some(value)
            }
            Err(e) => {
                self.reject(e);
                None
            }
        }
    }

    // ------------------------------------------------------------------------
    // Project lifecycle
    // ------------------------------------------------------------------------

    /// Replace the project with a new blank one. Settings are kept.
    pub fn new_blank(&mut self, title: Option<&str>) {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(project::BLANK_PROJECT_TITLE);
        self.project = Project::titled(title);
        self.autosave.mark_changed(Instant::now());
        self.notify(NoticeLevel::Info, "Created a blank project");
    }

    /// Replace the project with an imported document. Failed imports load
    /// a placeholder and queue the error.
    pub fn import(&mut self, path: &Path) {
        let outcome = import::import_or_placeholder(path);
        let section_count = outcome.document.sections.len();
        self.project = Project::from_import(outcome.document);
        self.autosave.mark_changed(Instant::now());
        match outcome.error {
            Some(error) => self.notify(NoticeLevel::Error, error),
            None => self.notify(
                NoticeLevel::Info,
                format!(
                    "Imported {} section{} from {}",
                    section_count,
                    if section_count == 1 { "" } else { "s" },
                    path.display()
                ),
            ),
        }
    }

    /// Rename the project. The header heading is not rewritten.
    pub fn set_title(&mut self, title: &str) {
        let title = title.trim().to_string();
        self.edit_project(|p| p.title = title);
    }

    /// Set the logo from an image file.
    pub fn set_logo(&mut self, path: &Path) -> bool {
        match import::load_image_data_uri(path) {
            Ok(uri) => {
                self.edit_project(|p| p.logo_url = Some(uri));
                true
            }
            Err(e) => {
                self.reject(e);
                false
            }
        }
    }

    pub fn remove_logo(&mut self) {
        self.edit_project(|p| p.logo_url = None);
    }

    // ------------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------------

    pub fn add_section(&mut self) -> usize {
        self.edit_project(sections::add_section)
    }

    pub fn delete_section(&mut self, index: usize) -> bool {
        self.update_project(|p| sections::delete_section(p, index))
            .is_some()
    }

    pub fn move_section(&mut self, index: usize, direction: Direction) -> bool {
        self.reorder_project(|p| sections::move_section(p, index, direction))
    }

    pub fn rename_section(&mut self, index: usize, name: &str) -> bool {
        self.update_project(|p| sections::update_section_name(p, index, name))
            .is_some()
    }

    /// Icon picker command.
    pub fn apply_icon_selection(&mut self, index: usize, icon: &str) -> bool {
        self.update_project(|p| sections::set_section_icon(p, index, icon))
            .is_some()
    }

    /// Show-icon checkbox command.
    pub fn apply_show_icon_toggle(&mut self, index: usize, show: bool) -> bool {
        self.update_project(|p| sections::toggle_section_icon(p, index, show))
            .is_some()
    }

    pub fn set_collapsed(&mut self, index: usize, collapsed: bool) -> bool {
        self.update_project(|p| sections::set_collapsed(p, index, collapsed))
            .is_some()
    }

    // ------------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------------

    pub fn add_text(&mut self, section: usize) -> Option<usize> {
        self.update_project(|p| sections::add_text_to_section(p, section))
    }

    pub fn add_image(&mut self, section: usize) -> Option<usize> {
        self.update_project(|p| sections::add_image_to_section(p, section))
    }

    /// Add an image block filled from a file. Nothing is added if the file
    /// is rejected.
    pub fn add_image_from_file(
        &mut self,
        section: usize,
        path: &Path,
        caption: Option<String>,
    ) -> Option<usize> {
        let uri = match import::load_image_data_uri(path) {
            Ok(uri) => uri,
            Err(e) => {
                self.reject(e);
                return None;
            }
        };
        self.update_project(|p| {
            let index = sections::add_image_to_section(p, section)?;
            sections::update_image(p, section, index, Some(uri), caption)?;
            Ok::<_, sections::SectionError>(index)
        })
    }

    pub fn update_text(&mut self, section: usize, content: usize, value: &str) -> bool {
        self.update_project(|p| sections::update_text(p, section, content, value))
            .is_some()
    }

    pub fn delete_content(&mut self, section: usize, content: usize) -> bool {
        self.update_project(|p| sections::delete_content(p, section, content))
            .is_some()
    }

    pub fn move_content(&mut self, section: usize, content: usize, direction: Direction) -> bool {
        self.reorder_project(|p| sections::move_content(p, section, content, direction))
    }

    // ------------------------------------------------------------------------
    // Buttons and settings
    // ------------------------------------------------------------------------

    pub fn add_button(&mut self, kind: ButtonKind) -> Option<String> {
        self.update_settings(|s| buttons::add_button(s, kind))
    }

    pub fn update_button(&mut self, id: &str, patch: ButtonPatch) -> bool {
        let found = buttons::update_button(&mut self.settings, id, patch);
        if found {
            self.autosave.mark_changed(Instant::now());
        } else {
            self.notify(NoticeLevel::Error, format!("No button with id '{id}'"));
        }
        found
    }

    pub fn remove_button(&mut self, id: &str) -> bool {
        let removed = buttons::remove_button(&mut self.settings, id);
        if removed {
            self.autosave.mark_changed(Instant::now());
        } else {
            self.notify(NoticeLevel::Error, format!("No button with id '{id}'"));
        }
        removed
    }

    pub fn reorder_buttons(&mut self, from: usize, to: usize) -> bool {
        let moved = buttons::reorder_buttons(&mut self.settings, from, to);
        if moved && from != to {
            self.autosave.mark_changed(Instant::now());
        }
        moved
    }

    /// Merge a `settings.toml` overlay onto the current settings.
    pub fn apply_settings_file(&mut self, path: &Path) -> bool {
        let merged = settings::load_settings_file(&self.settings, path).map(buttons::migrate);
        self.update_settings(|s| {
            *s = merged?;
            Ok::<_, settings::SettingsError>(())
        })
        .is_some()
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Preview fragment for the current state.
    pub fn preview(&self) -> String {
        render::render_preview(&self.project, &self.settings).into_string()
    }

    /// Export by format name. Failures become an error notice.
    pub fn export(&mut self, format_name: &str, out_dir: &Path) -> ExportOutcome {
        let outcome = export::export_named(&self.project, &self.settings, format_name, out_dir);
        match &outcome.error {
            Some(error) => self.notify(NoticeLevel::Error, format!("Export failed: {error}")),
            None => self.notify(
                NoticeLevel::Info,
                format!("Exported {format_name} site to {}", out_dir.display()),
            ),
        }
        outcome
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    pub fn has_unsaved_changes(&self) -> bool {
        self.autosave.is_dirty()
    }

    /// Save if the autosave schedule says a save is due at `now`.
    pub fn autosave<B: StorageBackend>(
        &mut self,
        store: &mut Store<B>,
        now: Instant,
    ) -> Result<bool, StoreError> {
        if !self.autosave.poll(now) {
            return Ok(false);
        }
        self.write(store)
    }

    /// Save immediately (explicit save, shutdown).
    pub fn save_now<B: StorageBackend>(&mut self, store: &mut Store<B>) -> Result<bool, StoreError> {
        self.autosave.force();
        self.write(store)
    }

    fn write<B: StorageBackend>(&mut self, store: &mut Store<B>) -> Result<bool, StoreError> {
        let written = store.save(&self.project, &self.settings)?;
        self.autosave.mark_saved();
        Ok(written)
    }

    /// Delete the stored project and start over blank.
    pub fn reset<B: StorageBackend>(&mut self, store: &mut Store<B>) -> Result<(), StoreError> {
        store.clear()?;
        *self = Self::blank();
        info!("session reset");
        Ok(())
    }
}
