//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output leads with what the user edits (sections, blocks, buttons) and
//! their positions, because positions are what the editing commands take.
//! Ids and file paths are secondary context on indented lines.
//!
//! # Output Format
//!
//! ## Show
//!
//! ```text
//! Acme Widgets
//!     Layout: sections, font: serif, dark mode: off
//!
//! Sections
//! 000 Header (header)
//!     000 text: Acme Widgets
//! 001 📄 Products
//!     000 text: We make widgets of every size...
//!     001 image: Our factory
//! 002 Team (icon hidden, collapsed)
//!
//! Buttons
//! 000 file "Brochure": brochure.pdf
//!     Id: button-5e1c…
//! ```
//!
//! ## Export
//!
//! ```text
//! Exported react site
//!     package.json
//!     src/App.jsx
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::app::Notice;
use crate::buttons::{Button, ButtonAction};
use crate::export::ExportReport;
use crate::project::{ContentBlock, Project, Section};
use crate::settings::Settings;

/// Longest block summary before truncation.
const SUMMARY_LEN: usize = 40;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a position as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Collapse whitespace and truncate to `max` characters, appending `...`.
fn summarize(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        collapsed
    } else {
        let cut: String = collapsed.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Section header line: position, icon (if shown) and name, plus flags.
///
/// ```text
/// 000 Header (header)
/// 001 📄 Products
/// 002 Team (icon hidden)
/// ```
fn section_line(index: usize, section: &Section) -> String {
    let mut flags = Vec::new();
    let label = if section.is_header {
        flags.push("header");
        section.name.clone()
    } else if section.shows_icon() {
        format!("{} {}", section.icon, section.name)
    } else {
        flags.push("icon hidden");
        section.name.clone()
    };
    if section.collapsed {
        flags.push("collapsed");
    }
    if flags.is_empty() {
        format!("{} {}", format_index(index), label)
    } else {
        format!("{} {} ({})", format_index(index), label, flags.join(", "))
    }
}

/// One-line summary of a content block.
fn block_line(index: usize, block: &ContentBlock) -> String {
    let summary = match block {
        ContentBlock::Text { value, .. } => {
            let text = summarize(&strip_html_tags(value), SUMMARY_LEN);
            format!("text: {}", if text.is_empty() { "(empty)" } else { &text })
        }
        ContentBlock::Image { url, caption, .. } => {
            let caption = caption
                .as_deref()
                .map(|c| summarize(&strip_html_tags(c), SUMMARY_LEN))
                .filter(|c| !c.is_empty());
            match (url.is_some(), caption) {
                (_, Some(c)) => format!("image: {c}"),
                (true, None) => "image".to_string(),
                (false, None) => "image: (empty)".to_string(),
            }
        }
    };
    format!("{} {}", format_index(index), summary)
}

/// Button line: position, kind, label and target.
fn button_line(index: usize, button: &Button) -> String {
    let target = match &button.action {
        ButtonAction::File { file: Some(f) } => f.name.clone(),
        ButtonAction::Link { href } if !href.trim().is_empty() => href.clone(),
        ButtonAction::Email { email } if !email.trim().is_empty() => email.clone(),
        _ => "(not set)".to_string(),
    };
    format!(
        "{} {} \"{}\": {}",
        format_index(index),
        button.kind(),
        button.display_label(),
        target
    )
}

// ============================================================================
// Show
// ============================================================================

/// Format the project outline shown by `docsite show`.
pub fn format_project(project: &Project, settings: &Settings) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(project.title.clone());
    lines.push(format!(
        "{}Layout: {}, font: {}, dark mode: {}",
        indent(1),
        settings.layout_style,
        settings.font_style,
        on_off(settings.dark_mode)
    ));
    if project.logo_url.is_some() {
        lines.push(format!("{}Logo: set", indent(1)));
    }

    lines.push(String::new());
    lines.push("Sections".to_string());
    for (i, section) in project.sections.iter().enumerate() {
        lines.push(section_line(i, section));
        for (j, block) in section.content.iter().enumerate() {
            lines.push(format!("{}{}", indent(1), block_line(j, block)));
        }
    }

    if !settings.buttons.is_empty() {
        lines.push(String::new());
        lines.push("Buttons".to_string());
        for (i, button) in settings.buttons.iter().enumerate() {
            lines.push(button_line(i, button));
            lines.push(format!("{}Id: {}", indent(1), button.id));
        }
    }

    lines
}

/// Print the project outline to stdout.
pub fn print_project(project: &Project, settings: &Settings) {
    for line in format_project(project, settings) {
        println!("{}", line);
    }
}

// ============================================================================
// Export
// ============================================================================

/// Format the list of exported files.
pub fn format_export_report(report: &ExportReport) -> Vec<String> {
    let mut lines = vec![format!("Exported {} site", report.format)];
    for file in &report.files {
        lines.push(format!("{}{}", indent(1), file.display()));
    }
    lines
}

pub fn print_export_report(report: &ExportReport) {
    for line in format_export_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Notices
// ============================================================================

/// Print notices: info to stdout, errors to stderr.
pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice.level {
            crate::app::NoticeLevel::Info => println!("{}", notice),
            crate::app::NoticeLevel::Error => eprintln!("{}", notice),
        }
    }
}
