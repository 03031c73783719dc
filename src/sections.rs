//! Ordered-list editing of sections and their content blocks.
//!
//! Every operation takes the project explicitly and either applies fully or
//! returns a [`SectionError`] leaving the project untouched. The error's
//! `Display` text is the notice shown to the user.
//!
//! Moves are adjacent swaps. Moving past either end is a silent no-op
//! (`Ok(false)`), not an error, so toolbar arrows can be wired up without
//! boundary checks. The header is pinned: it cannot be moved, deleted, or
//! swapped with, so index 0 always stays the header.
//!
//! Header re-normalization after each operation is the caller's job; see
//! [`crate::app::AppContext::update_project`].

use crate::project::{
    ContentBlock, DEFAULT_ICON, NEW_SECTION_NAME, Project, Section,
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SectionError {
    #[error("No section at position {0}")]
    NoSuchSection(usize),
    #[error("No content block at position {content} in section {section}")]
    NoSuchContent { section: usize, content: usize },
    #[error("Cannot delete the last remaining section")]
    LastSection,
    #[error("The header section cannot be deleted, moved, or given an icon")]
    HeaderPinned,
    #[error("Section name cannot be empty")]
    EmptyName,
    #[error("Content block {0} is not {1}")]
    WrongBlockType(usize, &'static str),
}

/// Direction of an adjacent swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Index of the neighbour in this direction, if it exists.
    fn neighbour(self, index: usize, len: usize) -> Option<usize> {
        match self {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&i| i < len),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("unknown direction '{other}' (expected up or down)")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
        })
    }
}

fn section_mut(project: &mut Project, index: usize) -> Result<&mut Section, SectionError> {
    project
        .sections
        .get_mut(index)
        .ok_or(SectionError::NoSuchSection(index))
}

fn editable_section_mut(
    project: &mut Project,
    index: usize,
) -> Result<&mut Section, SectionError> {
    let section = section_mut(project, index)?;
    if section.is_header {
        return Err(SectionError::HeaderPinned);
    }
    Ok(section)
}

fn block_mut(
    project: &mut Project,
    section: usize,
    content: usize,
) -> Result<&mut ContentBlock, SectionError> {
    section_mut(project, section)?
        .content
        .get_mut(content)
        .ok_or(SectionError::NoSuchContent { section, content })
}

// ============================================================================
// Sections
// ============================================================================

/// Append a new empty section and return its index.
pub fn add_section(project: &mut Project) -> usize {
    project
        .sections
        .push(Section::new(NEW_SECTION_NAME, DEFAULT_ICON));
    project.sections.len() - 1
}

/// Remove a section, returning it.
///
/// Rejected for the header and when only one section remains.
pub fn delete_section(project: &mut Project, index: usize) -> Result<Section, SectionError> {
    let section = project
        .sections
        .get(index)
        .ok_or(SectionError::NoSuchSection(index))?;
    if project.sections.len() <= 1 {
        return Err(SectionError::LastSection);
    }
    if section.is_header {
        return Err(SectionError::HeaderPinned);
    }
    Ok(project.sections.remove(index))
}

/// Swap a section with its neighbour. Returns whether anything moved.
pub fn move_section(
    project: &mut Project,
    index: usize,
    direction: Direction,
) -> Result<bool, SectionError> {
    editable_section_mut(project, index)?;
    let Some(target) = direction.neighbour(index, project.sections.len()) else {
        return Ok(false);
    };
    if project.sections[target].is_header {
        return Ok(false);
    }
    project.sections.swap(index, target);
    Ok(true)
}

/// Rename a section. Blank names are rejected; surrounding whitespace is trimmed.
pub fn update_section_name(
    project: &mut Project,
    index: usize,
    value: &str,
) -> Result<(), SectionError> {
    let name = value.trim();
    if name.is_empty() {
        return Err(SectionError::EmptyName);
    }
    section_mut(project, index)?.name = name.to_string();
    Ok(())
}

/// Set a section's icon glyph.
pub fn set_section_icon(
    project: &mut Project,
    index: usize,
    icon: &str,
) -> Result<(), SectionError> {
    editable_section_mut(project, index)?.icon = icon.to_string();
    Ok(())
}

/// Show or hide a section's icon in navigation and headings.
pub fn toggle_section_icon(
    project: &mut Project,
    index: usize,
    show: bool,
) -> Result<(), SectionError> {
    editable_section_mut(project, index)?.show_icon = Some(show);
    Ok(())
}

/// Fold or unfold a section in the editor.
pub fn set_collapsed(
    project: &mut Project,
    index: usize,
    collapsed: bool,
) -> Result<(), SectionError> {
    section_mut(project, index)?.collapsed = collapsed;
    Ok(())
}

// ============================================================================
// Content blocks
// ============================================================================

/// Append a placeholder text block. Returns the new block's index.
pub fn add_text_to_section(project: &mut Project, index: usize) -> Result<usize, SectionError> {
    let section = section_mut(project, index)?;
    section.content.push(ContentBlock::placeholder_text());
    Ok(section.content.len() - 1)
}

/// Append an empty image block. Returns the new block's index.
pub fn add_image_to_section(project: &mut Project, index: usize) -> Result<usize, SectionError> {
    let section = section_mut(project, index)?;
    section.content.push(ContentBlock::image(None, None));
    Ok(section.content.len() - 1)
}

/// Remove a content block. Sections may end up empty.
pub fn delete_content(
    project: &mut Project,
    section: usize,
    content: usize,
) -> Result<ContentBlock, SectionError> {
    let blocks = &mut section_mut(project, section)?.content;
    if content >= blocks.len() {
        return Err(SectionError::NoSuchContent { section, content });
    }
    Ok(blocks.remove(content))
}

/// Swap a content block with its neighbour. Returns whether anything moved.
pub fn move_content(
    project: &mut Project,
    section: usize,
    content: usize,
    direction: Direction,
) -> Result<bool, SectionError> {
    let blocks = &mut section_mut(project, section)?.content;
    if content >= blocks.len() {
        return Err(SectionError::NoSuchContent { section, content });
    }
    match direction.neighbour(content, blocks.len()) {
        Some(target) => {
            blocks.swap(content, target);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Replace a text block's markup.
pub fn update_text(
    project: &mut Project,
    section: usize,
    content: usize,
    new_value: &str,
) -> Result<(), SectionError> {
    match block_mut(project, section, content)? {
        ContentBlock::Text { value, .. } => {
            *value = new_value.to_string();
            Ok(())
        }
        ContentBlock::Image { .. } => Err(SectionError::WrongBlockType(content, "text")),
    }
}

/// Set an image block's source and/or caption. `None` leaves a field as is.
pub fn update_image(
    project: &mut Project,
    section: usize,
    content: usize,
    new_url: Option<String>,
    new_caption: Option<String>,
) -> Result<(), SectionError> {
    match block_mut(project, section, content)? {
        ContentBlock::Image { url, caption, .. } => {
            if let Some(u) = new_url {
                *url = Some(u);
            }
            if let Some(c) = new_caption {
                *caption = Some(c).filter(|c| !c.trim().is_empty());
            }
            Ok(())
        }
        ContentBlock::Text { .. } => Err(SectionError::WrongBlockType(content, "an image")),
    }
}
