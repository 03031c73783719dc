//! Shared test utilities for the docsite test suite.
//!
//! Provides project builders and structural assertions that work with the
//! section model (`Project`, `Section`, `ContentBlock`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut project = project_with(&[(false, "About"), (true, "Header")]);
//! ensure_header_exists(&mut project);
//!
//! assert_section_shape(&project, &[
//!     (true, "Header"),
//!     (false, "About"),
//! ]);
//! assert_header_invariant(&project);
//! ```

use crate::project::{ContentBlock, Project, Section};

// =========================================================================
// Builders
// =========================================================================

/// Build an un-normalized project titled "Test Site" from `(is_header, name)`
/// pairs. Section ids are `section-0`, `section-1`, … in input order.
pub fn project_with(sections: &[(bool, &str)]) -> Project {
    Project {
        title: "Test Site".to_string(),
        logo_url: None,
        sections: sections
            .iter()
            .enumerate()
            .map(|(i, (is_header, name))| {
                let mut section = Section::new(*name, "📄");
                section.id = format!("section-{i}");
                section.is_header = *is_header;
                section
            })
            .collect(),
    }
}

// =========================================================================
// Extractors
// =========================================================================

/// All section names in order.
pub fn section_names(project: &Project) -> Vec<&str> {
    project.sections.iter().map(|s| s.name.as_str()).collect()
}

/// All section ids in order.
pub fn section_ids(project: &Project) -> Vec<String> {
    project.sections.iter().map(|s| s.id.clone()).collect()
}

/// The markup of a text block. Panics on image blocks.
pub fn text_value(block: &ContentBlock) -> &str {
    match block {
        ContentBlock::Text { value, .. } => value,
        other => panic!("expected a text block, got {other:?}"),
    }
}

// =========================================================================
// Assertions
// =========================================================================

/// Assert exactly one header exists and it is the first section.
pub fn assert_header_invariant(project: &Project) {
    let headers: Vec<usize> = project
        .sections
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_header)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(
        headers,
        vec![0],
        "expected a single header at index 0. Sections: {:?}",
        section_names(project)
    );
}

/// Assert the full section list matches `(is_header, name)` pairs.
pub fn assert_section_shape(project: &Project, expected: &[(bool, &str)]) {
    let actual: Vec<(bool, &str)> = project
        .sections
        .iter()
        .map(|s| (s.is_header, s.name.as_str()))
        .collect();
    assert_eq!(actual, expected.to_vec(), "section shape mismatch");
}
