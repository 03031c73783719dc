//! Document import: uploaded files → section-shaped records.
//!
//! Each supported format is turned into an [`ImportedDocument`]: a title,
//! some intro content for the header, and an ordered list of sections.
//! [`crate::project::Project::from_import`] adopts the result.
//!
//! ## Formats
//!
//! | Extension              | Strategy |
//! |------------------------|----------|
//! | `.md`, `.markdown`     | First `#` heading is the title, each `##` starts a section |
//! | `.txt`                 | First line is the title, paragraphs go in one section |
//! | `.png` `.jpg` `.gif` `.webp` | One "Gallery" section holding the image as a data URI |
//! | `.pptx`                | Every slide is a section, the first slide's first line is the title |
//! | `.pdf`                 | Text layer only: first line is the title, each page with text is a section |
//!
//! Anything else is reported as unsupported. Scanned PDFs without a text
//! layer import as empty and fall back to the placeholder.
//!
//! ## Failure handling
//!
//! Import never blocks the user. [`import_or_placeholder`] swaps any failure
//! for a [`placeholder`] document and hands back the error text so the
//! caller can show it as a notice.

use crate::buttons::FileAttachment;
use crate::project::{ContentBlock, DEFAULT_ICON};
use base64::prelude::*;
use maud::html;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html};
use quick_xml::Reader;
use quick_xml::events::Event as XmlEvent;
use std::io::{Cursor, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Largest document accepted for import.
pub const MAX_DOCUMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Largest decompressed slide part read from a `.pptx` archive.
pub const MAX_SLIDE_BYTES: u64 = 2 * 1024 * 1024;

/// Largest image accepted for image blocks, logos and image imports.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

const GALLERY_ICON: &str = "🖼️";

const PLACEHOLDER_BODY: &str = "This document could not be read automatically. \
Replace this text with your own content.";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("File is too large ({size} bytes, limit is {max} bytes)")]
    TooLarge { size: u64, max: u64 },
    #[error("Not a supported image: {0}")]
    InvalidImage(String),
    #[error("Could not read slideshow archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Could not read slide XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Could not read PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("The document is empty")]
    Empty,
}

/// A section produced by an importer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSection {
    pub icon: String,
    pub name: String,
    pub content: Vec<ContentBlock>,
}

impl ImportedSection {
    fn new(name: impl Into<String>, content: Vec<ContentBlock>) -> Self {
        Self {
            icon: DEFAULT_ICON.to_string(),
            name: name.into(),
            content,
        }
    }
}

/// The importer's view of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDocument {
    pub title: String,
    /// Content placed in the header section after the title heading.
    pub intro: Vec<ContentBlock>,
    pub sections: Vec<ImportedSection>,
}

/// Result of [`import_or_placeholder`]: always a document, maybe an error.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub document: ImportedDocument,
    pub error: Option<String>,
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Markdown,
    Text,
    Image,
    Slides,
    Pdf,
}

impl DocumentFormat {
    /// Detect the format from a file name's extension.
    pub fn from_name(name: &str) -> Result<Self, ImportError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "md" | "markdown" => Ok(DocumentFormat::Markdown),
            "txt" | "text" => Ok(DocumentFormat::Text),
            "png" | "jpg" | "jpeg" | "gif" | "webp" => Ok(DocumentFormat::Image),
            "pptx" => Ok(DocumentFormat::Slides),
            "pdf" => Ok(DocumentFormat::Pdf),
            "" => Err(ImportError::UnsupportedFormat(format!(
                "'{name}' has no extension"
            ))),
            other => Err(ImportError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// File stem used as a fallback title.
fn stem_title(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.replace(['-', '_'], " ").trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

/// Escaped `<p>` markup for a plain-text paragraph.
fn paragraph(text: &str) -> String {
    html! { p { (text) } }.into_string()
}

// ============================================================================
// Entry points
// ============================================================================

/// Import a file from disk.
pub fn import_file(path: &Path) -> Result<ImportedDocument, ImportError> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_DOCUMENT_BYTES {
        return Err(ImportError::TooLarge {
            size,
            max: MAX_DOCUMENT_BYTES,
        });
    }
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    import_bytes(name, &bytes)
}

/// Import already-read file contents; `name` selects the format.
pub fn import_bytes(name: &str, bytes: &[u8]) -> Result<ImportedDocument, ImportError> {
    let format = DocumentFormat::from_name(name)?;
    let fallback_title = stem_title(name);
    let doc = match format {
        DocumentFormat::Markdown => {
            parse_markdown(&String::from_utf8_lossy(bytes), &fallback_title)
        }
        DocumentFormat::Text => parse_text(&String::from_utf8_lossy(bytes))?,
        DocumentFormat::Image => image_document(&fallback_title, bytes)?,
        DocumentFormat::Slides => parse_pptx(bytes, &fallback_title)?,
        DocumentFormat::Pdf => parse_pdf(bytes, &fallback_title)?,
    };
    info!(
        file = name,
        format = ?format,
        sections = doc.sections.len(),
        "imported document"
    );
    Ok(doc)
}

/// Import a file, substituting a placeholder document on any failure.
pub fn import_or_placeholder(path: &Path) -> ImportOutcome {
    match import_file(path) {
        Ok(document) => ImportOutcome {
            document,
            error: None,
        },
        Err(e) => {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            warn!(file = name, error = %e, "import failed, using placeholder");
            ImportOutcome {
                document: placeholder(&stem_title(name)),
                error: Some(format!("Could not import {name}: {e}")),
            }
        }
    }
}

/// Minimal document used when an import fails.
pub fn placeholder(title: &str) -> ImportedDocument {
    ImportedDocument {
        title: title.to_string(),
        intro: Vec::new(),
        sections: vec![ImportedSection::new(
            "Content",
            vec![ContentBlock::text(paragraph(PLACEHOLDER_BODY), true)],
        )],
    }
}

// ============================================================================
// Markdown
// ============================================================================

/// Which heading text is being captured.
enum Capture {
    Title,
    SectionName,
}

/// Turn buffered events into a text block, if they produce any output.
fn flush_markdown(events: &mut Vec<Event<'_>>, into: &mut Vec<ContentBlock>) {
    if events.is_empty() {
        return;
    }
    let mut out = String::new();
    md_html::push_html(&mut out, events.drain(..));
    if !out.trim().is_empty() {
        into.push(ContentBlock::text(out.trim_end().to_string(), true));
    }
}

/// Split a Markdown document at `##` headings.
pub fn parse_markdown(source: &str, fallback_title: &str) -> ImportedDocument {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut title: Option<String> = None;
    let mut intro = Vec::new();
    let mut sections: Vec<ImportedSection> = Vec::new();
    let mut pending: Vec<Event> = Vec::new();
    let mut capture: Option<(Capture, String)> = None;
    // Open containers (lists, quotes, ...) around the current event
    let mut depth = 0usize;

    for event in Parser::new_ext(source, options) {
        if let Some((_, text)) = capture.as_mut() {
            match &event {
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                Event::SoftBreak | Event::HardBreak => text.push(' '),
                _ => {}
            }
        }
        if capture.is_some() {
            if let Event::End(TagEnd::Heading(_)) = event
                && let Some((kind, text)) = capture.take()
            {
                let text = text.trim().to_string();
                match kind {
                    Capture::Title => title = Some(text),
                    Capture::SectionName => sections.push(ImportedSection::new(text, Vec::new())),
                }
            }
            continue;
        }

        match event {
            Event::Start(Tag::Heading { level, .. })
                if depth == 0 && level == HeadingLevel::H1 && title.is_none() =>
            {
                capture = Some((Capture::Title, String::new()));
            }
            Event::Start(Tag::Heading {
                level: HeadingLevel::H2,
                ..
            }) if depth == 0 => {
                let target = match sections.last_mut() {
                    Some(section) => &mut section.content,
                    None => &mut intro,
                };
                flush_markdown(&mut pending, target);
                capture = Some((Capture::SectionName, String::new()));
            }
            other => {
                match &other {
                    Event::Start(_) => depth += 1,
                    Event::End(_) => depth = depth.saturating_sub(1),
                    _ => {}
                }
                pending.push(other);
            }
        }
    }

    let target = match sections.last_mut() {
        Some(section) => &mut section.content,
        None => &mut intro,
    };
    flush_markdown(&mut pending, target);

    for section in sections.iter_mut().filter(|s| s.name.is_empty()) {
        section.name = "Untitled section".to_string();
    }

    ImportedDocument {
        title: title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback_title.to_string()),
        intro,
        sections,
    }
}

// ============================================================================
// Plain text
// ============================================================================

/// Blank-line separated paragraphs, each as one escaped `<p>` block.
fn paragraph_blocks<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<ContentBlock> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
        .iter()
        .map(|p| ContentBlock::text(paragraph(p), true))
        .collect()
}

/// First line becomes the title; blank-line separated paragraphs follow.
pub fn parse_text(source: &str) -> Result<ImportedDocument, ImportError> {
    let mut lines = source.lines().skip_while(|l| l.trim().is_empty());
    let title = lines.next().map(str::trim).ok_or(ImportError::Empty)?;

    let content = paragraph_blocks(lines);
    let sections = if content.is_empty() {
        Vec::new()
    } else {
        vec![ImportedSection::new("Content", content)]
    };

    Ok(ImportedDocument {
        title: title.to_string(),
        intro: Vec::new(),
        sections,
    })
}

// ============================================================================
// Images
// ============================================================================

/// Validate image bytes by magic number and size, returning a data URI.
pub fn image_data_uri(bytes: &[u8]) -> Result<String, ImportError> {
    let size = bytes.len() as u64;
    if size > MAX_IMAGE_BYTES {
        return Err(ImportError::TooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }
    let format = image::guess_format(bytes)
        .map_err(|_| ImportError::InvalidImage("unrecognized image data".to_string()))?;
    let mime = match format {
        image::ImageFormat::Png => "image/png",
        image::ImageFormat::Jpeg => "image/jpeg",
        image::ImageFormat::Gif => "image/gif",
        image::ImageFormat::WebP => "image/webp",
        other => {
            return Err(ImportError::InvalidImage(format!(
                "{other:?} images are not supported"
            )));
        }
    };
    Ok(format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes)))
}

/// Read and validate an image file (logo or image block upload).
pub fn load_image_data_uri(path: &Path) -> Result<String, ImportError> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_IMAGE_BYTES {
        return Err(ImportError::TooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }
    image_data_uri(&std::fs::read(path)?)
}

/// Largest file accepted as a download button attachment.
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// MIME type for an attachment, from its extension.
fn attachment_mime(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Read a file for a download button.
pub fn load_attachment(path: &Path) -> Result<FileAttachment, ImportError> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_ATTACHMENT_BYTES {
        return Err(ImportError::TooLarge {
            size,
            max: MAX_ATTACHMENT_BYTES,
        });
    }
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download")
        .to_string();
    let mime_type = attachment_mime(&name);
    Ok(FileAttachment {
        data_uri: format!("data:{};base64,{}", mime_type, BASE64_STANDARD.encode(&bytes)),
        mime_type: mime_type.to_string(),
        size,
        name,
    })
}

/// A single image becomes a one-section gallery.
pub fn image_document(title: &str, bytes: &[u8]) -> Result<ImportedDocument, ImportError> {
    let url = image_data_uri(bytes)?;
    Ok(ImportedDocument {
        title: title.to_string(),
        intro: Vec::new(),
        sections: vec![ImportedSection {
            icon: GALLERY_ICON.to_string(),
            name: "Gallery".to_string(),
            content: vec![ContentBlock::image(Some(url), None)],
        }],
    })
}

// ============================================================================
// Slideshows
// ============================================================================

/// Slide number from an archive path like `ppt/slides/slide12.xml`.
fn slide_number(path: &str) -> Option<u32> {
    path.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Text paragraphs (`<a:p>`) of one slide, in document order.
fn slide_paragraphs(xml: &str) -> Result<Vec<String>, ImportError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            XmlEvent::Start(e) => match e.local_name().as_ref() {
                b"p" => current = Some(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            XmlEvent::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(text) = current.take() {
                        let text = text.trim().to_string();
                        if !text.is_empty() {
                            paragraphs.push(text);
                        }
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            XmlEvent::Empty(e) if e.local_name().as_ref() == b"br" => {
                if let Some(text) = current.as_mut() {
                    text.push(' ');
                }
            }
            XmlEvent::Text(e) if in_text => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }
    Ok(paragraphs)
}

/// Slides in numeric order; each slide's first paragraph names its section
/// and the first slide's name doubles as the document title.
pub fn parse_pptx(bytes: &[u8], fallback_title: &str) -> Result<ImportedDocument, ImportError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let mut slide_paths: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    slide_paths.sort();
    if slide_paths.is_empty() {
        return Err(ImportError::Empty);
    }

    let mut slides = Vec::with_capacity(slide_paths.len());
    let mut total = 0u64;
    for (number, path) in &slide_paths {
        let entry = archive.by_name(path)?;
        if entry.size() > MAX_SLIDE_BYTES {
            return Err(ImportError::TooLarge {
                size: entry.size(),
                max: MAX_SLIDE_BYTES,
            });
        }
        // The declared size can lie; never read past the limit
        let mut xml = String::new();
        entry.take(MAX_SLIDE_BYTES + 1).read_to_string(&mut xml)?;
        let size = xml.len() as u64;
        if size > MAX_SLIDE_BYTES {
            return Err(ImportError::TooLarge {
                size,
                max: MAX_SLIDE_BYTES,
            });
        }
        total += size;
        if total > MAX_DOCUMENT_BYTES {
            return Err(ImportError::TooLarge {
                size: total,
                max: MAX_DOCUMENT_BYTES,
            });
        }
        slides.push((*number, slide_paragraphs(&xml)?));
    }

    let body = |paragraphs: &[String]| -> Vec<ContentBlock> {
        if paragraphs.is_empty() {
            Vec::new()
        } else {
            let markup: String = paragraphs.iter().map(|p| paragraph(p)).collect();
            vec![ContentBlock::text(markup, true)]
        }
    };

    let title = slides
        .first()
        .and_then(|(_, paragraphs)| paragraphs.first().cloned())
        .unwrap_or_else(|| fallback_title.to_string());

    let sections = slides
        .into_iter()
        .map(|(number, paragraphs)| match paragraphs.split_first() {
            Some((name, rest)) => ImportedSection::new(name.clone(), body(rest)),
            None => ImportedSection::new(format!("Slide {number}"), Vec::new()),
        })
        .collect();

    Ok(ImportedDocument {
        title,
        intro: Vec::new(),
        sections,
    })
}

// ============================================================================
// PDF
// ============================================================================

/// Text layer of each page in page order; the first line of the first page
/// with text is the title and each page with text becomes a section.
pub fn parse_pdf(bytes: &[u8], fallback_title: &str) -> Result<ImportedDocument, ImportError> {
    let document = lopdf::Document::load_mem(bytes)?;

    let mut title: Option<String> = None;
    let mut sections = Vec::new();
    for number in document.get_pages().into_keys() {
        let text = match document.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                warn!(page = number, error = %e, "skipping unreadable PDF page");
                continue;
            }
        };
        let mut lines = text.lines().skip_while(|l| l.trim().is_empty()).peekable();
        if lines.peek().is_none() {
            continue;
        }
        if title.is_none() {
            title = lines.next().map(|l| l.trim().to_string());
        }
        sections.push(ImportedSection::new(
            format!("Page {number}"),
            paragraph_blocks(lines),
        ));
    }

    if sections.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(ImportedDocument {
        title: title.unwrap_or_else(|| fallback_title.to_string()),
        intro: Vec::new(),
        sections,
    })
}
