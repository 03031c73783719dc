//! Markup generation for preview and export.
//!
//! Pure functions from `(Project, Settings)` to HTML. Nothing here touches a
//! document, a window or the filesystem; the live preview and every export
//! target call the same functions and only differ in how the result is
//! wrapped:
//!
//! - [`render_preview`]: a self-contained fragment (`<div class="docsite">`
//!   with its own `<style>`), meant for a sandboxed frame.
//! - [`render_document`]: a full HTML document with the styles inlined and,
//!   for exports, the analytics snippet in `<head>`.
//!
//! ## Page Structure
//!
//! ```text
//! nav                 (per layout: none | sticky bar | hamburger menu)
//! header.site-header  (header section: logo + content, no name or icon)
//! main.site-main
//!   section.site-section × N   (icon + name heading, then content blocks)
//! footer.site-footer  (single layout only: the buttons)
//! ```
//!
//! ## Trust Model
//!
//! Text blocks in regular sections and image captions are editor output and
//! are inserted as markup. Header text blocks honor their `allow_html` flag:
//! untrusted ones are escaped and wrapped in a paragraph. Names, labels,
//! titles and URLs go through maud's escaping.
//!
//! No JavaScript is emitted. The hamburger menu is a checkbox + label pair,
//! buttons are plain links (`download`, `target="_blank"`, `mailto:`).

use crate::buttons::{Button, ButtonAction};
use crate::project::{ContentBlock, Project, Section};
use crate::settings::{self, LayoutStyle, Settings};
use crate::slug::slugify;
use std::collections::HashSet;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../static/site.css");

/// Title used when the project has none.
const UNTITLED: &str = "Untitled site";

/// Theme variables followed by the static base styles.
pub fn site_css(settings: &Settings) -> String {
    format!("{}\n\n{}", settings::generate_theme_css(settings), CSS_STATIC)
}

/// Fragment ids (`#…` link targets) for every section, in order.
///
/// Ids are slugified; an id with nothing left falls back to `section-N`,
/// and repeats within the page get a `-2`, `-3` suffix.
pub fn section_anchors(project: &Project) -> Vec<String> {
    let mut seen = HashSet::new();
    project
        .sections
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let slug = slugify(&section.id);
            let base = if slug.is_empty() {
                format!("section-{}", i + 1)
            } else {
                slug
            };
            let mut anchor = base.clone();
            let mut n = 2;
            while !seen.insert(anchor.clone()) {
                anchor = format!("{base}-{n}");
                n += 1;
            }
            anchor
        })
        .collect()
}

/// Prefix `https://` when a link has no scheme.
///
/// In-page (`#…`) and root-relative (`/…`) links are left alone. A blank
/// link becomes `#`.
pub fn normalize_link(href: &str) -> String {
    let trimmed = href.trim();
    if trimmed.is_empty() {
        return "#".to_string();
    }
    if has_scheme(trimmed) || trimmed.starts_with('#') || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn has_scheme(link: &str) -> bool {
    let Some((scheme, rest)) = link.split_once(':') else {
        return false;
    };
    let well_formed = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    // `host:port` also parses as a scheme, so require `//` unless the
    // scheme is one that never has it.
    well_formed
        && (rest.starts_with("//")
            || matches!(
                scheme.to_ascii_lowercase().as_str(),
                "mailto" | "tel" | "sms" | "data"
            ))
}

/// `mailto:` URL for an address.
pub fn mailto(email: &str) -> String {
    let address = email.trim();
    let address = address.strip_prefix("mailto:").unwrap_or(address);
    format!("mailto:{address}")
}

// ============================================================================
// Components
// ============================================================================

/// Icon (unless hidden) followed by the section name.
fn section_label(section: &Section) -> Markup {
    html! {
        @if section.shows_icon() && !section.icon.is_empty() {
            span.section-icon aria-hidden="true" { (section.icon) }
        }
        (section.name)
    }
}

/// One navigation link per non-header section.
fn nav_links(project: &Project, anchors: &[String]) -> Markup {
    html! {
        @for (section, anchor) in project.sections.iter().zip(anchors) {
            @if !section.is_header {
                a.nav-link href={ "#" (anchor) } { (section_label(section)) }
            }
        }
    }
}

/// Renders the navigation for the selected layout (empty for `single`).
pub fn render_nav(project: &Project, settings: &Settings) -> Markup {
    let anchors = section_anchors(project);
    match settings.layout_style {
        LayoutStyle::Single => html! {},
        LayoutStyle::Sections => html! {
            nav.section-nav {
                div.nav-links { (nav_links(project, &anchors)) }
                (render_buttons(&settings.buttons))
            }
        },
        LayoutStyle::Menu => html! {
            input.menu-toggle type="checkbox" id="menu-toggle";
            label.menu-trigger for="menu-toggle" aria-label="Menu" {
                span.menu-line {}
                span.menu-line {}
                span.menu-line {}
            }
            nav.menu-panel {
                (nav_links(project, &anchors))
                @if !settings.buttons.is_empty() {
                    hr.menu-divider;
                    (render_buttons(&settings.buttons))
                }
            }
        },
    }
}

/// Renders a single call-to-action.
///
/// A button whose target is not filled in yet renders disabled rather than
/// disappearing, so the user sees it in the preview.
pub fn render_button(button: &Button) -> Markup {
    let label = button.display_label();
    match &button.action {
        ButtonAction::File { file: Some(file) } if !file.data_uri.is_empty() => html! {
            a.site-button.button-file href=(file.data_uri) download=(file.name) { (label) }
        },
        ButtonAction::Link { href } if !href.trim().is_empty() => html! {
            a.site-button.button-link href=(normalize_link(href)) target="_blank" rel="noopener noreferrer" {
                (label)
            }
        },
        ButtonAction::Email { email } if !email.trim().is_empty() => html! {
            a.site-button.button-email href=(mailto(email)) { (label) }
        },
        _ => html! {
            a.site-button href="#" aria-disabled="true" { (label) }
        },
    }
}

/// Renders the button row, or nothing when there are no buttons.
pub fn render_buttons(buttons: &[Button]) -> Markup {
    html! {
        @if !buttons.is_empty() {
            div.site-buttons {
                @for button in buttons {
                    (render_button(button))
                }
            }
        }
    }
}

fn render_image(url: Option<&str>, caption: Option<&str>, alt: &str) -> Markup {
    let url = url.filter(|u| !u.is_empty());
    let caption = caption.filter(|c| !c.trim().is_empty());
    html! {
        @if url.is_some() || caption.is_some() {
            figure.image-block {
                @if let Some(src) = url {
                    img src=(src) alt=(alt) loading="lazy";
                }
                @if let Some(caption) = caption {
                    figcaption { (PreEscaped(caption)) }
                }
            }
        }
    }
}

fn render_block(block: &ContentBlock, in_header: bool, alt: &str) -> Markup {
    match block {
        ContentBlock::Text {
            value, allow_html, ..
        } => {
            if !in_header || *allow_html {
                html! { div.text-block { (PreEscaped(value)) } }
            } else {
                html! { div.text-block { p { (value) } } }
            }
        }
        ContentBlock::Image { url, caption, .. } => {
            render_image(url.as_deref(), caption.as_deref(), alt)
        }
    }
}

/// Renders the header section: logo and content only, no name or icon.
pub fn render_header(project: &Project, section: &Section, anchor: &str) -> Markup {
    let alt = project.title.as_str();
    html! {
        header.site-header id=(anchor) {
            @if let Some(logo) = project.logo_url.as_deref().filter(|l| !l.is_empty()) {
                img.site-logo src=(logo) alt={ (alt) " logo" };
            }
            @for block in &section.content {
                (render_block(block, true, alt))
            }
        }
    }
}

/// Renders a regular section: heading, then content blocks in order.
pub fn render_section(section: &Section, anchor: &str) -> Markup {
    html! {
        section.site-section id=(anchor) {
            h2.section-title { (section_label(section)) }
            @for block in &section.content {
                (render_block(block, false, &section.name))
            }
        }
    }
}

/// Renders everything that goes inside the page body.
pub fn render_page(project: &Project, settings: &Settings) -> Markup {
    let anchors = section_anchors(project);
    let sections = || project.sections.iter().zip(&anchors);
    html! {
        (render_nav(project, settings))
        @for (section, anchor) in sections().filter(|(s, _)| s.is_header) {
            (render_header(project, section, anchor))
        }
        main.site-main {
            @for (section, anchor) in sections().filter(|(s, _)| !s.is_header) {
                (render_section(section, anchor))
            }
        }
        (render_footer(settings))
    }
}

/// Footer holding the buttons. Only the single layout has one; the other
/// layouts show buttons in their navigation.
pub fn render_footer(settings: &Settings) -> Markup {
    html! {
        @if settings.layout_style == LayoutStyle::Single && !settings.buttons.is_empty() {
            footer.site-footer {
                (render_buttons(&settings.buttons))
            }
        }
    }
}

/// Self-contained fragment for a sandboxed preview frame.
pub fn render_preview(project: &Project, settings: &Settings) -> Markup {
    html! {
        div.docsite {
            style { (PreEscaped(site_css(settings))) }
            (render_page(project, settings))
        }
    }
}

/// Full standalone HTML document.
///
/// `with_analytics` inserts the raw analytics snippet at the end of
/// `<head>`; previews leave it out.
pub fn render_document(project: &Project, settings: &Settings, with_analytics: bool) -> Markup {
    let title = if project.title.trim().is_empty() {
        UNTITLED
    } else {
        project.title.as_str()
    };
    let analytics = settings.analytics_code.trim();
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(site_css(settings))) }
                @if with_analytics && !analytics.is_empty() {
                    (PreEscaped(analytics))
                }
            }
            body.docsite {
                (render_page(project, settings))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::{ButtonKind, FileAttachment};
    use crate::test_helpers::*;

    fn sample() -> Project {
        let mut project = project_with(&[(true, "Header"), (false, "About"), (false, "Team")]);
        project.sections[0].content = vec![ContentBlock::text("<h1>Test Site</h1>", true)];
        project.sections[1].content = vec![
            ContentBlock::text("<p>We <strong>build</strong> things.</p>", false),
            ContentBlock::image(
                Some("data:image/png;base64,AAAA".into()),
                Some("<em>Our office</em>".into()),
            ),
        ];
        project
    }

    fn with_layout(layout: LayoutStyle) -> Settings {
        Settings {
            layout_style: layout,
            ..Settings::default()
        }
    }

    fn link_button(label: &str, href: &str) -> Button {
        Button {
            id: "b-link".into(),
            label: label.into(),
            action: ButtonAction::Link { href: href.into() },
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn single_layout_has_no_nav() {
        let html = render_nav(&sample(), &with_layout(LayoutStyle::Single)).into_string();
        assert!(html.is_empty());
    }

    #[test]
    fn sections_nav_links_every_body_section() {
        let project = sample();
        let html = render_nav(&project, &with_layout(LayoutStyle::Sections)).into_string();
        assert!(html.contains("section-nav"));
        assert!(html.contains("About"));
        assert!(html.contains("Team"));
        let anchors = section_anchors(&project);
        assert!(html.contains(&format!("href=\"#{}\"", anchors[1])));
        // The header is not a labelled nav entry
        assert_eq!(html.matches(r#"class="nav-link""#).count(), 2);
    }

    #[test]
    fn nav_hides_icon_when_disabled() {
        let mut project = sample();
        project.sections[1].icon = "👋".into();
        project.sections[2].icon = "👥".into();
        project.sections[2].show_icon = Some(false);
        let html = render_nav(&project, &with_layout(LayoutStyle::Sections)).into_string();
        assert!(html.contains("👋"));
        assert!(!html.contains("👥"));
    }

    #[test]
    fn legacy_section_without_show_icon_renders_icon() {
        let mut project = sample();
        project.sections[1].icon = "👋".into();
        project.sections[1].show_icon = None;
        let html = render_section(&project.sections[1], "about").into_string();
        assert!(html.contains("👋"));
    }

    #[test]
    fn menu_layout_has_toggle_divider_and_buttons() {
        let mut settings = with_layout(LayoutStyle::Menu);
        settings.buttons.push(link_button("Docs", "example.com"));
        let html = render_nav(&sample(), &settings).into_string();
        assert!(html.contains(r#"type="checkbox""#));
        assert!(html.contains("menu-trigger"));
        assert!(html.contains("menu-divider"));
        assert!(html.contains("Docs"));
    }

    #[test]
    fn menu_without_buttons_has_no_divider() {
        let html = render_nav(&sample(), &with_layout(LayoutStyle::Menu)).into_string();
        assert!(!html.contains("menu-divider"));
    }

    // =========================================================================
    // Sections
    // =========================================================================

    #[test]
    fn header_shows_content_without_name_or_icon() {
        let mut project = sample();
        project.sections[0].name = "Hidden Header Name".into();
        let html = render_header(&project, &project.sections[0], "top").into_string();
        assert!(html.contains("<h1>Test Site</h1>"));
        assert!(!html.contains("Hidden Header Name"));
        assert!(!html.contains("section-icon"));
    }

    #[test]
    fn header_escapes_untrusted_text() {
        let mut project = sample();
        project.sections[0]
            .content
            .push(ContentBlock::text("<script>alert(1)</script>", false));
        let html = render_header(&project, &project.sections[0], "top").into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"));
    }

    #[test]
    fn header_includes_logo() {
        let mut project = sample();
        project.logo_url = Some("data:image/png;base64,LOGO".into());
        let html = render_header(&project, &project.sections[0], "top").into_string();
        assert!(html.contains(r#"class="site-logo""#));
        assert!(html.contains(r#"src="data:image/png;base64,LOGO""#));
        assert!(html.contains(r#"alt="Test Site logo""#));
    }

    #[test]
    fn body_section_renders_heading_text_and_image() {
        let project = sample();
        let html = render_section(&project.sections[1], "about").into_string();
        assert!(html.contains("section-title"));
        assert!(html.contains("About"));
        assert!(html.contains("<strong>build</strong>"));
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
        assert!(html.contains("<figcaption><em>Our office</em></figcaption>"));
    }

    #[test]
    fn empty_image_block_renders_nothing() {
        let section = Section::new("Gallery", "🖼").with_content(vec![ContentBlock::image(None, None)]);
        let html = render_section(&section, "s").into_string();
        assert!(!html.contains("figure"));
    }

    #[test]
    fn section_names_are_escaped() {
        let section = Section::new("<b>Bold</b>", "");
        let html = render_section(&section, "s").into_string();
        assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt;"));
    }

    #[test]
    fn anchors_are_unique_within_a_page() {
        let mut project = project_with(&[(true, "Header"), (false, "A"), (false, "B"), (false, "C")]);
        project.sections[1].id = "intro".into();
        project.sections[2].id = "Intro".into();
        project.sections[3].id = "ünï".into();
        project.sections[0].id = "✨".into();
        let anchors = section_anchors(&project);
        assert_eq!(anchors[1], "intro");
        assert_eq!(anchors[2], "intro-2");
        assert_eq!(anchors[0], "section-1");
        let unique: HashSet<&String> = anchors.iter().collect();
        assert_eq!(unique.len(), anchors.len());

        let page = render_page(&project, &with_layout(LayoutStyle::Sections)).into_string();
        assert!(page.contains(r##"href="#intro-2""##));
        assert!(page.contains(r#"id="intro-2""#));
    }

    #[test]
    fn page_orders_header_before_sections() {
        let html = render_page(&sample(), &Settings::default()).into_string();
        let header = html.find("site-header").unwrap();
        let about = html.find("About").unwrap();
        let team = html.find("Team").unwrap();
        assert!(header < about && about < team);
    }

    // =========================================================================
    // Buttons
    // =========================================================================

    #[test]
    fn link_button_gets_scheme() {
        let html = render_button(&link_button("Docs", "example.com/docs")).into_string();
        assert!(html.contains(r#"href="https://example.com/docs""#));
        assert!(html.contains(r#"target="_blank""#));
    }

    #[test]
    fn file_button_downloads_data_uri() {
        let button = Button {
            id: "f".into(),
            label: String::new(),
            action: ButtonAction::File {
                file: Some(FileAttachment {
                    name: "brochure.pdf".into(),
                    size: 4,
                    mime_type: "application/pdf".into(),
                    data_uri: "data:application/pdf;base64,JVBE".into(),
                }),
            },
        };
        let html = render_button(&button).into_string();
        assert!(html.contains(r#"href="data:application/pdf;base64,JVBE""#));
        assert!(html.contains(r#"download="brochure.pdf""#));
        assert!(html.contains(">Download<"));
    }

    #[test]
    fn email_button_uses_mailto() {
        let mut button = Button::new(ButtonKind::Email);
        button.action = ButtonAction::Email {
            email: "hi@example.com".into(),
        };
        let html = render_button(&button).into_string();
        assert!(html.contains(r#"href="mailto:hi@example.com""#));
        assert!(html.contains("Email us"));
    }

    #[test]
    fn unfilled_button_renders_disabled() {
        let html = render_button(&Button::new(ButtonKind::Link)).into_string();
        assert!(html.contains(r#"aria-disabled="true""#));
        assert!(html.contains("Visit site"));
    }

    #[test]
    fn single_layout_puts_buttons_in_footer() {
        let mut settings = Settings::default();
        settings.buttons.push(link_button("Docs", "example.com"));
        let html = render_page(&sample(), &settings).into_string();
        assert!(html.contains("site-footer"));

        settings.layout_style = LayoutStyle::Sections;
        let html = render_page(&sample(), &settings).into_string();
        assert!(!html.contains("site-footer"));
        assert!(html.contains("Docs"));
    }

    // =========================================================================
    // Links
    // =========================================================================

    #[test]
    fn normalize_link_cases() {
        assert_eq!(normalize_link("example.com"), "https://example.com");
        assert_eq!(normalize_link("http://example.com"), "http://example.com");
        assert_eq!(normalize_link(" https://x.io "), "https://x.io");
        assert_eq!(normalize_link("localhost:8080"), "https://localhost:8080");
        assert_eq!(normalize_link("tel:+123"), "tel:+123");
        assert_eq!(normalize_link("#about"), "#about");
        assert_eq!(normalize_link(""), "#");
    }

    #[test]
    fn mailto_does_not_double_prefix() {
        assert_eq!(mailto("a@b.c"), "mailto:a@b.c");
        assert_eq!(mailto("mailto:a@b.c"), "mailto:a@b.c");
    }

    // =========================================================================
    // Documents
    // =========================================================================

    #[test]
    fn document_includes_doctype_and_inline_styles() {
        let doc = render_document(&sample(), &Settings::default(), false).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Test Site</title>"));
        assert!(doc.contains("--color-primary: #2563eb"));
        assert!(doc.contains(r#"<body class="docsite">"#));
        assert!(!doc.contains("<link"));
    }

    #[test]
    fn analytics_only_when_requested() {
        let settings = Settings {
            analytics_code: "<script>track()</script>".into(),
            ..Settings::default()
        };
        let exported = render_document(&sample(), &settings, true).into_string();
        assert!(exported.contains("<script>track()</script></head>"));
        let previewed = render_document(&sample(), &settings, false).into_string();
        assert!(!previewed.contains("track()"));
    }

    #[test]
    fn preview_is_self_contained_fragment() {
        let html = render_preview(&sample(), &Settings::default()).into_string();
        assert!(html.starts_with(r#"<div class="docsite"><style>"#));
        assert!(!html.contains("<!DOCTYPE"));
        assert!(html.contains("site-main"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let project = sample();
        let settings = with_layout(LayoutStyle::Menu);
        assert_eq!(
            render_document(&project, &settings, true).into_string(),
            render_document(&project, &settings, true).into_string()
        );
    }
}
