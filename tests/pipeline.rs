//! End-to-end tests: import → edit → save → restore → export.
//!
//! These drive the library the way the CLI does, through `AppContext` and a
//! file-backed store in a temporary directory.

use docsite::app::{AppContext, NoticeLevel};
use docsite::buttons::{ButtonAction, ButtonKind, ButtonPatch};
use docsite::export::{self, ExportFormat};
use docsite::persistence::FileStore;
use docsite::project::Project;
use docsite::render;
use docsite::sections::Direction;
use docsite::settings::LayoutStyle;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn section_shape(project: &Project) -> Vec<(bool, String)> {
    project
        .sections
        .iter()
        .map(|s| (s.is_header, s.name.clone()))
        .collect()
}

fn assert_header_rule(project: &Project) {
    assert_eq!(project.header_count(), 1, "exactly one header");
    assert!(project.sections[0].is_header, "header at index 0");
}

const DOC: &str = "\
# Corner Bakery

Fresh bread every morning.

## Menu

- Sourdough
- Rye

## Hours

Open *daily* 7 to 3.

## Contact

Call 555-0100.
";

#[test]
fn markdown_import_edit_export() {
    let tmp = TempDir::new().unwrap();
    let doc = tmp.path().join("bakery.md");
    fs::write(&doc, DOC).unwrap();
    let project_file = tmp.path().join("site.json");
    let mut store = FileStore::open(&project_file);

    // Import
    let mut ctx = AppContext::restore(&store);
    ctx.import(&doc);
    assert_eq!(ctx.project.title, "Corner Bakery");
    assert_eq!(
        section_shape(&ctx.project),
        vec![
            (true, "Header".to_string()),
            (false, "Menu".to_string()),
            (false, "Hours".to_string()),
            (false, "Contact".to_string()),
        ]
    );
    let notices = ctx.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Info);

    // Edit
    assert!(ctx.move_section(3, Direction::Up));
    assert!(ctx.rename_section(2, "Find us"));
    assert!(ctx.apply_show_icon_toggle(1, false));
    let id = ctx.add_button(ButtonKind::Link).unwrap();
    assert!(ctx.update_button(
        &id,
        ButtonPatch {
            label: Some("Order online".into()),
            href: Some("bakery.example".into()),
            ..ButtonPatch::default()
        }
    ));
    ctx.update_settings(|s| {
        s.layout_style = LayoutStyle::Sections;
        Ok::<_, std::convert::Infallible>(())
    });
    assert_header_rule(&ctx.project);
    assert!(ctx.drain_notices().is_empty());
    assert!(ctx.save_now(&mut store).unwrap());

    // Restore in a "new session"
    let restored = AppContext::restore(&FileStore::open(&project_file));
    assert_eq!(restored.project, ctx.project);
    assert_eq!(restored.settings, ctx.settings);
    assert_eq!(
        section_shape(&restored.project)
            .into_iter()
            .map(|(_, n)| n)
            .collect::<Vec<_>>(),
        vec!["Header", "Menu", "Find us", "Hours"]
    );

    // Export html
    let out = tmp.path().join("dist");
    let report = export::export(&restored.project, &restored.settings, ExportFormat::Html, &out)
        .unwrap();
    assert_eq!(report.files.len(), 1);
    let html = fs::read_to_string(out.join("index.html")).unwrap();
    assert!(html.contains("<h1>Corner Bakery</h1>"));
    assert!(html.contains("<li>Sourdough</li>"));
    assert!(html.contains("section-nav"));
    assert!(html.contains("href=\"https://bakery.example\""));
    assert!(html.contains("Order online"));
    let menu = html.find(">Menu<").unwrap();
    let find_us = html.find("Find us").unwrap();
    assert!(menu < find_us);

    // Export react
    let react = tmp.path().join("react");
    let report = export::export(&restored.project, &restored.settings, ExportFormat::React, &react)
        .unwrap();
    assert_eq!(report.files.len(), 5 + restored.project.sections.len());
    assert!(react.join("src/sections/FindUs.jsx").is_file());
}

#[test]
fn legacy_settings_migrate_on_restore() {
    let tmp = TempDir::new().unwrap();
    let project_file = tmp.path().join("site.json");
    fs::write(
        &project_file,
        r##"{
  "project": {
    "title": "Legacy",
    "sections": [
      { "id": "h", "name": "Header", "icon": "🏠", "isHeader": true,
        "content": [ { "type": "text", "id": "t", "value": "<h1>Legacy</h1>", "allowHtml": true } ] },
      { "id": "a", "name": "About", "icon": "📄", "isHeader": false, "content": [] }
    ]
  },
  "settings": {
    "primaryColor": "#16a34a",
    "uploadedFile": { "name": "a.pdf", "size": 3, "type": "application/pdf", "data": "data:application/pdf;base64,AAAA" },
    "contactButtonUrl": "foo@bar.com"
  }
}"##,
    )
    .unwrap();

    let mut store = FileStore::open(&project_file);
    let mut ctx = AppContext::restore(&store);
    let buttons = &ctx.settings.buttons;
    assert_eq!(buttons.len(), 2);
    assert_eq!(buttons[0].kind(), ButtonKind::File);
    assert_eq!(buttons[0].label, "Download");
    assert!(matches!(
        &buttons[0].action,
        ButtonAction::File { file: Some(f) } if f.name == "a.pdf"
    ));
    assert_eq!(buttons[1].label, "Contact Us");
    assert_eq!(
        buttons[1].action,
        ButtonAction::Email {
            email: "foo@bar.com".into()
        }
    );
    assert_eq!(ctx.project.sections[1].show_icon, Some(true));

    // Saving writes only the new shape
    ctx.save_now(&mut store).unwrap();
    let saved = fs::read_to_string(&project_file).unwrap();
    assert!(!saved.contains("uploadedFile"));
    assert!(!saved.contains("contactButtonUrl"));

    // Loading again yields the same buttons
    let again = AppContext::restore(&FileStore::open(&project_file));
    assert_eq!(again.settings.buttons, ctx.settings.buttons);
}

#[test]
fn deleting_down_to_the_header() {
    let mut ctx = AppContext::blank();
    assert_eq!(ctx.project.sections.len(), 2);
    assert!(ctx.delete_section(1));
    assert_eq!(section_shape(&ctx.project), vec![(true, "Header".to_string())]);

    assert!(!ctx.delete_section(0));
    let notices = ctx.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(ctx.project.sections.len(), 1);
}

#[test]
fn header_rule_survives_edit_sequences() {
    let mut ctx = AppContext::blank();
    // Deterministic pseudo-random operation stream
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = |bound: usize| {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        (seed % bound as u64) as usize
    };

    for _ in 0..400 {
        let len = ctx.project.sections.len();
        match next(5) {
            0 | 1 => {
                ctx.add_section();
            }
            2 => {
                ctx.delete_section(next(len));
            }
            3 => {
                ctx.move_section(next(len), Direction::Up);
            }
            _ => {
                ctx.move_section(next(len), Direction::Down);
            }
        }
        assert_header_rule(&ctx.project);
    }
}

#[test]
fn boundary_moves_leave_order_unchanged() {
    let mut ctx = AppContext::blank();
    ctx.add_section();
    ctx.add_text(1);
    let ids: Vec<String> = ctx.project.sections.iter().map(|s| s.id.clone()).collect();

    assert!(!ctx.move_section(1, Direction::Up));
    assert!(!ctx.move_section(2, Direction::Down));
    let after: Vec<String> = ctx.project.sections.iter().map(|s| s.id.clone()).collect();
    assert_eq!(after, ids);

    let blocks: Vec<String> = ctx.project.sections[1]
        .content
        .iter()
        .map(|b| b.id().to_string())
        .collect();
    assert!(!ctx.move_content(1, 0, Direction::Up));
    assert!(!ctx.move_content(1, blocks.len() - 1, Direction::Down));
    let after: Vec<String> = ctx.project.sections[1]
        .content
        .iter()
        .map(|b| b.id().to_string())
        .collect();
    assert_eq!(after, blocks);
}

#[test]
fn settings_overlay_changes_rendering() {
    let tmp = TempDir::new().unwrap();
    let overlay = tmp.path().join("settings.toml");
    fs::write(
        &overlay,
        "primaryColor = \"#facc15\"\nlayoutStyle = \"menu\"\ndarkMode = true\n",
    )
    .unwrap();

    let mut ctx = AppContext::blank();
    assert!(ctx.apply_settings_file(&overlay));
    assert_eq!(ctx.settings.layout_style, LayoutStyle::Menu);

    let preview = ctx.preview();
    assert!(preview.contains("--color-on-primary: #111111"));
    assert!(preview.contains("menu-toggle"));

    fs::write(&overlay, "primaryColour = \"#000\"\n").unwrap();
    assert!(!ctx.apply_settings_file(&overlay));
    assert_eq!(ctx.settings.primary_color, "#facc15");
}

#[test]
fn failed_import_still_yields_a_project() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("brochure.pdf");
    fs::write(&pdf, b"%PDF-1.4").unwrap();

    let mut ctx = AppContext::blank();
    ctx.import(&pdf);
    assert_header_rule(&ctx.project);
    assert_eq!(ctx.project.title, "brochure");
    assert_eq!(ctx.project.sections.len(), 2);
    let notices = ctx.drain_notices();
    assert_eq!(notices[0].level, NoticeLevel::Error);

    let page = render::render_document(&ctx.project, &ctx.settings, false).into_string();
    assert!(page.contains("<h1>brochure</h1>"));
}
