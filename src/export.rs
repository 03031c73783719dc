//! Export targets: write the rendered site to a directory.
//!
//! Two targets share the render rules in [`crate::render`]:
//!
//! ```text
//! html                    react
//! └── index.html          ├── package.json
//!                         ├── index.html
//!                         └── src/
//!                             ├── main.jsx
//!                             ├── App.jsx
//!                             ├── styles.css
//!                             └── sections/
//!                                 ├── Header.jsx
//!                                 └── <Section>.jsx …
//! ```
//!
//! The `html` target is one self-contained page with the analytics snippet
//! in `<head>`. The `react` target is a Vite project; every section becomes
//! a component that embeds the section's rendered markup, so both targets
//! look the same in a browser.
//!
//! Exporting only reads the project and settings.

use crate::project::{Project, Section};
use crate::render;
use crate::settings::Settings;
use crate::slug::{component_name, slugify};
use maud::{DOCTYPE, PreEscaped, html};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown export format '{0}' (expected html or react)")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    React,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ExportFormat::Html),
            "react" => Ok(ExportFormat::React),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Html => "html",
            ExportFormat::React => "react",
        })
    }
}

/// Files written by a successful export, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub format: ExportFormat,
    pub files: Vec<PathBuf>,
}

/// Success flag plus error text, for callers that only show a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub success: bool,
    pub error: Option<String>,
}

/// Export to `out_dir`, creating it if needed.
pub fn export(
    project: &Project,
    settings: &Settings,
    format: ExportFormat,
    out_dir: &Path,
) -> Result<ExportReport, ExportError> {
    fs::create_dir_all(out_dir)?;
    let files = match format {
        ExportFormat::Html => export_html(project, settings, out_dir)?,
        ExportFormat::React => export_react(project, settings, out_dir)?,
    };
    info!(%format, files = files.len(), out = %out_dir.display(), "export complete");
    Ok(ExportReport { format, files })
}

/// Export by format name, folding any failure into an [`ExportOutcome`].
pub fn export_named(
    project: &Project,
    settings: &Settings,
    format_name: &str,
    out_dir: &Path,
) -> ExportOutcome {
    let result = format_name
        .parse::<ExportFormat>()
        .and_then(|format| export(project, settings, format, out_dir));
    match result {
        Ok(_) => ExportOutcome {
            success: true,
            error: None,
        },
        Err(e) => {
            warn!(format = format_name, error = %e, "export failed");
            ExportOutcome {
                success: false,
                error: Some(e.to_string()),
            }
        }
    }
}

fn write_file(out_dir: &Path, rel: &str, contents: &str) -> Result<PathBuf, ExportError> {
    let path = out_dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(PathBuf::from(rel))
}

// ============================================================================
// html
// ============================================================================

fn export_html(
    project: &Project,
    settings: &Settings,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    let page = render::render_document(project, settings, true);
    Ok(vec![write_file(out_dir, "index.html", &page.into_string())?])
}

// ============================================================================
// react
// ============================================================================

/// Identifiers `App.jsx` defines itself.
const APP_BINDINGS: [&str; 2] = ["App", "Markup"];

/// Unique component names in section order, suffixing repeats (`About2`).
/// Names never collide with [`APP_BINDINGS`].
fn component_names(sections: &[Section]) -> Vec<String> {
    let mut seen: HashSet<String> = APP_BINDINGS.iter().map(|b| b.to_string()).collect();
    sections
        .iter()
        .map(|section| {
            let base = component_name(&section.name);
            let mut name = base.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{base}{n}");
                n += 1;
            }
            name
        })
        .collect()
}

/// A JavaScript string literal for `text`.
fn js_string(text: &str) -> Result<String, ExportError> {
    Ok(serde_json::to_string(text)?)
}

fn package_json(project: &Project) -> Result<String, ExportError> {
    let slug = slugify(&project.title);
    let name = if slug.is_empty() {
        "docsite-export".to_string()
    } else {
        slug
    };
    let package = serde_json::json!({
        "name": name,
        "private": true,
        "version": "0.1.0",
        "type": "module",
        "scripts": {
            "dev": "vite",
            "build": "vite build",
            "preview": "vite preview"
        },
        "dependencies": {
            "react": "^18.3.1",
            "react-dom": "^18.3.1"
        },
        "devDependencies": {
            "@vitejs/plugin-react": "^4.3.1",
            "vite": "^5.4.0"
        }
    });
    Ok(serde_json::to_string_pretty(&package)? + "\n")
}

fn react_index_html(project: &Project, settings: &Settings) -> String {
    let analytics = settings.analytics_code.trim();
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (project.title) }
                @if !analytics.is_empty() {
                    (PreEscaped(analytics))
                }
            }
            body {
                div id="root" {}
                script type="module" src="/src/main.jsx" {}
            }
        }
    }
    .into_string()
}

const MAIN_JSX: &str = r#"import React from "react";
import ReactDOM from "react-dom/client";
import App from "./App.jsx";
import "./styles.css";

ReactDOM.createRoot(document.getElementById("root")).render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);
"#;

fn section_component(name: &str, markup: &str) -> Result<String, ExportError> {
    Ok(format!(
        r#"const markup = {};

export default function {name}() {{
  return <div style={{{{ display: "contents" }}}} dangerouslySetInnerHTML={{{{ __html: markup }}}} />;
}}
"#,
        js_string(markup)?
    ))
}

fn app_jsx(
    project: &Project,
    settings: &Settings,
    names: &[String],
) -> Result<String, ExportError> {
    let mut out = String::new();
    for name in names {
        out.push_str(&format!("import {name} from \"./sections/{name}.jsx\";\n"));
    }
    out.push_str(&format!(
        "\nconst nav = {};\nconst footer = {};\n\n",
        js_string(&render::render_nav(project, settings).into_string())?,
        js_string(&render::render_footer(settings).into_string())?
    ));
    out.push_str(
        "function Markup({ html }) {\n  \
         return html ? <div style={{ display: \"contents\" }} dangerouslySetInnerHTML={{ __html: html }} /> : null;\n\
         }\n\n",
    );

    out.push_str("export default function App() {\n  return (\n    <div className=\"docsite\">\n");
    out.push_str("      <Markup html={nav} />\n");
    for (section, name) in project.sections.iter().zip(names) {
        if section.is_header {
            out.push_str(&format!("      <{name} />\n"));
        }
    }
    out.push_str("      <main className=\"site-main\">\n");
    for (section, name) in project.sections.iter().zip(names) {
        if !section.is_header {
            out.push_str(&format!("        <{name} />\n"));
        }
    }
    out.push_str("      </main>\n      <Markup html={footer} />\n    </div>\n  );\n}\n");
    Ok(out)
}

fn export_react(
    project: &Project,
    settings: &Settings,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    let names = component_names(&project.sections);
    let mut files = vec![
        write_file(out_dir, "package.json", &package_json(project)?)?,
        write_file(out_dir, "index.html", &react_index_html(project, settings))?,
        write_file(out_dir, "src/main.jsx", MAIN_JSX)?,
        write_file(out_dir, "src/App.jsx", &app_jsx(project, settings, &names)?)?,
        write_file(out_dir, "src/styles.css", &render::site_css(settings))?,
    ];

    let anchors = render::section_anchors(project);
    for ((section, name), anchor) in project.sections.iter().zip(&names).zip(&anchors) {
        let markup = if section.is_header {
            render::render_header(project, section, anchor)
        } else {
            render::render_section(section, anchor)
        };
        let rel = format!("src/sections/{name}.jsx");
        files.push(write_file(
            out_dir,
            &rel,
            &section_component(name, &markup.into_string())?,
        )?);
    }
    Ok(files)
}
