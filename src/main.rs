use clap::{Parser, Subcommand};
use docsite::app::{AppContext, NoticeLevel};
use docsite::buttons::{ButtonKind, ButtonPatch};
use docsite::export::{self, ExportFormat};
use docsite::persistence::FileStore;
use docsite::sections::Direction;
use docsite::{import, output, render, settings};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "docsite")]
#[command(about = "Turn documents into small websites")]
#[command(long_about = "\
Turn documents into small websites

Import a document, edit its sections, pick a style, and export a static
page or a React project. The project is kept in a JSON file (--project)
between commands.

Supported imports:

  .md .markdown      # First '#' heading is the title, each '##' a section
  .txt               # First line is the title, paragraphs follow
  .png .jpg .gif .webp  # A gallery section holding the image
  .pptx              # One section per slide
  .pdf               # Text layer only, one section per page

Positions are 0-based; section 0 is always the header. Run 'docsite show'
to see positions and button ids.

Run 'docsite gen-settings' to generate a documented settings.toml.")]
#[command(version)]
struct Cli {
    /// Project file
    #[arg(long, default_value = "site.json", global = true)]
    project: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a new blank project
    New {
        /// Site title
        #[arg(long)]
        title: Option<String>,
    },
    /// Replace the project with an imported document
    Import { file: PathBuf },
    /// Print the project outline
    Show,
    /// Set the site title
    Title { title: String },
    /// Set or remove the header logo
    Logo {
        /// Image file (png, jpg, gif, webp; max 5 MiB)
        file: Option<PathBuf>,
        #[arg(long, conflicts_with = "file")]
        remove: bool,
    },
    /// Edit sections
    #[command(subcommand)]
    Section(SectionCommand),
    /// Edit content blocks within a section
    #[command(subcommand)]
    Content(ContentCommand),
    /// Edit call-to-action buttons (max 3)
    #[command(subcommand)]
    Button(ButtonCommand),
    /// Apply a settings.toml overlay, or print current settings
    Settings {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Write a standalone preview page
    Preview {
        #[arg(long, default_value = "preview.html")]
        out: PathBuf,
        /// Print the embeddable fragment to stdout instead
        #[arg(long)]
        fragment: bool,
    },
    /// Export the site
    Export {
        #[arg(long, default_value = "html")]
        format: ExportFormat,
        #[arg(long, default_value = "dist")]
        out: PathBuf,
    },
    /// Print a stock settings.toml with all options documented
    GenSettings,
    /// Delete the project file
    Clear,
}

#[derive(Subcommand)]
enum SectionCommand {
    /// Append a new section
    Add,
    Delete { index: usize },
    Move { index: usize, direction: Direction },
    Rename { index: usize, name: String },
    /// Set the icon glyph
    Icon { index: usize, icon: String },
    /// Show or hide the icon
    ShowIcon {
        index: usize,
        #[arg(action = clap::ArgAction::Set)]
        show: bool,
    },
    /// Fold or unfold in the editor
    Collapse {
        index: usize,
        #[arg(action = clap::ArgAction::Set)]
        collapsed: bool,
    },
}

#[derive(Subcommand)]
enum ContentCommand {
    /// Append a placeholder text block
    AddText { section: usize },
    /// Append an image block, optionally from a file
    AddImage {
        section: usize,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        caption: Option<String>,
    },
    /// Replace a text block's markup
    SetText {
        section: usize,
        content: usize,
        value: String,
    },
    Delete { section: usize, content: usize },
    Move {
        section: usize,
        content: usize,
        direction: Direction,
    },
}

#[derive(Subcommand)]
enum ButtonCommand {
    /// Add a button: file, link or email
    Add { kind: ButtonKind },
    Update {
        id: String,
        #[arg(long)]
        kind: Option<ButtonKind>,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        href: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// File offered for download
        #[arg(long)]
        file: Option<PathBuf>,
    },
    Remove { id: String },
    /// Move the button at FROM to position TO
    Move { from: usize, to: usize },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsite=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut store = FileStore::open(&cli.project);

    // Read-only commands
    match &cli.command {
        Command::Show => {
            let ctx = AppContext::restore(&store);
            output::print_project(&ctx.project, &ctx.settings);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Settings { file: None } => {
            let ctx = AppContext::restore(&store);
            println!("{}", serde_json::to_string_pretty(&ctx.settings)?);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Preview { out, fragment } => {
            let ctx = AppContext::restore(&store);
            if *fragment {
                println!("{}", ctx.preview());
            } else {
                let page = render::render_document(&ctx.project, &ctx.settings, false);
                std::fs::write(out, page.into_string())?;
                println!("Preview written to {}", out.display());
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Export { format, out } => {
            let ctx = AppContext::restore(&store);
            let report = export::export(&ctx.project, &ctx.settings, *format, out)?;
            output::print_export_report(&report);
            return Ok(ExitCode::SUCCESS);
        }
        Command::GenSettings => {
            print!("{}", settings::stock_settings_toml());
            return Ok(ExitCode::SUCCESS);
        }
        Command::Clear => {
            let mut ctx = AppContext::restore(&store);
            ctx.reset(&mut store)?;
            println!("Removed {}", cli.project.display());
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let mut ctx = AppContext::restore(&store);
    apply(&mut ctx, cli.command);

    let notices = ctx.drain_notices();
    output::print_notices(&notices);
    ctx.save_now(&mut store)?;

    if notices.iter().any(|n| n.level == NoticeLevel::Error) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Run a mutating command against the session.
fn apply(ctx: &mut AppContext, command: Command) {
    match command {
        Command::New { title } => ctx.new_blank(title.as_deref()),
        Command::Import { file } => ctx.import(&file),
        Command::Title { title } => ctx.set_title(&title),
        Command::Logo { file, remove } => match file {
            Some(path) if !remove => {
                ctx.set_logo(&path);
            }
            _ => ctx.remove_logo(),
        },
        Command::Section(cmd) => match cmd {
            SectionCommand::Add => {
                let index = ctx.add_section();
                ctx.notify(NoticeLevel::Info, format!("Added section {index}"));
            }
            SectionCommand::Delete { index } => {
                ctx.delete_section(index);
            }
            SectionCommand::Move { index, direction } => {
                if !ctx.move_section(index, direction) && ctx.notices().is_empty() {
                    ctx.notify(NoticeLevel::Info, "Section is already at the edge");
                }
            }
            SectionCommand::Rename { index, name } => {
                ctx.rename_section(index, &name);
            }
            SectionCommand::Icon { index, icon } => {
                ctx.apply_icon_selection(index, &icon);
            }
            SectionCommand::ShowIcon { index, show } => {
                ctx.apply_show_icon_toggle(index, show);
            }
            SectionCommand::Collapse { index, collapsed } => {
                ctx.set_collapsed(index, collapsed);
            }
        },
        Command::Content(cmd) => match cmd {
            ContentCommand::AddText { section } => {
                if let Some(index) = ctx.add_text(section) {
                    ctx.notify(NoticeLevel::Info, format!("Added text block {index}"));
                }
            }
            ContentCommand::AddImage {
                section,
                file,
                caption,
            } => {
                let added = match file {
                    Some(path) => ctx.add_image_from_file(section, &path, caption),
                    None => ctx.add_image(section),
                };
                if let Some(index) = added {
                    ctx.notify(NoticeLevel::Info, format!("Added image block {index}"));
                }
            }
            ContentCommand::SetText {
                section,
                content,
                value,
            } => {
                ctx.update_text(section, content, &value);
            }
            ContentCommand::Delete { section, content } => {
                ctx.delete_content(section, content);
            }
            ContentCommand::Move {
                section,
                content,
                direction,
            } => {
                if !ctx.move_content(section, content, direction) && ctx.notices().is_empty() {
                    ctx.notify(NoticeLevel::Info, "Block is already at the edge");
                }
            }
        },
        Command::Button(cmd) => match cmd {
            ButtonCommand::Add { kind } => {
                if let Some(id) = ctx.add_button(kind) {
                    ctx.notify(NoticeLevel::Info, format!("Added {kind} button {id}"));
                }
            }
            ButtonCommand::Update {
                id,
                kind,
                label,
                href,
                email,
                file,
            } => {
                let file = match file.map(|path| import::load_attachment(&path)).transpose() {
                    Ok(file) => file,
                    Err(e) => {
                        ctx.notify(NoticeLevel::Error, e.to_string());
                        return;
                    }
                };
                ctx.update_button(
                    &id,
                    ButtonPatch {
                        kind,
                        label,
                        href,
                        email,
                        file,
                    },
                );
            }
            ButtonCommand::Remove { id } => {
                ctx.remove_button(&id);
            }
            ButtonCommand::Move { from, to } => {
                if !ctx.reorder_buttons(from, to) {
                    ctx.notify(NoticeLevel::Error, format!("No button at position {from} or {to}"));
                }
            }
        },
        Command::Settings { file: Some(path) } => {
            if ctx.apply_settings_file(&path) {
                ctx.notify(NoticeLevel::Info, format!("Applied {}", path.display()));
            }
        }
        Command::Show
        | Command::Settings { file: None }
        | Command::Preview { .. }
        | Command::Export { .. }
        | Command::GenSettings
        | Command::Clear => {}
    }
}
