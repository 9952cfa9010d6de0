//! auditmark: Persistent line-range review marks for source files.
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use auditmark::app_state::{self, AppState, CommandOutcome};
use auditmark::config::Config;
use auditmark::document::{Selection, TextDocument};
use auditmark::session::{CommandError, Session};
use auditmark::ui;
use auditmark::workspace::Workspace;
use clap::{Parser, Subcommand};
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "auditmark")]
#[command(about = "Mark reviewed line ranges in source files", long_about = None)]
struct Args {
    /// Workspace root (discovered from the current directory when omitted)
    #[arg(long, short = 'w', global = true, value_name = "DIR")]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Review files in the interactive viewer
    Open {
        /// Files to review
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,
    },
    /// Mark line ranges as reviewed
    Mark {
        /// File to mark
        file: PathBuf,
        /// One-based inclusive range such as 3:12 (repeatable)
        #[arg(long, short = 'l', value_name = "A:B", required = true)]
        lines: Vec<Selection>,
    },
    /// Remove line ranges from the marks
    Unmark {
        /// File to unmark
        file: PathBuf,
        /// One-based inclusive range such as 3:12 (repeatable)
        #[arg(long, short = 'l', value_name = "A:B", required = true)]
        lines: Vec<Selection>,
    },
    /// Mark every line of a file
    MarkFile {
        /// File to mark
        file: PathBuf,
    },
    /// Clear every mark in a file
    UnmarkFile {
        /// File to unmark
        file: PathBuf,
    },
    /// Clear every mark in the workspace
    UnmarkWorkspace,
    /// Print the marked ranges of a file as they apply to it now
    Show {
        /// File to inspect
        file: PathBuf,
    },
    /// Print every file with marks
    List,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let workspace = match args.workspace {
        Some(dir) => Some(Workspace::open(dir)),
        None => Workspace::discover(&std::env::current_dir()?),
    };

    let viewer = matches!(args.command, Command::Open { .. });
    init_logging(workspace.as_ref(), viewer)?;

    let cfg = workspace.as_ref().map(Workspace::config).cloned().unwrap_or_default();
    let mut session = workspace.map_or_else(Session::detached, Session::open);

    match args.command {
        Command::Open { paths } => return run_tui(session, paths, &cfg),
        Command::Mark { file, lines } => {
            let mut document = open_document(&file)?;
            session.mark_selection(&mut document, &file, &lines)?;
        }
        Command::Unmark { file, lines } => session.unmark_selection(&file, &lines)?,
        Command::MarkFile { file } => {
            let mut document = open_document(&file)?;
            session.mark_file(&mut document, &file)?;
        }
        Command::UnmarkFile { file } => session.unmark_file(&file)?,
        Command::UnmarkWorkspace => session.unmark_workspace()?,
        Command::Show { file } => {
            let key = session.key_for(&file)?;
            let document = open_document(&file)?;
            let spans = session.highlights(&document, &file)?;
            if spans.is_empty() {
                println!("{key}: no marks");
            }
            for span in spans {
                println!("{key}:{}-{}", span.start.line + 1, span.end.line + 1);
            }
        }
        Command::List => {
            if session.workspace().is_none() {
                return Err(CommandError::NotInWorkspace.into());
            }
            for (key, set) in session.store().iter() {
                let ranges: Vec<String> = set
                    .iter()
                    .map(|interval| format!("{}-{}", interval.start + 1, interval.end + 1))
                    .collect();
                println!("{key}: {}", ranges.join(", "));
            }
        }
    }

    session.close()?;
    Ok(())
}

fn open_document(path: &Path) -> anyhow::Result<TextDocument> {
    TextDocument::open(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Logs to stderr, or to a file next to the mark state while the viewer owns the terminal.
fn init_logging(workspace: Option<&Workspace>, viewer: bool) -> io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env();

    if viewer {
        let Some(workspace) = workspace else {
            // Nowhere to write without a workspace, and stderr would draw over the viewer.
            return Ok(());
        };
        let log_path = workspace.storage_path().with_file_name("auditmark.log");
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(log_path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn run_tui(session: Session, files: Vec<PathBuf>, cfg: &Config) -> anyhow::Result<()> {
    let mut app = AppState::new(session, files, cfg.scroll_margin);
    if app.file_mode == app_state::FileMode::Single {
        if let Err(e) = app.open_current_file() {
            app.message = Some(format!("Error opening file: {e}"));
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, cfg);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    app.session.close()?;
    Ok(())
}

#[allow(clippy::too_many_lines)]
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    cfg: &Config,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app, cfg))?;
        let height = terminal.size()?.height;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.current_view {
            app_state::View::FileList => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Up | KeyCode::Char('k') => {
                    app.current_file_index = app.current_file_index.saturating_sub(1);
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    if app.current_file_index + 1 < app.files.len() {
                        app.current_file_index += 1;
                    }
                }
                KeyCode::Enter => {
                    if let Err(e) = app.open_current_file() {
                        app.message = Some(format!("Error opening file: {e}"));
                    }
                }
                _ => {}
            },
            app_state::View::Document => match key.code {
                KeyCode::Char('q') => {
                    if app.file_mode == app_state::FileMode::Multi {
                        app.close_document();
                    } else {
                        return Ok(());
                    }
                }
                KeyCode::Esc => {
                    if app.anchor.is_some() {
                        app.anchor = None;
                    } else if app.file_mode == app_state::FileMode::Multi {
                        app.close_document();
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
                KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
                KeyCode::PageUp => app.move_page(height, false),
                KeyCode::PageDown => app.move_page(height, true),
                KeyCode::Home => app.cursor_to_top(),
                KeyCode::End => app.cursor_to_bottom(),
                KeyCode::Char('v') => app.toggle_anchor(),
                KeyCode::Char('m') => app.mark_selection(),
                KeyCode::Char('u') => app.unmark_selection(),
                KeyCode::Char('M') => app.mark_file(),
                KeyCode::Char('U') => app.unmark_file(),
                KeyCode::Char('r') => app.reload_document(),
                KeyCode::Char(':') => {
                    app.current_view = app_state::View::Command;
                    app.command_buffer.clear();
                    app.message = None;
                }
                _ => {}
            },
            app_state::View::Command => match key.code {
                KeyCode::Char(c) => {
                    app.command_buffer.push(c);
                }
                KeyCode::Backspace => {
                    app.command_buffer.pop();
                }
                KeyCode::Enter => {
                    let cmd = std::mem::take(&mut app.command_buffer);
                    app.current_view = app_state::View::Document;
                    if app.run_command(&cmd) == CommandOutcome::Quit {
                        if app.file_mode == app_state::FileMode::Multi {
                            app.close_document();
                        } else {
                            return Ok(());
                        }
                    }
                }
                KeyCode::Esc => {
                    app.current_view = app_state::View::Document;
                    app.command_buffer.clear();
                }
                _ => {}
            },
        }
    }
}
