//! The state machine behind the interactive viewer.
//!
//! The viewer plays the part of the host editor: it shows one document at a time, tracks a
//! cursor and an optional selection anchor, and turns keystrokes into mark commands on the
//! session. Every command and every reload is followed by a render pass, which is also when
//! marks get reconciled against the document's current length.

use crate::document::{Document, Selection, TextDocument};
use crate::session::{CommandError, Session};
use crate::view::{HighlightSpan, HighlightTarget, ViewError};
use std::io;
use std::path::{Path, PathBuf};

#[derive(PartialEq)]
/// Determines navigation scope and quit behavior based on how many files were opened.
pub enum FileMode {
    /// Single-file mode quits directly to shell.
    Single,
    /// Multi-file mode returns to file list before quitting.
    Multi,
}

#[derive(PartialEq)]
/// Determines which UI screen renders and how input is interpreted.
pub enum View {
    /// Displays the opened files with their mark counts.
    FileList,
    /// Shows one document with its marks highlighted.
    Document,
    /// Captures vim-style command input after ':' keystroke.
    Command,
}

#[derive(Debug, PartialEq, Eq)]
/// What the event loop should do after a command line was run.
pub enum CommandOutcome {
    /// Keep going.
    Continue,
    /// Leave the current view (or the program in single-file mode).
    Quit,
}

/// A document on screen together with the highlights currently drawn over it.
pub struct Viewport {
    /// Key of the displayed file in the mark store.
    pub key: String,
    /// Displayed document.
    pub document: TextDocument,
    /// Highlights from the last render pass.
    pub highlights: Vec<HighlightSpan>,
}

impl Viewport {
    #[must_use]
    /// Whether `line` is drawn highlighted.
    pub fn is_marked(&self, line: usize) -> bool {
        self.highlights.iter().any(|span| span.covers_line(line))
    }

    #[must_use]
    /// Path of the displayed file.
    pub fn path(&self) -> &Path {
        self.document.path()
    }
}

impl HighlightTarget for Viewport {
    fn file_key(&self) -> &str {
        &self.key
    }

    fn document(&self) -> &dyn Document {
        &self.document
    }

    fn set_highlights(&mut self, spans: Vec<HighlightSpan>) -> Result<(), ViewError> {
        self.highlights = spans;
        Ok(())
    }
}

/// Bridges the mark session and the terminal, holding everything the UI draws from.
pub struct AppState {
    /// Marks for the workspace.
    pub session: Session,
    /// Files available for review.
    pub files: Vec<PathBuf>,
    /// Selected file in the file list view.
    pub current_file_index: usize,
    /// Controls navigation behavior and file list visibility.
    pub file_mode: FileMode,
    /// Active UI screen determining input handling.
    pub current_view: View,
    /// Document being reviewed, if one is open.
    pub viewport: Option<Viewport>,
    /// Line the cursor is on.
    pub cursor: usize,
    /// Line where the selection started, when one is in progress.
    pub anchor: Option<usize>,
    /// First line shown at the top of the document pane.
    pub scroll: usize,
    /// Accumulates vim-style command input after ':' is pressed.
    pub command_buffer: String,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    /// Lines kept visible around the cursor.
    pub scroll_margin: usize,
}

impl AppState {
    #[must_use]
    /// Initialises viewer state and determines file mode.
    ///
    /// Single-file reviews skip the file list and quit directly to shell, while multi-file
    /// reviews show a file selector and return to it on 'q'.
    pub fn new(session: Session, files: Vec<PathBuf>, scroll_margin: usize) -> Self {
        let (file_mode, current_view) = if files.len() == 1 {
            (FileMode::Single, View::Document)
        } else {
            (FileMode::Multi, View::FileList)
        };

        Self {
            session,
            files,
            current_file_index: 0,
            file_mode,
            current_view,
            viewport: None,
            cursor: 0,
            anchor: None,
            scroll: 0,
            command_buffer: String::new(),
            message: None,
            scroll_margin,
        }
    }

    /// Loads the selected file into the viewport and draws its marks.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn open_current_file(&mut self) -> io::Result<()> {
        let Some(path) = self.files.get(self.current_file_index) else {
            return Ok(());
        };
        let document = TextDocument::open(path)?;
        let key = self
            .session
            .key_for(path)
            .unwrap_or_else(|_| path.to_string_lossy().into_owned());

        self.viewport = Some(Viewport {
            key,
            document,
            highlights: Vec::new(),
        });
        self.cursor = 0;
        self.anchor = None;
        self.scroll = 0;
        self.current_view = View::Document;
        self.refresh_highlights();
        Ok(())
    }

    /// Returns to the file list.
    pub fn close_document(&mut self) {
        self.viewport = None;
        self.anchor = None;
        self.current_view = View::FileList;
    }

    /// Re-reads the open document from disk and re-renders, healing marks past its new end.
    pub fn reload_document(&mut self) {
        let Some(viewport) = self.viewport.as_mut() else {
            return;
        };
        match viewport.document.reload() {
            Ok(()) => {
                let last_line = viewport.document.line_count() - 1;
                self.cursor = self.cursor.min(last_line);
                self.anchor = self.anchor.map(|line| line.min(last_line));
                self.message = Some("Reloaded".to_string());
                self.refresh_highlights();
            }
            Err(e) => self.message = Some(format!("Error reloading: {e}")),
        }
    }

    /// Runs a render pass over the visible document.
    pub fn refresh_highlights(&mut self) {
        let Some(viewport) = self.viewport.as_mut() else {
            return;
        };
        let report = self.session.render(std::slice::from_mut(viewport));
        if let Some(failure) = report.failures.first() {
            self.message = Some(format!("Highlight error: {failure}"));
        }
    }

    #[must_use]
    /// Number of lines in the open document.
    pub fn line_count(&self) -> usize {
        self.viewport
            .as_ref()
            .map_or(0, |viewport| viewport.document.line_count())
    }

    // --- Cursor movement ---

    /// Moves the cursor by `delta` lines, clamped to the document.
    pub fn move_cursor(&mut self, delta: isize) {
        let last_line = self.line_count().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last_line);
    }

    /// Moves the cursor one page, sized for a terminal `terminal_height` rows tall.
    pub fn move_page(&mut self, terminal_height: u16, forward: bool) {
        let page = page_size(terminal_height);
        self.move_cursor(if forward { page } else { -page });
    }

    /// Jumps to the first line.
    pub fn cursor_to_top(&mut self) {
        self.cursor = 0;
    }

    /// Jumps to the last line.
    pub fn cursor_to_bottom(&mut self) {
        self.cursor = self.line_count().saturating_sub(1);
    }

    /// Adjusts the scroll offset so the cursor stays inside a pane `height` lines tall.
    pub fn scroll_into_view(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        let margin = self.scroll_margin.min(height.saturating_sub(1) / 2);
        if self.cursor < self.scroll + margin {
            self.scroll = self.cursor.saturating_sub(margin);
        } else if self.cursor + margin >= self.scroll + height {
            self.scroll = self.cursor + margin + 1 - height;
        }
        let max_scroll = self.line_count().saturating_sub(height);
        self.scroll = self.scroll.min(max_scroll);
    }

    // --- </Cursor movement> ---

    /// Starts a selection at the cursor, or drops the one in progress.
    pub fn toggle_anchor(&mut self) {
        self.anchor = match self.anchor {
            Some(_) => None,
            None => Some(self.cursor),
        };
    }

    #[must_use]
    /// Selection from the anchor to the cursor, or just the cursor line.
    pub fn selection(&self) -> Selection {
        Selection::new(self.anchor.unwrap_or(self.cursor), self.cursor)
    }

    #[must_use]
    /// Whether `line` is inside the current selection.
    pub fn is_selected(&self, line: usize) -> bool {
        self.anchor.is_some() && self.selection().lines().contains(line)
    }

    /// Marks the current selection.
    pub fn mark_selection(&mut self) {
        let selection = self.selection();
        self.run(|session, viewport| {
            let path = viewport.document.path().to_path_buf();
            session.mark_selection(&mut viewport.document, &path, &[selection])
        });
    }

    /// Unmarks the current selection.
    pub fn unmark_selection(&mut self) {
        let selection = self.selection();
        self.run(|session, viewport| session.unmark_selection(viewport.path(), &[selection]));
    }

    /// Marks the whole open document.
    pub fn mark_file(&mut self) {
        self.run(|session, viewport| {
            let path = viewport.document.path().to_path_buf();
            session.mark_file(&mut viewport.document, &path)
        });
    }

    /// Clears the marks of the open document.
    pub fn unmark_file(&mut self) {
        self.run(|session, viewport| session.unmark_file(viewport.path()));
    }

    /// Clears every mark in the workspace.
    pub fn unmark_workspace(&mut self) {
        self.run(|session, _| session.unmark_workspace());
    }

    fn run<F>(&mut self, command: F)
    where
        F: FnOnce(&mut Session, &mut Viewport) -> Result<(), CommandError>,
    {
        let Some(viewport) = self.viewport.as_mut() else {
            self.message = Some("No document open".to_string());
            return;
        };
        match command(&mut self.session, viewport) {
            Ok(()) => {
                self.anchor = None;
                self.message = None;
                self.refresh_highlights();
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// Executes a `:` command line.
    pub fn run_command(&mut self, command: &str) -> CommandOutcome {
        match command.trim() {
            "mark" => self.mark_selection(),
            "unmark" => self.unmark_selection(),
            "markfile" => self.mark_file(),
            "unmarkfile" => self.unmark_file(),
            "unmarkworkspace" => self.unmark_workspace(),
            "w" => {
                self.message = Some(match self.session.flush() {
                    Ok(()) => "Saved".to_string(),
                    Err(e) => format!("Error saving: {e}"),
                });
            }
            "q" | "q!" => return CommandOutcome::Quit,
            other => self.message = Some(format!("Unknown command: {other}")),
        }
        CommandOutcome::Continue
    }

    #[must_use]
    /// Marked line count for the file at `index` in the file list.
    pub fn marked_lines(&self, index: usize) -> usize {
        self.files
            .get(index)
            .and_then(|path| self.session.key_for(path).ok())
            .and_then(|key| self.session.store().get(&key))
            .map_or(0, crate::interval::IntervalSet::covered_lines)
    }
}

/// Rows taken by the status bar and the document pane's borders.
const CHROME_ROWS: u16 = 5;

#[must_use]
/// Lines scrolled by one page in a terminal `terminal_height` rows tall; never less than one.
pub fn page_size(terminal_height: u16) -> isize {
    isize::try_from(terminal_height.saturating_sub(CHROME_ROWS))
        .unwrap_or(1)
        .max(1)
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
