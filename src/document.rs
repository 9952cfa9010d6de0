//! The document side of marking: what a file looks like right now, and what the user selected.
//!
//! Marks are stored against line numbers, but the document they point into keeps changing. The
//! `Document` trait is the narrow view the engine needs of it: how many lines there are, how long
//! a given line is, and a way to make sure the file on disk matches what is being marked.

use crate::interval::Interval;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Live view of a document's line structure.
pub trait Document {
    /// Number of lines; an empty document still has one (empty) line.
    fn line_count(&self) -> usize;

    /// Length in characters of `line`, or `None` past the end of the document.
    fn line_len(&self, line: usize) -> Option<usize>;

    /// Writes unsaved in-memory edits to disk so a file key can be trusted to describe it.
    ///
    /// A document without edits leaves the file untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn save(&mut self) -> io::Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Cursor selection expressed as the line it started on and the line it ends on.
pub struct Selection {
    /// Line where the selection was started.
    pub anchor: usize,
    /// Line the cursor is on now.
    pub active: usize,
}

impl Selection {
    #[must_use]
    /// Selection between two lines, in whichever direction it was made.
    pub fn new(anchor: usize, active: usize) -> Self {
        Self { anchor, active }
    }

    #[must_use]
    /// Empty selection sitting on one line.
    pub fn caret(line: usize) -> Self {
        Self::new(line, line)
    }

    #[must_use]
    /// Whole lines touched by the selection.
    pub fn lines(&self) -> Interval {
        Interval::new(self.anchor, self.active)
    }
}

#[derive(Debug, thiserror::Error)]
/// A typed line range that could not be understood.
pub enum SelectionParseError {
    /// A bound was not a positive whole number.
    #[error("invalid line number {0:?} (lines start at 1)")]
    InvalidLine(String),
}

impl FromStr for Selection {
    type Err = SelectionParseError;

    /// Parses a human-typed, one-based range: `7` or `3:12` (either order).
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parse_line = |part: &str| {
            part.trim()
                .parse::<usize>()
                .ok()
                .and_then(|line| line.checked_sub(1))
                .ok_or_else(|| SelectionParseError::InvalidLine(part.to_string()))
        };
        match text.split_once(':') {
            Some((anchor, active)) => Ok(Self::new(parse_line(anchor)?, parse_line(active)?)),
            None => Ok(Self::caret(parse_line(text)?)),
        }
    }
}

#[derive(Clone, Debug)]
/// Plain text file held as lines.
///
/// The document remembers the line ending it was read with and whether it has been edited in
/// memory. Only an edited document is ever written back, so marking a file never changes its
/// bytes.
pub struct TextDocument {
    path: PathBuf,
    lines: Vec<String>,
    line_ending: &'static str,
    trailing_newline: bool,
    dirty: bool,
}

impl TextDocument {
    /// Reads `path` from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path)?;
        Ok(Self::from_text(path, &content))
    }

    #[must_use]
    /// Wraps `content` as the unedited state of the document at `path`.
    pub fn from_text(path: impl Into<PathBuf>, content: &str) -> Self {
        let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            path: path.into(),
            lines,
            line_ending: if content.contains("\r\n") { "\r\n" } else { "\n" },
            trailing_newline: content.ends_with('\n'),
            dirty: false,
        }
    }

    /// Re-reads the file, picking up edits made outside this process.
    ///
    /// Unsaved in-memory edits are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn reload(&mut self) -> io::Result<()> {
        *self = Self::open(self.path.clone())?;
        Ok(())
    }

    /// Replaces the text of `line` in memory; returns false past the end of the document.
    pub fn set_line(&mut self, line: usize, text: impl Into<String>) -> bool {
        match self.lines.get_mut(line) {
            Some(slot) => {
                *slot = text.into();
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    #[must_use]
    /// Whether there are in-memory edits not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    /// Location of the file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    /// Text of `line`, if it exists.
    pub fn line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    /// All lines in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    #[must_use]
    /// Full content as it would be written to disk, with the original line ending.
    pub fn text(&self) -> String {
        let mut text = self.lines.join(self.line_ending);
        if self.trailing_newline {
            text.push_str(self.line_ending);
        }
        text
    }
}

impl Document for TextDocument {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_len(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|text| text.chars().count())
    }

    fn save(&mut self) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        log::debug!("Writing {} before marking", self.path.display());
        fs::write(&self.path, self.text())?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/document.rs"]
mod tests;
