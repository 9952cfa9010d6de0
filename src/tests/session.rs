use super::{CommandError, Session};
use crate::codec;
use crate::document::{Selection, TextDocument};
use crate::interval::Interval;
use crate::workspace::Workspace;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn workspace_with_file(lines: usize) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("review.txt");
    let content: String = (0..lines).map(|i| format!("line {i}\n")).collect();
    fs::write(&path, content).unwrap();
    (dir, path)
}

fn marks(session: &Session, key: &str) -> Vec<Interval> {
    session
        .store()
        .get(key)
        .map(|set| set.iter().copied().collect())
        .unwrap_or_default()
}

fn state_on_disk(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join(".auditmark").join("marks.json")).unwrap_or_default()
}

#[test]
fn test_commands_outside_workspace_are_refused() {
    let (_dir, path) = workspace_with_file(5);
    let mut doc = TextDocument::open(&path).unwrap();
    let mut session = Session::detached();

    let results = [
        session.mark_selection(&mut doc, &path, &[Selection::new(0, 1)]),
        session.unmark_selection(&path, &[Selection::new(0, 1)]),
        session.mark_file(&mut doc, &path),
        session.unmark_file(&path),
        session.unmark_workspace(),
    ];

    for result in results {
        assert!(matches!(result, Err(CommandError::NotInWorkspace)));
    }
    assert!(session.store().is_empty());
    assert_eq!(
        CommandError::NotInWorkspace.to_string(),
        "Please open the file in a workspace!"
    );
}

#[test]
fn test_mark_selection_merges_and_persists() {
    let (dir, path) = workspace_with_file(20);
    let mut doc = TextDocument::open(&path).unwrap();
    let mut session = Session::open(Workspace::open(dir.path()));

    session
        .mark_selection(
            &mut doc,
            &path,
            &[Selection::new(4, 0), Selection::new(5, 9), Selection::caret(15)],
        )
        .unwrap();
    session.flush().unwrap();

    assert_eq!(
        marks(&session, "review.txt"),
        vec![Interval::new(0, 9), Interval::line(15)]
    );
    let persisted = codec::try_deserialize(&state_on_disk(&dir)).unwrap();
    assert_eq!(&persisted, session.store());
}

#[test]
fn test_unmark_selection_splits() {
    let (dir, path) = workspace_with_file(20);
    let mut doc = TextDocument::open(&path).unwrap();
    let mut session = Session::open(Workspace::open(dir.path()));

    session.mark_file(&mut doc, &path).unwrap();
    session
        .unmark_selection(&path, &[Selection::new(12, 5)])
        .unwrap();

    assert_eq!(
        marks(&session, "review.txt"),
        vec![Interval::new(0, 4), Interval::new(13, 19)]
    );
}

#[test]
fn test_unmark_unknown_file_does_not_write() {
    let (dir, path) = workspace_with_file(3);
    let mut session = Session::open(Workspace::open(dir.path()));

    session.unmark_selection(&path, &[Selection::caret(0)]).unwrap();
    session.unmark_file(&path).unwrap();
    session.flush().unwrap();

    assert!(session.store().is_empty());
    assert!(!dir.path().join(".auditmark").exists());
}

#[test]
fn test_unmark_file_keeps_empty_entry() {
    let (dir, path) = workspace_with_file(3);
    let mut doc = TextDocument::open(&path).unwrap();
    let mut session = Session::open(Workspace::open(dir.path()));

    session.mark_file(&mut doc, &path).unwrap();
    session.unmark_file(&path).unwrap();
    session.flush().unwrap();

    assert!(session.store().contains("review.txt"));
    assert!(marks(&session, "review.txt").is_empty());
    assert_eq!(state_on_disk(&dir), r#"{"review.txt":{"array":[]}}"#);
}

#[test]
fn test_unmark_workspace_clears_everything() {
    let (dir, path) = workspace_with_file(3);
    let other = dir.path().join("other.txt");
    fs::write(&other, "a\nb\n").unwrap();
    let mut session = Session::open(Workspace::open(dir.path()));

    session
        .mark_file(&mut TextDocument::open(&path).unwrap(), &path)
        .unwrap();
    session
        .mark_file(&mut TextDocument::open(&other).unwrap(), &other)
        .unwrap();
    session.unmark_workspace().unwrap();
    session.flush().unwrap();

    assert!(session.store().is_empty());
    assert_eq!(state_on_disk(&dir), "{}");
}

#[test]
fn test_marks_survive_reopen() {
    let (dir, path) = workspace_with_file(10);
    let mut doc = TextDocument::open(&path).unwrap();

    let mut session = Session::open(Workspace::open(dir.path()));
    session
        .mark_selection(&mut doc, &path, &[Selection::new(2, 6)])
        .unwrap();
    session.close().unwrap();

    let reopened = Session::open(Workspace::open(dir.path()));
    assert_eq!(marks(&reopened, "review.txt"), vec![Interval::new(2, 6)]);
}

#[test]
fn test_highlights_heal_after_file_shrinks() {
    let (dir, path) = workspace_with_file(60);
    let mut doc = TextDocument::open(&path).unwrap();
    let mut session = Session::open(Workspace::open(dir.path()));
    session
        .mark_selection(&mut doc, &path, &[Selection::new(3, 50)])
        .unwrap();

    let shorter: String = (0..10).map(|i| format!("line {i}\n")).collect();
    fs::write(&path, shorter).unwrap();
    doc.reload().unwrap();

    let spans = session.highlights(&doc, &path).unwrap();
    session.flush().unwrap();

    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].end.line, 9);
    assert_eq!(marks(&session, "review.txt"), vec![Interval::new(3, 9)]);
    assert_eq!(
        state_on_disk(&dir),
        r#"{"review.txt":{"array":[{"start":3,"end":9}]}}"#
    );
}

#[test]
fn test_highlights_without_workspace_are_empty() {
    let (_dir, path) = workspace_with_file(3);
    let doc = TextDocument::open(&path).unwrap();
    let mut session = Session::detached();

    assert!(session.highlights(&doc, &path).unwrap().is_empty());
}
