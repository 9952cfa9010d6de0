//! auditmark: persistent line-range review marks for source files.
//!
//! Marks are kept per file as canonical sets of inclusive line intervals, persisted as JSON in
//! the workspace, and reconciled against each document's current length whenever they are drawn.

pub mod app_state;
pub mod codec;
pub mod config;
pub mod document;
pub mod interval;
pub mod mark_store;
pub mod reconcile;
pub mod session;
pub mod storage;
pub mod ui;
pub mod view;
pub mod workspace;
