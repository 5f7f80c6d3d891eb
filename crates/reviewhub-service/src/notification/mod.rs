//! Post-commit notification of published review comments.

pub mod mail;

pub use mail::{CommentMail, CommentNotifier, LogNotifier};
