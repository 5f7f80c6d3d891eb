//! Core type definitions used across the ReviewHub workspace.

pub mod id;

pub use id::*;
