//! Document classification and distribution packaging for Kumihan-Formatter.
//!
//! The pipeline classifies every file of a source checkout into a
//! [`classifier::DocumentType`], converts the user-facing documents into
//! plain text or HTML, copies the rest into a fixed directory layout, and
//! writes a summary file plus an HTML index page.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod context;
pub mod distribution;
pub mod error;
pub mod ui;

pub use error::{DistError, Result};
