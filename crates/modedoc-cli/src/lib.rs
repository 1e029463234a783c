//! modedoc CLI - Command-line interface library
//!
//! This library provides the CLI functionality for modedoc:
//! - Transform: rewrite a parsed document tree for one mode
//! - Vars: list the short-code dictionary of a mode
//! - Check: report variables missing from some modes
//!
//! # Binary Usage
//!
//! ```bash
//! # Python edition of a chapter
//! modedoc transform chapter.json --mode python --output chapter.python.json
//!
//! # R edition, diagnostics as JSON, fail on unknown short-codes
//! modedoc transform chapter.json --mode r --format json --strict
//!
//! # Dictionary consistency
//! modedoc check --config modedoc.toml
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{
    check_command, init_tracing, load_settings, render_diagnostics, run_cli, transform_command,
    vars_command, OutputFormat, TransformSummary,
};
