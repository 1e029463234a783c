//! modedoc-core - One source, one document per language
//!
//! Core library for modedoc. Given a parsed document tree and an active
//! [`Mode`], it
//!
//! - expands `var` short-codes from per-mode dictionaries ([`shortcode`]),
//! - keeps `span` roles and language blocks written for the active mode
//!   ([`shortcode::span_role`], [`lang_block`]),
//! - lifts matching `div` containers and deletes the rest ([`div_filter`]).
//!
//! # Example
//!
//! ```
//! use modedoc_ast::Node;
//! use modedoc_core::{Mode, ModeTransform};
//!
//! let tree = Node::root(vec![
//!     Node::div("python", vec![Node::paragraph(vec![Node::role("var", "nb_app")])]),
//!     Node::div("r", vec![Node::text("RStudio only")]),
//! ]);
//!
//! let outcome = ModeTransform::new(Mode::Python).run_collect(tree);
//! assert_eq!(outcome.tree.text_content(), "Jupyter");
//! assert!(outcome.diagnostics.is_empty());
//! ```

pub mod config;
pub mod diagnostics;
pub mod div_filter;
pub mod error;
pub mod lang_block;
pub mod mode;
pub mod registry;
pub mod shortcode;
pub mod transform;

// Re-export main types and functions
pub use config::Settings;
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Diagnostics, Severity, Span};
pub use div_filter::{classify, filter_divs, Disposition, DivFilter, FilterReport};
pub use error::{CoreError, Result};
pub use lang_block::emit;
pub use mode::Mode;
pub use registry::{Dictionary, ModeRegistry, ReplacementContent};
pub use shortcode::{resolve, span_role, try_resolve, ShortcodeError};
pub use transform::{ModeTransform, TransformOutcome};

/// Plugin name reported to hosts
pub const PLUGIN_NAME: &str = "modedoc short-codes";

/// Role names expanded by [`ModeTransform`]
pub const ROLES: [&str; 2] = [shortcode::VAR_ROLE, shortcode::SPAN_ROLE];

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directive names expanded by [`ModeTransform`]
pub fn directives() -> Vec<&'static str> {
    std::iter::once(lang_block::LANG_BLOCK_DIRECTIVE)
        .chain(Mode::ALL.iter().map(|m| m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }

    #[test]
    fn test_handled_names() {
        assert_eq!(ROLES, ["var", "span"]);
        assert_eq!(directives(), vec!["lang-block", "python", "r"]);
    }
}
