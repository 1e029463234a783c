//! Inline short-code roles
//!
//! - `var` replaces a symbolic name with the active mode's wording, e.g.
//!   ``{var}`nb_app` `` becomes "Jupyter" or "RStudio".
//! - `span` keeps its body only when its `class` option names the active mode.
//!
//! Both are total: a call site either expands to nodes or to nothing, and
//! any problem is reported to the diagnostics sink instead of aborting.

use thiserror::Error;
use tracing::debug;

use modedoc_ast::{Node, NodeKind, Position};

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::mode::Mode;
use crate::registry::ModeRegistry;

/// Role name of the variable substitution short-code
pub const VAR_ROLE: &str = "var";

/// Role name of the mode-conditional inline span
pub const SPAN_ROLE: &str = "span";

/// Why a short-code could not be expanded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcodeError {
    /// The name has no entry in the active mode's dictionary
    #[error("shortcode: \"var\", unknown replacement \"{name}\"")]
    Unknown { name: String, mode: Mode },

    /// The role was invoked without its required argument
    #[error("shortcode: \"{role}\", missing required argument")]
    MissingName { role: &'static str },

    /// A generic language block named no language, so nothing was emitted
    #[error("directive: \"lang-block\", no language given")]
    MissingTag,
}

impl ShortcodeError {
    /// Diagnostic kind for this error
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ShortcodeError::Unknown { .. } => DiagnosticKind::UnknownShortcode,
            ShortcodeError::MissingName { .. } => DiagnosticKind::MissingRequiredArgument,
            ShortcodeError::MissingTag => DiagnosticKind::MissingLanguageTag,
        }
    }

    /// Convert into a diagnostic attributed to `location`
    pub fn into_diagnostic(self, location: Option<&Position>) -> Diagnostic {
        let diag = Diagnostic::from_kind(self.kind(), self.to_string()).at(location);
        match self {
            ShortcodeError::Unknown { name, mode } => diag
                .with_help(format!("Define \"{}\" in the {} dictionary", name, mode))
                .with_note(format!("active mode is {}", mode)),
            ShortcodeError::MissingName { role } => {
                diag.with_help(format!("Give \"{}\" its required argument", role))
            }
            ShortcodeError::MissingTag => {
                diag.with_help("Name the language, e.g. ```{lang-block} python")
            }
        }
    }
}

/// Expand a `var` short-code, failing on a missing or unknown name
pub fn try_resolve(
    registry: &ModeRegistry,
    mode: Mode,
    name: &str,
) -> Result<Vec<Node>, ShortcodeError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShortcodeError::MissingName { role: VAR_ROLE });
    }
    registry
        .lookup(mode, name)
        .map(|content| content.to_nodes())
        .ok_or_else(|| ShortcodeError::Unknown {
            name: name.to_string(),
            mode,
        })
}

/// Expand a `var` short-code
///
/// Returns the replacement nodes, or an empty vector after pushing exactly
/// one diagnostic to `sink`.
pub fn resolve(
    registry: &ModeRegistry,
    mode: Mode,
    name: &str,
    location: Option<&Position>,
    sink: &mut dyn DiagnosticSink,
) -> Vec<Node> {
    match try_resolve(registry, mode, name) {
        Ok(nodes) => nodes,
        Err(err) => {
            debug!(name, %mode, "short-code did not resolve");
            sink.report(err.into_diagnostic(location));
            Vec::new()
        }
    }
}

/// Expand a `span` role
///
/// The body's inline children are wrapped in a single span when `class`
/// names the active mode. A body parsed as one paragraph is unwrapped so
/// the span stays inline.
pub fn span_role(mode: Mode, class: Option<&str>, body: Vec<Node>) -> Vec<Node> {
    if !mode.matches_class(class) {
        return Vec::new();
    }
    let children = match <[Node; 1]>::try_from(body) {
        Ok([Node {
            kind: NodeKind::Paragraph { children },
            ..
        }]) => children,
        Ok([single]) => vec![single],
        Err(body) => body,
    };
    vec![Node::span(children)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;

    #[test]
    fn test_text_replacement() {
        let registry = ModeRegistry::builtin();
        let nodes = try_resolve(&registry, Mode::R, "true").unwrap();
        assert_eq!(nodes, vec![Node::text("`TRUE`")]);
    }

    #[test]
    fn test_node_replacement() {
        let registry = ModeRegistry::builtin();
        let nodes = try_resolve(&registry, Mode::Python, "true").unwrap();
        assert_eq!(nodes, vec![Node::inline_code("True")]);
    }

    #[test]
    fn test_name_is_trimmed() {
        let registry = ModeRegistry::builtin();
        let nodes = try_resolve(&registry, Mode::Python, " lang ").unwrap();
        assert_eq!(nodes, vec![Node::text("Python")]);
    }

    #[test]
    fn test_unknown_name_reports_once() {
        let registry = ModeRegistry::builtin();
        let mut sink = Diagnostics::new();
        let location = Position::on_line(7, 3, 22);

        let nodes = resolve(
            &registry,
            Mode::Python,
            "nonexistent",
            Some(&location),
            &mut sink,
        );

        assert!(nodes.is_empty());
        assert_eq!(sink.len(), 1);
        let diag = sink.iter().next().unwrap();
        assert_eq!(diag.kind, Some(DiagnosticKind::UnknownShortcode));
        assert!(diag.message.contains("\"nonexistent\""));
        assert_eq!(diag.notes, vec!["active mode is python".to_string()]);
        assert_eq!(diag.span.and_then(|s| s.line), Some(7));
    }

    #[test]
    fn test_missing_name_reports() {
        let registry = ModeRegistry::builtin();
        let mut sink: Vec<Diagnostic> = Vec::new();

        let nodes = resolve(&registry, Mode::R, "   ", None, &mut sink);

        assert!(nodes.is_empty());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].kind, Some(DiagnosticKind::MissingRequiredArgument));
        assert!(sink[0].span.is_none());
    }

    #[test]
    fn test_resolve_success_reports_nothing() {
        let registry = ModeRegistry::builtin();
        let mut sink: Vec<Diagnostic> = Vec::new();
        let nodes = resolve(&registry, Mode::R, "cell", None, &mut sink);
        assert_eq!(nodes, vec![Node::text("chunk")]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_span_role_matching_unwraps_paragraph() {
        let body = vec![Node::paragraph(vec![
            Node::text("see "),
            Node::inline_code("np.mean"),
        ])];
        let nodes = span_role(Mode::Python, Some("python"), body);
        assert_eq!(
            nodes,
            vec![Node::span(vec![
                Node::text("see "),
                Node::inline_code("np.mean")
            ])]
        );
    }

    #[test]
    fn test_span_role_keeps_plain_body() {
        let body = vec![Node::text("a"), Node::text("b")];
        let nodes = span_role(Mode::R, Some("r"), body.clone());
        assert_eq!(nodes, vec![Node::span(body)]);
    }

    #[test]
    fn test_span_role_non_matching_is_empty() {
        let body = vec![Node::text("only in R")];
        assert!(span_role(Mode::Python, Some("r"), body.clone()).is_empty());
        assert!(span_role(Mode::Python, None, body).is_empty());
    }
}
