//! Whole-document transform pipeline
//!
//! A run takes a parsed tree and the active mode and produces the tree for
//! that mode:
//!
//! 1. Expansion, bottom-up: every `var`/`span` role and every language
//!    block directive is replaced in place by what its handler returns.
//!    Invocations with other names are left for the host.
//! 2. The div filter pass.
//!
//! Runs share nothing mutable: the registry is only read, and each run
//! owns its tree.

use serde_json::Value;
use tracing::{debug, warn};

use modedoc_ast::{Node, NodeKind};

use crate::config::Settings;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics};
use crate::div_filter::{DivFilter, FilterReport};
use crate::lang_block;
use crate::mode::Mode;
use crate::registry::ModeRegistry;
use crate::shortcode::{self, SPAN_ROLE, VAR_ROLE};

/// Everything a collected run produced
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    /// The rewritten tree
    pub tree: Node,
    /// Div filter counts
    pub report: FilterReport,
    /// Diagnostics raised while expanding short-codes
    pub diagnostics: Diagnostics,
}

/// Mode transform, configured once and reusable across documents
#[derive(Debug, Clone)]
pub struct ModeTransform {
    mode: Mode,
    registry: ModeRegistry,
}

impl ModeTransform {
    /// Create a transform using the builtin dictionaries
    pub fn new(mode: Mode) -> Self {
        Self::with_registry(mode, ModeRegistry::builtin())
    }

    /// Create a transform with a custom registry
    pub fn with_registry(mode: Mode, registry: ModeRegistry) -> Self {
        Self { mode, registry }
    }

    /// Create a transform from loaded settings
    ///
    /// When consistency checking is enabled, mismatched dictionary names are
    /// logged as warnings. They never prevent the transform from being built.
    pub fn from_settings(settings: &Settings) -> Self {
        let transform = Self::with_registry(settings.mode, settings.registry());
        if settings.registry.check_consistency {
            for diag in transform.check_registry() {
                warn!("{}", diag.message);
            }
        }
        transform
    }

    /// The active mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The short-code registry
    pub fn registry(&self) -> &ModeRegistry {
        &self.registry
    }

    /// Dictionary mismatches across modes
    pub fn check_registry(&self) -> Vec<Diagnostic> {
        self.registry.consistency_report()
    }

    /// Run the pipeline, reporting diagnostics to `sink`
    pub fn run(&self, tree: Node, sink: &mut dyn DiagnosticSink) -> Node {
        self.run_with_report(tree, sink).0
    }

    /// Run the pipeline, collecting diagnostics into the outcome
    pub fn run_collect(&self, tree: Node) -> TransformOutcome {
        let mut diagnostics = Diagnostics::new();
        let (tree, report) = self.run_with_report(tree, &mut diagnostics);
        TransformOutcome {
            tree,
            report,
            diagnostics,
        }
    }

    fn run_with_report(
        &self,
        mut tree: Node,
        sink: &mut dyn DiagnosticSink,
    ) -> (Node, FilterReport) {
        self.expand_children(&mut tree, sink);
        DivFilter::new(self.mode).apply(tree)
    }

    /// Expand invocations among `node`'s descendants
    ///
    /// The node itself is never replaced.
    pub fn expand_children(&self, node: &mut Node, sink: &mut dyn DiagnosticSink) {
        let Some(children) = node.children_mut() else {
            return;
        };
        let original = std::mem::take(children);
        let mut expanded = Vec::with_capacity(original.len());
        for mut child in original {
            self.expand_children(&mut child, sink);
            match self.expand(child, sink) {
                Expansion::Keep(child) => expanded.push(child),
                Expansion::Replace(nodes) => expanded.extend(nodes),
            }
        }
        *children = expanded;
    }

    fn expand(&self, node: Node, sink: &mut dyn DiagnosticSink) -> Expansion {
        let Node {
            kind,
            position,
            extra,
        } = node;
        match kind {
            NodeKind::Role { name, value, .. } if name == VAR_ROLE => Expansion::Replace(
                shortcode::resolve(&self.registry, self.mode, &value, position.as_ref(), sink),
            ),
            NodeKind::Role {
                name,
                options,
                children,
                ..
            } if name == SPAN_ROLE => Expansion::Replace(shortcode::span_role(
                self.mode,
                options.get("class").and_then(Value::as_str),
                children,
            )),
            NodeKind::Directive {
                name, args, value, ..
            } if lang_block::is_lang_block(&name) => {
                match lang_block::directive(&name, args.as_deref(), self.mode, value.as_deref()) {
                    Ok(nodes) => Expansion::Replace(nodes),
                    Err(err) => {
                        debug!(%name, "language block not expanded");
                        sink.report(err.into_diagnostic(position.as_ref()));
                        Expansion::Replace(Vec::new())
                    }
                }
            }
            kind => Expansion::Keep(Node {
                kind,
                position,
                extra,
            }),
        }
    }
}

enum Expansion {
    Keep(Node),
    Replace(Vec<Node>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use modedoc_ast::{Options, Position};

    fn span_invocation(class: &str, body: Vec<Node>) -> Node {
        let mut options = Options::new();
        options.insert("class".to_string(), class.into());
        Node::new(NodeKind::Role {
            name: "span".to_string(),
            value: String::new(),
            options,
            children: body,
        })
    }

    #[test]
    fn test_var_roles_expand_in_place() {
        let tree = Node::root(vec![Node::paragraph(vec![
            Node::text("Open "),
            Node::role("var", "nb_app"),
            Node::text(" and press "),
            Node::role("var", "run_key"),
        ])]);

        let outcome = ModeTransform::new(Mode::R).run_collect(tree);
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(
            outcome.tree.text_content(),
            "Open RStudio and press Ctl/Cmd-Shift-Enter"
        );
    }

    #[test]
    fn test_unknown_var_is_dropped_and_reported() {
        let position = Position::on_line(2, 10, 30);
        let tree = Node::root(vec![Node::paragraph(vec![
            Node::text("a"),
            Node::role("var", "nonexistent").with_position(position),
            Node::text("b"),
        ])]);

        let outcome = ModeTransform::new(Mode::Python).run_collect(tree);
        assert_eq!(
            outcome.tree,
            Node::root(vec![Node::paragraph(vec![Node::text("a"), Node::text("b")])])
        );
        assert_eq!(outcome.diagnostics.len(), 1);
        let diag = outcome.diagnostics.iter().next().unwrap();
        assert_eq!(diag.kind, Some(DiagnosticKind::UnknownShortcode));
        assert_eq!(diag.span.and_then(|s| s.line), Some(2));
    }

    #[test]
    fn test_span_role_with_nested_var() {
        let tree = Node::root(vec![Node::paragraph(vec![
            span_invocation(
                "python",
                vec![Node::paragraph(vec![
                    Node::text("use "),
                    Node::role("var", "sum"),
                ])],
            ),
            span_invocation("r", vec![Node::text("R only")]),
        ])]);

        let outcome = ModeTransform::new(Mode::Python).run_collect(tree);
        let paragraph = &outcome.tree.children()[0];
        assert_eq!(
            paragraph.children(),
            &[Node::span(vec![
                Node::text("use "),
                Node::inline_code("np.sum")
            ])]
        );
    }

    #[test]
    fn test_lang_block_directives() {
        let tree = Node::root(vec![
            Node::directive("python", None, Some("x = 1")),
            Node::directive("r", None, Some("x <- 1")),
            Node::directive("lang-block", Some("python"), Some("y = 2")),
        ]);

        let outcome = ModeTransform::new(Mode::Python).run_collect(tree);
        let blocks = outcome.tree.children();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text_content(), "x = 1");
        assert_eq!(blocks[1].text_content(), "y = 2");
    }

    #[test]
    fn test_lang_block_without_argument_warns() {
        let tree = Node::root(vec![Node::directive("lang-block", None, Some("x = 1"))]);
        let outcome = ModeTransform::new(Mode::Python).run_collect(tree);
        assert!(outcome.tree.children().is_empty());
        assert_eq!(
            outcome
                .diagnostics
                .of_kind(DiagnosticKind::MissingLanguageTag)
                .count(),
            1
        );
        assert!(!outcome.diagnostics.has_errors());
        assert_eq!(outcome.diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_unknown_invocations_are_left_alone() {
        let tree = Node::root(vec![
            Node::directive("note", None, Some("careful")),
            Node::paragraph(vec![Node::role("ref", "intro")]),
        ]);
        let outcome = ModeTransform::new(Mode::R).run_collect(tree.clone());
        assert_eq!(outcome.tree, tree);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_expansion_then_div_filter() {
        let tree = Node::root(vec![
            Node::div("r", vec![Node::directive("r", None, Some("sum(x)"))]),
            Node::div(
                "python",
                vec![
                    Node::paragraph(vec![Node::role("var", "lang")]),
                    Node::directive("python", None, Some("np.sum(x)")),
                ],
            ),
        ]);

        let outcome = ModeTransform::new(Mode::Python).run_collect(tree);
        assert_eq!(outcome.tree.count(&|n| n.is_div()), 0);
        assert_eq!(outcome.tree.children().len(), 2);
        assert_eq!(outcome.tree.children()[0].text_content(), "Python");
        assert_eq!(outcome.tree.children()[1].text_content(), "np.sum(x)");
        assert_eq!(outcome.report, FilterReport { lifted: 1, removed: 1 });
    }

    #[test]
    fn test_custom_registry() {
        let mut registry = ModeRegistry::empty();
        registry.insert(Mode::R, "pkg", "dplyr");
        let transform = ModeTransform::with_registry(Mode::R, registry);

        let mut sink: Vec<Diagnostic> = Vec::new();
        let tree = transform.run(
            Node::root(vec![Node::role("var", "pkg"), Node::role("var", "lang")]),
            &mut sink,
        );
        assert_eq!(tree, Node::root(vec![Node::text("dplyr")]));
        assert_eq!(sink.len(), 1);
        assert_eq!(transform.check_registry().len(), 1);
    }

    #[test]
    fn test_from_settings_uses_configured_vars() {
        let settings = Settings::from_toml_str(
            r#"
mode = "r"

[vars.r]
cell = "code chunk"
"#,
        )
        .unwrap();
        let transform = ModeTransform::from_settings(&settings);
        assert_eq!(transform.mode(), Mode::R);

        let outcome = transform.run_collect(Node::root(vec![Node::role("var", "cell")]));
        assert_eq!(outcome.tree, Node::root(vec![Node::text("code chunk")]));
    }
}
