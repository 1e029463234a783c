//! Mode registry
//!
//! One immutable dictionary per [`Mode`], mapping a short-code name to the
//! content that replaces it. Supporting another mode means adding a
//! dictionary here; the resolver never looks at individual modes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use modedoc_ast::Node;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::mode::Mode;

/// What a short-code expands to
///
/// In configuration files a plain string is [`ReplacementContent::Text`]
/// and a list of node tables is [`ReplacementContent::Nodes`]:
///
/// ```toml
/// [vars.python]
/// lang = "Python"
/// sum = [{ type = "inlineCode", value = "np.sum" }]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplacementContent {
    /// Literal text, expanded to a single text node
    Text(String),
    /// Ready-made inline nodes, spliced verbatim
    Nodes(Vec<Node>),
}

impl ReplacementContent {
    /// Nodes to splice at the invocation site
    pub fn to_nodes(&self) -> Vec<Node> {
        match self {
            ReplacementContent::Text(value) => vec![Node::text(value.as_str())],
            ReplacementContent::Nodes(nodes) => nodes.clone(),
        }
    }
}

impl From<&str> for ReplacementContent {
    fn from(value: &str) -> Self {
        ReplacementContent::Text(value.to_string())
    }
}

impl From<Vec<Node>> for ReplacementContent {
    fn from(nodes: Vec<Node>) -> Self {
        ReplacementContent::Nodes(nodes)
    }
}

/// Name to replacement mapping for a single mode
pub type Dictionary = BTreeMap<String, ReplacementContent>;

/// Per-mode short-code dictionaries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeRegistry {
    dictionaries: BTreeMap<Mode, Dictionary>,
}

impl ModeRegistry {
    /// Registry with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding the reference Python and R dictionaries
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.extend(Mode::R, r_vars());
        registry.extend(Mode::Python, python_vars());
        registry
    }

    /// Add or replace one entry
    pub fn insert(
        &mut self,
        mode: Mode,
        name: impl Into<String>,
        content: impl Into<ReplacementContent>,
    ) {
        self.dictionaries
            .entry(mode)
            .or_default()
            .insert(name.into(), content.into());
    }

    /// Add or replace many entries for one mode
    pub fn extend<I>(&mut self, mode: Mode, entries: I)
    where
        I: IntoIterator<Item = (String, ReplacementContent)>,
    {
        self.dictionaries.entry(mode).or_default().extend(entries);
    }

    /// Look up `name` in the dictionary for `mode`
    pub fn lookup(&self, mode: Mode, name: &str) -> Option<&ReplacementContent> {
        self.dictionaries.get(&mode)?.get(name)
    }

    /// Dictionary for a mode, if any entries were registered
    pub fn dictionary(&self, mode: Mode) -> Option<&Dictionary> {
        self.dictionaries.get(&mode)
    }

    /// Names defined for `mode`, in sorted order
    pub fn names(&self, mode: Mode) -> impl Iterator<Item = &str> {
        self.dictionaries
            .get(&mode)
            .into_iter()
            .flat_map(|d| d.keys().map(String::as_str))
    }

    /// Modes with a registered dictionary
    pub fn modes(&self) -> impl Iterator<Item = Mode> + '_ {
        self.dictionaries.keys().copied()
    }

    /// Report names that some modes define and others do not
    ///
    /// Every supported mode is checked, including modes with no dictionary
    /// at all. One warning is produced per missing (name, mode) pair.
    pub fn consistency_report(&self) -> Vec<Diagnostic> {
        let all_names: BTreeSet<&str> = self
            .dictionaries
            .values()
            .flat_map(|d| d.keys().map(String::as_str))
            .collect();

        let mut report = Vec::new();
        for name in all_names {
            let defined: Vec<&str> = Mode::ALL
                .iter()
                .filter(|m| self.lookup(**m, name).is_some())
                .map(|m| m.as_str())
                .collect();
            for mode in Mode::ALL {
                if self.lookup(mode, name).is_none() {
                    report.push(
                        Diagnostic::from_kind(
                            DiagnosticKind::RegistryMismatch,
                            format!(
                                "variable \"{}\" is defined for {} but missing for {}",
                                name,
                                defined.join(", "),
                                mode
                            ),
                        )
                        .with_help(format!("Add \"{}\" to the {} dictionary", name, mode)),
                    );
                }
            }
        }
        report
    }
}

fn text_entries(entries: &[(&str, &str)]) -> Vec<(String, ReplacementContent)> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), ReplacementContent::from(*value)))
        .collect()
}

fn code_entries(entries: &[(&str, &str)]) -> Vec<(String, ReplacementContent)> {
    entries
        .iter()
        .map(|(name, code)| {
            (
                name.to_string(),
                ReplacementContent::Nodes(vec![Node::inline_code(*code)]),
            )
        })
        .collect()
}

fn r_vars() -> Vec<(String, ReplacementContent)> {
    text_entries(&[
        ("lang", "R"),
        ("np_or_r", "R"),
        ("other_lang", "Python"),
        ("cell", "chunk"),
        ("nb_app", "RStudio"),
        ("nb_fmt", "RMarkdown"),
        ("run_key", "Ctl/Cmd-Shift-Enter"),
        ("array", "vector"),
        ("an_array", "a vector"),
        ("true", "`TRUE`"),
        ("false", "`FALSE`"),
        ("sample", "`sample`"),
        ("bincount", "`tabulate`"),
        ("sum", "`sum`"),
    ])
}

fn python_vars() -> Vec<(String, ReplacementContent)> {
    let mut vars = text_entries(&[
        ("lang", "Python"),
        ("np_or_r", "NumPy"),
        ("other_lang", "R"),
        ("cell", "cell"),
        ("nb_app", "Jupyter"),
        ("nb_fmt", "Jupyter"),
        ("run_key", "Shift-Enter"),
        ("array", "array"),
        ("an_array", "an array"),
    ]);
    vars.extend(code_entries(&[
        ("true", "True"),
        ("false", "False"),
        ("sample", "rnd.choice"),
        ("bincount", "np.bincount"),
        ("sum", "np.sum"),
    ]));
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = ModeRegistry::builtin();
        assert_eq!(
            registry.lookup(Mode::R, "nb_app"),
            Some(&ReplacementContent::Text("RStudio".to_string()))
        );
        assert_eq!(
            registry.lookup(Mode::Python, "sum"),
            Some(&ReplacementContent::Nodes(vec![Node::inline_code("np.sum")]))
        );
        assert!(registry.lookup(Mode::Python, "nonexistent").is_none());
    }

    #[test]
    fn test_builtin_dictionaries_are_parallel() {
        let registry = ModeRegistry::builtin();
        let python: Vec<_> = registry.names(Mode::Python).collect();
        let r: Vec<_> = registry.names(Mode::R).collect();
        assert_eq!(python, r);
        assert_eq!(python.len(), 14);
        assert!(registry.consistency_report().is_empty());
    }

    #[test]
    fn test_consistency_report_flags_missing_names() {
        let mut registry = ModeRegistry::builtin();
        registry.insert(Mode::Python, "import", "import numpy as np");

        let report = registry.consistency_report();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].kind, Some(DiagnosticKind::RegistryMismatch));
        assert!(report[0].message.contains("\"import\""));
        assert!(report[0].message.contains("missing for r"));
    }

    #[test]
    fn test_consistency_report_covers_modes_without_dictionary() {
        let mut registry = ModeRegistry::empty();
        registry.insert(Mode::R, "lang", "R");
        let report = registry.consistency_report();
        assert_eq!(report.len(), 1);
        assert!(report[0].message.contains("missing for python"));
    }

    #[test]
    fn test_insert_overrides() {
        let mut registry = ModeRegistry::builtin();
        registry.insert(Mode::R, "nb_app", "Positron");
        assert_eq!(
            registry.lookup(Mode::R, "nb_app").map(ReplacementContent::to_nodes),
            Some(vec![Node::text("Positron")])
        );
    }

    #[test]
    fn test_replacement_content_untagged() {
        let text: ReplacementContent = serde_json::from_str(r#""chunk""#).unwrap();
        assert_eq!(text, ReplacementContent::from("chunk"));

        let nodes: ReplacementContent =
            serde_json::from_str(r#"[{"type":"inlineCode","value":"True"}]"#).unwrap();
        assert_eq!(nodes.to_nodes(), vec![Node::inline_code("True")]);
    }
}
