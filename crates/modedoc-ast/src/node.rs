//! Document tree nodes
//!
//! A document is a single [`Node`] tree. Each node pairs a [`NodeKind`]
//! (the `type` discriminant plus the payload modedoc interprets) with an
//! optional source [`Position`] and the remaining fields of the node.
//! Sibling order inside `children` is meaningful and every rewrite in
//! modedoc preserves it.
//!
//! The JSON form is mdast-compatible:
//!
//! ```json
//! { "type": "div", "class": "python", "children": [ { "type": "text", "value": "x" } ] }
//! ```
//!
//! The tree is open. Fields a variant does not declare (`identifier` on a
//! heading, `meta` on code, ...) are kept in [`Node::extra`], and a node whose
//! `type` modedoc does not know becomes [`NodeKind::Other`]. Both are written
//! back unchanged, so a host tree passes through with only the rewritten
//! parts differing.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::position::Position;

/// Raw JSON fields of a node
pub type Fields = Map<String, Value>;

/// Key/value options attached to roles and directives
pub type Options = Fields;

/// `kind` of the executable cell block produced for a language block
pub const CODE_CELL: &str = "code";

/// A node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node type and payload
    pub kind: NodeKind,

    /// Source range the node was parsed from
    pub position: Option<Position>,

    /// Fields not interpreted by modedoc, carried through unchanged
    pub extra: Fields,
}

/// Node type discriminant and payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    /// Document root
    Root {
        #[serde(default)]
        children: Vec<Node>,
    },
    /// A paragraph of inline content
    Paragraph {
        #[serde(default)]
        children: Vec<Node>,
    },
    /// A section heading
    Heading {
        depth: u8,
        #[serde(default)]
        children: Vec<Node>,
    },
    /// Plain text
    Text { value: String },
    /// Inline code span
    InlineCode { value: String },
    /// Emphasised inline content
    Emphasis {
        #[serde(default)]
        children: Vec<Node>,
    },
    /// Strongly emphasised inline content
    Strong {
        #[serde(default)]
        children: Vec<Node>,
    },
    /// A hyperlink
    Link {
        url: String,
        #[serde(default)]
        children: Vec<Node>,
    },
    /// An ordered or unordered list
    List {
        #[serde(default)]
        children: Vec<Node>,
    },
    /// A single list item
    ListItem {
        #[serde(default)]
        children: Vec<Node>,
    },
    /// A block quotation
    Blockquote {
        #[serde(default)]
        children: Vec<Node>,
    },
    /// Generic inline wrapper
    Span {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        class: Option<String>,
        #[serde(default)]
        children: Vec<Node>,
    },
    /// A code listing
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
        #[serde(default, skip_serializing_if = "is_false")]
        executable: bool,
        value: String,
    },
    /// Execution output placeholder
    Output {
        #[serde(default, skip_serializing_if = "Value::is_null")]
        data: Value,
    },
    /// Structural unit grouping a cell's nodes
    Block {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Fields>,
        #[serde(default)]
        children: Vec<Node>,
    },
    /// Classified container, dissolved or deleted by the div filter
    Div {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        class: Option<String>,
        #[serde(default)]
        children: Vec<Node>,
    },
    /// Unexpanded inline short-code invocation, e.g. ``{var}`lang` ``
    Role {
        name: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        value: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Options,
        #[serde(default)]
        children: Vec<Node>,
    },
    /// Unexpanded block-level invocation, e.g. a fenced `{python}` block
    Directive {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        args: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        options: Options,
    },
    /// Hard line break
    Break,
    /// Horizontal rule
    ThematicBreak,
    /// A node type modedoc does not interpret (`image`, `table`, `math`, ...)
    ///
    /// Its children, when present, are still walked by every rewrite.
    #[serde(skip)]
    Other {
        node_type: String,
        children: Option<Vec<Node>>,
    },
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl NodeKind {
    /// Fields a known `type` declares, `None` for types modedoc does not know
    fn declared_fields(node_type: &str) -> Option<&'static [&'static str]> {
        let fields: &'static [&'static str] = match node_type {
            "root" | "paragraph" | "emphasis" | "strong" | "list" | "listItem" | "blockquote" => {
                &["children"]
            }
            "heading" => &["depth", "children"],
            "text" | "inlineCode" => &["value"],
            "link" => &["url", "children"],
            "span" | "div" => &["class", "children"],
            "code" => &["lang", "executable", "value"],
            "output" => &["data"],
            "block" => &["kind", "data", "children"],
            "role" => &["name", "value", "options", "children"],
            "directive" => &["name", "args", "value", "options"],
            "break" | "thematicBreak" => &[],
            _ => return None,
        };
        Some(fields)
    }
}

#[derive(Serialize)]
struct KnownRepr<'a> {
    #[serde(flatten)]
    kind: &'a NodeKind,
    #[serde(flatten)]
    extra: &'a Fields,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a Position>,
}

#[derive(Serialize)]
struct OtherRepr<'a> {
    #[serde(rename = "type")]
    node_type: &'a str,
    #[serde(flatten)]
    extra: &'a Fields,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<&'a Vec<Node>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a Position>,
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.kind {
            NodeKind::Other {
                node_type,
                children,
            } => OtherRepr {
                node_type,
                extra: &self.extra,
                children: children.as_ref(),
                position: self.position.as_ref(),
            }
            .serialize(serializer),
            kind => KnownRepr {
                kind,
                extra: &self.extra,
                position: self.position.as_ref(),
            }
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut extra = Fields::deserialize(deserializer)?;

        let position = match extra.remove("position") {
            None | Some(Value::Null) => None,
            Some(value) => Some(Position::deserialize(value).map_err(de::Error::custom)?),
        };
        let node_type = match extra.remove("type") {
            Some(Value::String(node_type)) => node_type,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "node type must be a string, found {}",
                    other
                )))
            }
            None => return Err(de::Error::missing_field("type")),
        };

        let kind = match NodeKind::declared_fields(&node_type) {
            Some(names) => {
                let mut declared = Fields::new();
                declared.insert("type".to_string(), Value::String(node_type));
                for name in names {
                    if let Some(value) = extra.remove(*name) {
                        declared.insert((*name).to_string(), value);
                    }
                }
                NodeKind::deserialize(Value::Object(declared)).map_err(de::Error::custom)?
            }
            None => {
                let children = match extra.remove("children") {
                    Some(value) => {
                        Some(Vec::<Node>::deserialize(value).map_err(de::Error::custom)?)
                    }
                    None => None,
                };
                NodeKind::Other {
                    node_type,
                    children,
                }
            }
        };

        Ok(Node {
            kind,
            position,
            extra,
        })
    }
}

impl Node {
    /// Create a node without a source position
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            position: None,
            extra: Fields::new(),
        }
    }

    /// Attach a source position
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Document root
    pub fn root(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Root { children })
    }

    /// Paragraph
    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Paragraph { children })
    }

    /// Heading of the given depth
    pub fn heading(depth: u8, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Heading { depth, children })
    }

    /// Plain text
    pub fn text(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Text {
            value: value.into(),
        })
    }

    /// Inline code
    pub fn inline_code(value: impl Into<String>) -> Self {
        Self::new(NodeKind::InlineCode {
            value: value.into(),
        })
    }

    /// Emphasis
    pub fn emphasis(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Emphasis { children })
    }

    /// Strong emphasis
    pub fn strong(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Strong { children })
    }

    /// Unclassified span
    pub fn span(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Span {
            class: None,
            children,
        })
    }

    /// Div classified by `class`
    pub fn div(class: impl Into<String>, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Div {
            class: Some(class.into()),
            children,
        })
    }

    /// Div without a classification attribute
    pub fn unclassified_div(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Div {
            class: None,
            children,
        })
    }

    /// Code listing
    pub fn code(lang: Option<&str>, executable: bool, value: impl Into<String>) -> Self {
        Self::new(NodeKind::Code {
            lang: lang.map(str::to_string),
            executable,
            value: value.into(),
        })
    }

    /// Empty output placeholder
    pub fn output() -> Self {
        Self::new(NodeKind::Output {
            data: Value::Array(Vec::new()),
        })
    }

    /// Executable cell grouping `children`
    pub fn code_cell(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Block {
            kind: Some(CODE_CELL.to_string()),
            data: Some(Fields::new()),
            children,
        })
    }

    /// Inline role invocation
    pub fn role(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(NodeKind::Role {
            name: name.into(),
            value: value.into(),
            options: Options::new(),
            children: Vec::new(),
        })
    }

    /// Block directive invocation
    pub fn directive(name: impl Into<String>, args: Option<&str>, value: Option<&str>) -> Self {
        Self::new(NodeKind::Directive {
            name: name.into(),
            args: args.map(str::to_string),
            value: value.map(str::to_string),
            options: Options::new(),
        })
    }

    /// The mdast `type` name of this node
    pub fn type_name(&self) -> &str {
        match &self.kind {
            NodeKind::Root { .. } => "root",
            NodeKind::Paragraph { .. } => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::Text { .. } => "text",
            NodeKind::InlineCode { .. } => "inlineCode",
            NodeKind::Emphasis { .. } => "emphasis",
            NodeKind::Strong { .. } => "strong",
            NodeKind::Link { .. } => "link",
            NodeKind::List { .. } => "list",
            NodeKind::ListItem { .. } => "listItem",
            NodeKind::Blockquote { .. } => "blockquote",
            NodeKind::Span { .. } => "span",
            NodeKind::Code { .. } => "code",
            NodeKind::Output { .. } => "output",
            NodeKind::Block { .. } => "block",
            NodeKind::Div { .. } => "div",
            NodeKind::Role { .. } => "role",
            NodeKind::Directive { .. } => "directive",
            NodeKind::Break => "break",
            NodeKind::ThematicBreak => "thematicBreak",
            NodeKind::Other { node_type, .. } => node_type,
        }
    }

    /// Check if this node is a div container
    pub fn is_div(&self) -> bool {
        matches!(self.kind, NodeKind::Div { .. })
    }

    /// Child nodes, empty for leaves
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Root { children }
            | NodeKind::Paragraph { children }
            | NodeKind::Heading { children, .. }
            | NodeKind::Emphasis { children }
            | NodeKind::Strong { children }
            | NodeKind::Link { children, .. }
            | NodeKind::List { children }
            | NodeKind::ListItem { children }
            | NodeKind::Blockquote { children }
            | NodeKind::Span { children, .. }
            | NodeKind::Block { children, .. }
            | NodeKind::Div { children, .. }
            | NodeKind::Role { children, .. }
            | NodeKind::Other {
                children: Some(children),
                ..
            } => children,
            NodeKind::Text { .. }
            | NodeKind::InlineCode { .. }
            | NodeKind::Code { .. }
            | NodeKind::Output { .. }
            | NodeKind::Directive { .. }
            | NodeKind::Break
            | NodeKind::ThematicBreak
            | NodeKind::Other { children: None, .. } => &[],
        }
    }

    /// Mutable child list, `None` for leaves
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.kind {
            NodeKind::Root { children }
            | NodeKind::Paragraph { children }
            | NodeKind::Heading { children, .. }
            | NodeKind::Emphasis { children }
            | NodeKind::Strong { children }
            | NodeKind::Link { children, .. }
            | NodeKind::List { children }
            | NodeKind::ListItem { children }
            | NodeKind::Blockquote { children }
            | NodeKind::Span { children, .. }
            | NodeKind::Block { children, .. }
            | NodeKind::Div { children, .. }
            | NodeKind::Role { children, .. } => Some(children),
            NodeKind::Other { children, .. } => children.as_mut(),
            _ => None,
        }
    }

    /// Take the child list out of the node, leaving it empty
    pub fn take_children(&mut self) -> Vec<Node> {
        self.children_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Count nodes in this subtree (including self) matching `pred`
    pub fn count(&self, pred: &dyn Fn(&Node) -> bool) -> usize {
        let own = usize::from(pred(self));
        own + self.children().iter().map(|c| c.count(pred)).sum::<usize>()
    }

    /// Maximum nesting depth of this subtree; a leaf has depth 1
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Concatenated text of all `text`, `inlineCode` and `code` leaves
    pub fn text_content(&self) -> String {
        match &self.kind {
            NodeKind::Text { value }
            | NodeKind::InlineCode { value }
            | NodeKind::Code { value, .. } => value.clone(),
            _ => self.children().iter().map(Node::text_content).collect(),
        }
    }
}

impl From<NodeKind> for Node {
    fn from(kind: NodeKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use serde_json::json;

    #[test]
    fn test_leaf_has_no_children() {
        let mut text = Node::text("hello");
        assert!(text.children().is_empty());
        assert!(text.children_mut().is_none());
        assert!(text.take_children().is_empty());
    }

    #[test]
    fn test_take_children_empties_parent() {
        let mut div = Node::div("python", vec![Node::text("a"), Node::text("b")]);
        let kids = div.take_children();
        assert_eq!(kids.len(), 2);
        assert!(div.children().is_empty());
        assert!(div.is_div());
    }

    #[test]
    fn test_count_and_depth() {
        let tree = Node::root(vec![
            Node::div("r", vec![Node::div("python", vec![Node::text("x")])]),
            Node::paragraph(vec![Node::text("y")]),
        ]);
        assert_eq!(tree.count(&|n| n.is_div()), 2);
        assert_eq!(tree.count(&|n| n.type_name() == "text"), 2);
        assert_eq!(tree.depth(), 4);
    }

    #[test]
    fn test_text_content() {
        let para = Node::paragraph(vec![
            Node::text("use "),
            Node::inline_code("np.sum"),
            Node::strong(vec![Node::text("!")]),
        ]);
        assert_eq!(para.text_content(), "use np.sum!");
    }

    #[test]
    fn test_json_shape_is_mdast() {
        let div = Node::div("python", vec![Node::text("x")]);
        let json = serde_json::to_value(&div).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "div",
                "class": "python",
                "children": [{ "type": "text", "value": "x" }]
            })
        );
    }

    #[test]
    fn test_code_cell_shape() {
        let cell = Node::code_cell(vec![Node::code(Some("r"), true, "x"), Node::output()]);
        assert_eq!(
            serde_json::to_value(&cell).unwrap(),
            json!({
                "type": "block",
                "kind": "code",
                "data": {},
                "children": [
                    { "type": "code", "lang": "r", "executable": true, "value": "x" },
                    { "type": "output", "data": [] }
                ]
            })
        );
    }

    #[test]
    fn test_deserialize_with_position_and_defaults() {
        let json = r#"{
            "type": "role",
            "name": "var",
            "value": "lang",
            "position": {
                "start": { "line": 4, "column": 7 },
                "end": { "line": 4, "column": 18 }
            }
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.position, Some(Position::on_line(4, 7, 18)));
        assert!(node.extra.is_empty());
        match node.kind {
            NodeKind::Role {
                name,
                value,
                options,
                children,
            } => {
                assert_eq!(name, "var");
                assert_eq!(value, "lang");
                assert!(options.is_empty());
                assert!(children.is_empty());
            }
            other => panic!("Expected role, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_unclassified_div() {
        let node: Node = serde_json::from_str(r#"{"type":"div","children":[]}"#).unwrap();
        assert_eq!(node, Node::unclassified_div(vec![]));
    }

    #[test]
    fn test_unit_variants() {
        let json = serde_json::to_string(&Node::new(NodeKind::ThematicBreak)).unwrap();
        assert_eq!(json, r#"{"type":"thematicBreak"}"#);
        let node: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node.type_name(), "thematicBreak");
    }

    #[test]
    fn test_undeclared_fields_are_kept() {
        let input = json!([
            { "type": "heading", "depth": 2, "identifier": "intro", "label": "Intro",
              "children": [{ "type": "text", "value": "Intro" }] },
            { "type": "code", "lang": "python", "meta": "linenos", "value": "x" },
            { "type": "link", "url": "u", "title": "T", "children": [] },
            { "type": "list", "ordered": false, "spread": false, "children": [] }
        ]);
        let nodes: Vec<Node> = serde_json::from_value(input.clone()).unwrap();

        assert_eq!(nodes[0].extra.get("identifier"), Some(&json!("intro")));
        assert!(matches!(nodes[0].kind, NodeKind::Heading { depth: 2, .. }));
        assert_eq!(nodes[1].extra.get("meta"), Some(&json!("linenos")));
        assert_eq!(serde_json::to_value(&nodes).unwrap(), input);
    }

    #[test]
    fn test_unknown_type_is_kept_and_walked() {
        let input = json!({
            "type": "root",
            "children": [
                { "type": "image", "url": "a.png", "alt": "plot" },
                { "type": "table", "align": ["left"], "children": [
                    { "type": "div", "class": "r", "children": [] }
                ] }
            ]
        });
        let tree: Node = serde_json::from_value(input.clone()).unwrap();

        let image = &tree.children()[0];
        assert_eq!(image.type_name(), "image");
        assert!(image.children().is_empty());
        assert_eq!(image.extra.get("url"), Some(&json!("a.png")));
        assert_eq!(tree.count(&|n| n.is_div()), 1);
        assert_eq!(serde_json::to_value(&tree).unwrap(), input);
    }

    #[test]
    fn test_plain_code_does_not_gain_executable() {
        let json = serde_json::to_value(Node::code(Some("python"), false, "x")).unwrap();
        assert_eq!(json, json!({ "type": "code", "lang": "python", "value": "x" }));
    }

    #[test]
    fn test_missing_type_is_an_error() {
        let err = serde_json::from_str::<Node>(r#"{"value":"x"}"#).unwrap_err();
        assert!(err.to_string().contains("type"));
    }
}
