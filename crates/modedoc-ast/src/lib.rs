//! modedoc-ast - Document tree definitions
//!
//! This crate provides the node types used by modedoc for representing
//! parsed documents. The tree mirrors mdast: every node carries a `type`
//! discriminant, ordered children where applicable, and an optional
//! source position.
//!
//! # Example
//!
//! ```
//! use modedoc_ast::Node;
//!
//! let tree = Node::root(vec![
//!     Node::div("python", vec![Node::text("x")]),
//!     Node::div("r", vec![Node::text("y")]),
//! ]);
//! assert_eq!(tree.count(&|n| n.is_div()), 2);
//! ```

pub mod node;
pub mod position;

pub use node::{Fields, Node, NodeKind, Options, CODE_CELL};
pub use position::{Point, Position};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
