//! Language block directive
//!
//! A fenced block written for one language:
//!
//! ````markdown
//! ```{python}
//! x = 1
//! ```
//! ````
//!
//! becomes an executable cell when that language is the active mode and
//! disappears otherwise. This is how Python and R sources share one input
//! and diverge into per-language outputs.

use tracing::debug;

use modedoc_ast::Node;

use crate::mode::Mode;
use crate::shortcode::ShortcodeError;

/// Generic directive name; the language is taken from its argument
pub const LANG_BLOCK_DIRECTIVE: &str = "lang-block";

/// Check whether a directive name is handled by [`directive`]
pub fn is_lang_block(name: &str) -> bool {
    name == LANG_BLOCK_DIRECTIVE || Mode::from_tag(name).is_some()
}

/// Emit an executable block for `tag`
///
/// Returns exactly one block when `tag` names `mode`, otherwise nothing.
/// The body is copied verbatim; an absent body is treated as empty.
pub fn emit(tag: &str, mode: Mode, body: Option<&str>) -> Vec<Node> {
    if tag != mode.as_str() {
        debug!(tag, %mode, "eliding language block");
        return Vec::new();
    }

    let code = Node::code(Some(tag), true, body.unwrap_or_default());
    let block = Node::code_cell(vec![code, Node::output()]);
    vec![block]
}

/// Expand a language block directive invocation
///
/// Invoked by a mode alias (`python`, `r`) the alias is the tag; invoked
/// as `lang-block` the tag is the directive argument. Without one nothing
/// can be emitted and [`ShortcodeError::MissingTag`] is returned, which the
/// pipeline reports as a warning.
pub fn directive(
    name: &str,
    args: Option<&str>,
    mode: Mode,
    body: Option<&str>,
) -> Result<Vec<Node>, ShortcodeError> {
    let tag = if name == LANG_BLOCK_DIRECTIVE {
        args.map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(ShortcodeError::MissingTag)?
    } else {
        name
    };
    Ok(emit(tag, mode, body))
}
