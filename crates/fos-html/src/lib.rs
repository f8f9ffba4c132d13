//! fOS HTML Parser
//!
//! HTML5 fragment parsing built on html5ever, producing detached nodes in
//! a `fos_dom::DomTree`, plus innerHTML/outerHTML serialization.

mod parser;
mod serializer;

pub use fos_dom::{DomTree, NodeId};
pub use parser::{HtmlParser, DEFAULT_CONTEXT};
pub use serializer::{inner_html, outer_html};

/// Parse a markup fragment into detached top-level nodes inside `tree`.
/// Any content is accepted, table rows and cells included.
pub fn parse_fragment(tree: &mut DomTree, markup: &str) -> Result<Vec<NodeId>, ParseError> {
    HtmlParser::new().parse_fragment(tree, markup, DEFAULT_CONTEXT)
}

/// Parse `markup` the way it would be read as the content of a `context`
/// element (`tbody`, `select`, `p`, ...)
pub fn parse_fragment_in(
    tree: &mut DomTree,
    markup: &str,
    context: &str,
) -> Result<Vec<NodeId>, ParseError> {
    HtmlParser::new().parse_fragment(tree, markup, context)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("DOM construction failed: {0}")]
    Dom(#[from] fos_dom::DomError),
}
