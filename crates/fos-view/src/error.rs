//! View errors

use crate::ViewId;
use fos_dom::DomError;
use fos_html::ParseError;

/// Result type for view operations
pub type ViewResult<T> = Result<T, ViewError>;

/// View errors
///
/// Configuration variants describe a contract broken by the view author
/// and are raised before any state is committed.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("Template string or function needed")]
    MissingTemplate,

    #[error("Views can only have one root element, template produced {count}")]
    MultipleRoots { count: usize },

    #[error("Template produced no root element")]
    EmptyTemplate,

    #[error("Cannot register bindings without a model")]
    MissingModel,

    #[error("Container not found: {0}")]
    MissingContainer(String),

    #[error("View {0} has been removed")]
    Removed(ViewId),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    #[error("Markup error: {0}")]
    Parse(#[from] ParseError),
}

impl ViewError {
    /// Whether this error reports a broken authoring contract
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingTemplate
                | Self::MultipleRoots { .. }
                | Self::EmptyTemplate
                | Self::MissingModel
                | Self::MissingContainer(_)
                | Self::Config(_)
        )
    }
}
