//! CLI errors

use std::sync::Arc;

use nodes_admin_lib::error::Error;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] Error),

    /// A cached query settled with an error.
    #[error("{0}")]
    Query(Arc<Error>),

    #[error("The API rejected the session")]
    SessionRejected,

    #[error("Missing configuration: set {0}")]
    MissingConfig(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
