//! Query-time errors.
//!
//! Empty region selections are not errors; they come back as empty
//! collections.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// No city label scored above the similarity threshold for the source.
    #[error("No city matches source '{0}'")]
    SourceNotFound(String),

    /// No city label scored above the similarity threshold for the destination.
    #[error("No city matches destination '{0}'")]
    DestinationNotFound(String),

    /// Both endpoints exist but lie in different components.
    #[error("No route between '{from}' and '{to}'")]
    NoPath { from: String, to: String },

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// A query needed the session's location and none was set.
    #[error("No location given and none set for this session")]
    NoLocation,
}

pub type Result<T> = std::result::Result<T, QueryError>;
