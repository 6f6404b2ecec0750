/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Pid, ProfileId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persistence store errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum StoreError {
    #[error("Record {0} not found")]
    #[diagnostic(
        code(store::not_found),
        help("No record is bound to this key. Callers may fall back to a search.")
    )]
    NotFound(String),

    #[error("Store backend failure: {0}")]
    #[diagnostic(
        code(store::backend),
        help("The underlying store rejected the operation. Check store health.")
    )]
    Backend(String),
}

impl StoreError {
    /// Whether this is a lookup miss rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Process-table query errors
///
/// These are soft during metadata gathering and hard during an ancestry walk.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum IntrospectionError {
    #[error("Process {0} does not exist")]
    #[diagnostic(
        code(introspection::no_such_process),
        help("The process may have exited between the connection event and resolution.")
    )]
    NoSuchProcess(Pid),

    #[error("Failed to read {field} of process {pid}: {message}")]
    #[diagnostic(code(introspection::query_failed))]
    Query {
        pid: Pid,
        field: String,
        message: String,
    },

    #[error("Querying {0} is not supported on this platform")]
    #[diagnostic(code(introspection::unsupported))]
    Unsupported(String),
}

impl IntrospectionError {
    /// Build a query error for one field
    pub fn query(pid: Pid, field: &str, message: impl ToString) -> Self {
        IntrospectionError::Query {
            pid,
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Hard resolution failures, propagated unchanged to the caller of `resolve`
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ResolveError {
    #[error("Ancestry walk from process {pid} failed at hop {hop}: {source}")]
    #[diagnostic(
        code(resolve::ancestry_walk),
        help("A parent process exited or became unreadable during framework resolution.")
    )]
    AncestryWalk {
        pid: Pid,
        hop: u8,
        #[source]
        source: IntrospectionError,
    },

    #[error("Framework rewrite of profile {profile} failed: {reason}")]
    #[diagnostic(
        code(resolve::framework_rewrite),
        help("The command line did not have the shape the framework rule expects.")
    )]
    FrameworkRewrite { profile: ProfileId, reason: String },

    #[error("Failed to persist process {pid}: {source}")]
    #[diagnostic(code(resolve::persistence))]
    Persistence {
        pid: Pid,
        #[source]
        source: StoreError,
    },

    #[error("Merge delegation from process {pid} exceeded {limit} hops")]
    #[diagnostic(
        code(resolve::merge_depth_exceeded),
        help("Merge-with-parent profiles form a cycle or an implausibly deep chain.")
    )]
    MergeDepthExceeded { pid: Pid, limit: usize },
}

/// Active profile set registry errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum RegistryError {
    #[error("Registry has been shut down")]
    #[diagnostic(
        code(registry::shut_down),
        help("Construct a new registry; a shut down registry accepts no sets.")
    )]
    ShutDown,

    #[error("Identity layer must keep id {expected}, got {found}")]
    #[diagnostic(
        code(registry::identity_mismatch),
        help("Deactivate the set and register a new one under the new identity.")
    )]
    IdentityMismatch {
        expected: ProfileId,
        found: ProfileId,
    },
}

/// Configuration errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {var}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Booleans accept 1/0/true/false; policies accept deny/allow.")
    )]
    InvalidValue { var: String, value: String },

    #[error("Failed to read {path}: {message}")]
    #[diagnostic(code(config::io))]
    Io { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    #[diagnostic(code(config::parse))]
    Parse { path: String, message: String },
}

/// Unified crate error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("Resolve error: {0}")]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Registry error: {0}")]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error("Store error: {0}")]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(procprofile::io_error),
        help("Filesystem or I/O operation failed. Check permissions.")
    )]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type for crate-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type for process-table queries
pub type IntrospectionResult<T> = std::result::Result<T, IntrospectionError>;

/// Result type for resolution
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
