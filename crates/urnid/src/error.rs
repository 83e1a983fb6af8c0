//! Error types for URN allocation and registration.
//!
//! Everything that can go wrong while allocating, synthesizing or registering
//! an identifier surfaces as one [`Error`]. Storage write-back and rollback
//! deletes report `false` instead and never replace the error that triggered
//! them.

use crate::ChecksumError;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors `urnid` can produce.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid configuration, detected before any store or network call.
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// The check digit could not be computed.
    #[error("Checksum error: {0}")]
    Checksum(#[from] ChecksumError),

    /// A singleton-scoped (work, structure type) pair occurs more than once.
    ///
    /// This is never repaired automatically.
    #[error("URN database in inconsistent state: {rows} rows for work '{work_id}' and type '{structure_type}'")]
    InconsistentStore {
        work_id: String,
        structure_type: String,
        rows: usize,
    },

    /// A statement against the identity table failed.
    #[error("Storage error: {reason}")]
    Storage { reason: String },

    /// The resolver service answered with an unexpected status.
    #[error("{status}: reason-> {detail}")]
    Registration { status: u16, detail: String },

    /// A success status arrived without the expected body.
    #[error("{status}: reason-> no response provided")]
    EmptyResponse { status: u16 },

    /// The resolver registered a different identifier than the one requested.
    #[error("Requested URN '{requested}' but service registered '{returned}'")]
    UrnMismatch { requested: String, returned: String },

    /// Timestamp synthesis kept colliding with stored identifiers.
    #[error("Tried to create an already existing URN {attempts} times: {urn}")]
    DuplicateExhausted { urn: String, attempts: u32 },

    /// The node has no writable identifier slot.
    #[error("No URN was created because the metadata type is not allowed for '{structure_type}'")]
    NotAllowed { structure_type: String },

    /// The HTTP request could not be performed.
    #[cfg_attr(docsrs, doc(cfg(feature = "client")))]
    #[cfg(feature = "client")]
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A request or response body could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage {
            reason: err.to_string(),
        }
    }
}
