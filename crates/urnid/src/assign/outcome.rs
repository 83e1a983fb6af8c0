use core::fmt;

/// Terminal success state of one document node.
///
/// Failures are reported through [`crate::Error`] instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeOutcome {
    /// The secondary slot's identifier was copied into the primary slot.
    Copied { urn: String },
    /// The target URLs of an identifier in our namespace were replaced.
    Updated { urn: String },
    /// The node carries an identifier of another namespace; left untouched.
    Foreign { urn: String },
    /// A previously stored identifier was written back to the node.
    Reused { urn: String },
    /// A new identifier was registered and stored on the node.
    Registered { urn: String },
    /// Registration for an already existing identity failed. Nothing was
    /// rolled back.
    Recovered { id: i64, reason: String },
}

impl NodeOutcome {
    pub fn urn(&self) -> Option<&str> {
        match self {
            Self::Copied { urn }
            | Self::Updated { urn }
            | Self::Foreign { urn }
            | Self::Reused { urn }
            | Self::Registered { urn } => Some(urn),
            Self::Recovered { .. } => None,
        }
    }
}

impl fmt::Display for NodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copied { urn } => write!(f, "copied {urn} from secondary slot"),
            Self::Updated { urn } => write!(f, "updated target URLs of {urn}"),
            Self::Foreign { urn } => write!(f, "kept {urn} of a foreign namespace"),
            Self::Reused { urn } => write!(f, "reused stored {urn}"),
            Self::Registered { urn } => write!(f, "registered {urn}"),
            Self::Recovered { id, reason } => {
                write!(f, "kept existing identity {id} after failure: {reason}")
            }
        }
    }
}
