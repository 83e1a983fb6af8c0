//! Interpretation of resolver responses.
//!
//! Both operations share one status contract: a success status specific to
//! the operation, structured error bodies for client errors, and everything
//! else reported as unhandled. [`RegistrationOutcome::interpret`] is the one
//! place that contract lives.

use crate::{Error, Result, ServiceError, UrnCreated};

/// Statuses whose body is parsed as a structured [`ServiceError`].
pub const STRUCTURED_ERROR_STATUSES: core::ops::RangeInclusive<u16> = 401..=429;

/// Which success contract a response is held to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expectation {
    /// `POST /urns`: any 2xx with a body naming the registered URN.
    Created,
    /// `PATCH .../my-urls`: exactly `204 No Content`.
    Updated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created { urn: String },
    Updated,
    Rejected { status: u16, detail: String },
}

impl RegistrationOutcome {
    /// Classifies a response by status and (possibly absent) body.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyResponse`] for a created-success status without body
    /// - [`Error::Json`] if a success body is not the expected JSON
    pub fn interpret(expect: Expectation, status: u16, body: Option<&str>) -> Result<Self> {
        let body = body.map(str::trim).filter(|b| !b.is_empty());
        match expect {
            Expectation::Created if (200..300).contains(&status) => {
                let body = body.ok_or(Error::EmptyResponse { status })?;
                let created: UrnCreated = serde_json::from_str(body)?;
                Ok(Self::Created { urn: created.urn })
            }
            Expectation::Updated if status == 204 => Ok(Self::Updated),
            _ => Ok(Self::Rejected {
                status,
                detail: rejection_detail(status, body),
            }),
        }
    }

    /// The registered URN, or the rejection as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registration`] unless the outcome is `Created`.
    pub fn into_created(self) -> Result<String> {
        match self {
            Self::Created { urn } => Ok(urn),
            Self::Updated => Err(Error::Registration {
                status: 204,
                detail: "expected a created URN".into(),
            }),
            Self::Rejected { status, detail } => Err(Error::Registration { status, detail }),
        }
    }

    /// `true` for `Updated`, the rejection as an error otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registration`] unless the outcome is `Updated`.
    pub fn into_updated(self) -> Result<bool> {
        match self {
            Self::Updated => Ok(true),
            Self::Created { urn } => Err(Error::Registration {
                status: 200,
                detail: format!("expected no content, got URN {urn}"),
            }),
            Self::Rejected { status, detail } => Err(Error::Registration { status, detail }),
        }
    }
}

fn rejection_detail(status: u16, body: Option<&str>) -> String {
    if !STRUCTURED_ERROR_STATUSES.contains(&status) {
        return "unhandled error".into();
    }
    match body {
        None => "no response body received".into(),
        Some(body) => match serde_json::from_str::<ServiceError>(body) {
            Ok(err) => format!("Errorcode: {}: {}", err.code, err.developer_message),
            Err(_) => format!("unparseable error body: {body}"),
        },
    }
}
