use crate::Result;

/// The two operations of the resolver service this crate relies on.
pub trait Registrar {
    /// Registers `urn` with its target URLs and returns the identifier the
    /// service registered. Callers must compare it with `urn`.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::Registration`] for any non-2xx status
    /// - [`crate::Error::EmptyResponse`] for a 2xx status without a body
    fn register(&self, urn: &str, target_urls: &[String]) -> Result<String>;

    /// Replaces all target URLs of an existing `urn`.
    ///
    /// Returns `true` when the service acknowledged with `204 No Content`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Registration`] for every other status.
    fn replace_targets(&self, urn: &str, target_urls: &[String]) -> Result<bool>;
}
