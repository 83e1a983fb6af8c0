use crate::{IdentityHandle, Result, StructureType};

/// Shared table of identities, one row per allocated URN.
///
/// Implementations must make [`IdentityStore::allocate`] atomic across
/// processes: at most one caller may observe "no matching row" for a
/// singleton-scoped pair before inserting it.
pub trait IdentityStore {
    /// Returns the identity for `(work_id, structure)`, inserting a row when
    /// needed.
    ///
    /// A missing `work_id` is stored as the empty string. Singleton-scoped
    /// types reuse an existing row; all other types always get a new row.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InconsistentStore`] if a singleton-scoped pair
    ///   already occurs more than once
    /// - [`crate::Error::Storage`] if a statement fails
    fn allocate(&self, work_id: Option<&str>, structure: &StructureType) -> Result<IdentityHandle>;

    /// Stores `urn` for a freshly allocated identity.
    ///
    /// Returns `false` without touching the row when the handle is a reuse,
    /// and `false` on any storage failure.
    fn write_back(&self, handle: &IdentityHandle, urn: &str) -> bool;

    /// Deletes the row with `id`. Returns `false` on failure.
    fn remove(&self, id: i64) -> bool;

    /// Whether any row already carries `urn`.
    fn find_by_urn_value(&self, urn: &str) -> Result<bool>;
}
