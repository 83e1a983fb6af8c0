use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, GenerationMethod, GeneratorConfig, IdentityHandle, IdentityStore, Result,
    SleepProvider, StructureType, SystemClock, ThreadSleep, TimeSource, append_check_digit,
    format_timestamp,
};

/// Wait between two timestamp syntheses when the first one collided.
pub const DUPLICATE_BACKOFF: Duration = Duration::from_secs(2);

/// Resyntheses after the first collision before giving up.
pub const DUPLICATE_RETRIES: u32 = 3;

/// Produces identifier strings for identities allocated in an
/// [`IdentityStore`].
///
/// The generator owns the store so that allocation, duplicate detection,
/// write-back and rollback all go through the same table. The clock and sleep
/// provider are only consulted by [`GenerationMethod::Timestamp`].
///
/// ## See Also
/// - [`crate::UrnAssigner`], which drives a generator per document node
pub struct UrnGenerator<S, T = SystemClock, P = ThreadSleep>
where
    S: IdentityStore,
    T: TimeSource,
    P: SleepProvider,
{
    config: GeneratorConfig,
    store: S,
    clock: T,
    sleep: P,
}

impl<S> UrnGenerator<S>
where
    S: IdentityStore,
{
    /// Creates a generator using the local wall clock and blocking sleeps.
    pub fn new(config: GeneratorConfig, store: S) -> Self {
        Self::from_components(config, store, SystemClock, ThreadSleep)
    }
}

impl<S, T, P> UrnGenerator<S, T, P>
where
    S: IdentityStore,
    T: TimeSource,
    P: SleepProvider,
{
    pub fn from_components(config: GeneratorConfig, store: S, clock: T, sleep: P) -> Self {
        Self {
            config,
            store,
            clock,
            sleep,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Allocates or reuses the identity of `(work_id, structure)`.
    ///
    /// # Errors
    ///
    /// See [`IdentityStore::allocate`].
    pub fn allocate(
        &self,
        work_id: Option<&str>,
        structure: &StructureType,
    ) -> Result<IdentityHandle> {
        self.store.allocate(work_id, structure)
    }

    /// Builds `prefix "-" [infix "-"] body [check digit]`.
    ///
    /// The body is the handle's id, or the current timestamp for
    /// [`GenerationMethod::Timestamp`]. Separators already present at the end
    /// of `prefix` or around `infix` are not doubled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Checksum`] if checksums are enabled and the string
    /// contains a character outside the check digit table.
    pub fn synthesize(
        &self,
        prefix: &str,
        infix: Option<&str>,
        handle: &IdentityHandle,
    ) -> Result<String> {
        let body = match self.config.method {
            GenerationMethod::Increment => handle.id.to_string(),
            GenerationMethod::Timestamp => format_timestamp(&self.clock),
        };

        let prefix = prefix.trim_end_matches('-');
        let infix = infix.map(|i| i.trim_matches('-')).filter(|i| !i.is_empty());

        let mut urn = String::with_capacity(prefix.len() + body.len() + 16);
        urn.push_str(prefix);
        urn.push('-');
        if let Some(infix) = infix {
            urn.push_str(infix);
            urn.push('-');
        }
        urn.push_str(&body);

        if self.config.checksum {
            Ok(append_check_digit(&urn)?)
        } else {
            Ok(urn)
        }
    }

    /// Synthesizes an identifier that does not yet exist in the store.
    ///
    /// Under [`GenerationMethod::Timestamp`] a collision with a stored URN
    /// waits [`DUPLICATE_BACKOFF`] and resynthesizes, at most
    /// [`DUPLICATE_RETRIES`] times. This bounds latency; it does not
    /// guarantee uniqueness under sustained contention.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateExhausted`] when every attempt collided
    /// - errors of [`Self::synthesize`] and [`IdentityStore::find_by_urn_value`]
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, handle), fields(id = handle.id, process_id = self.config.process_id)))]
    pub fn next_urn(
        &self,
        prefix: &str,
        infix: Option<&str>,
        handle: &IdentityHandle,
    ) -> Result<String> {
        let mut urn = self.synthesize(prefix, infix, handle)?;
        if self.config.method != GenerationMethod::Timestamp {
            return Ok(urn);
        }

        let mut retries = 0;
        while self.store.find_by_urn_value(&urn)? {
            if retries == DUPLICATE_RETRIES {
                return Err(Error::DuplicateExhausted {
                    urn,
                    attempts: retries + 1,
                });
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                urn = %urn,
                process_id = self.config.process_id,
                "URN generation too fast, waiting before the next attempt"
            );

            self.sleep.sleep_for(DUPLICATE_BACKOFF);
            urn = self.synthesize(prefix, infix, handle)?;
            retries += 1;
        }

        Ok(urn)
    }

    /// See [`IdentityStore::write_back`].
    pub fn write_back(&self, handle: &IdentityHandle, urn: &str) -> bool {
        self.store.write_back(handle, urn)
    }

    /// Deletes a freshly allocated identity whose registration failed.
    ///
    /// See [`IdentityStore::remove`].
    pub fn remove(&self, id: i64) -> bool {
        self.store.remove(id)
    }
}
