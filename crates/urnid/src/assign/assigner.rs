#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    AssignConfig, DocStruct, Error, IdentityHandle, IdentityStore, NodeOutcome, Registrar,
    Result, SleepProvider, SystemClock, ThreadSleep, TimeSource, UrnGenerator,
};

/// Decides, per document node, whether to copy, update, reuse or mint an
/// identifier, and keeps the store consistent with the resolver.
///
/// A freshly allocated identity whose registration fails is removed from the
/// store before the error is returned. An identity that already existed is
/// never removed: its failure is reported as [`NodeOutcome::Recovered`].
///
/// Running the assigner twice over the same node is idempotent. After a
/// successful registration the node carries its identifier, so the second
/// run only replaces the target URLs.
pub struct UrnAssigner<S, R, T = SystemClock, P = ThreadSleep>
where
    S: IdentityStore,
    R: Registrar,
    T: TimeSource,
    P: SleepProvider,
{
    config: AssignConfig,
    generator: UrnGenerator<S, T, P>,
    registrar: R,
}

impl<S, R, T, P> UrnAssigner<S, R, T, P>
where
    S: IdentityStore,
    R: Registrar,
    T: TimeSource,
    P: SleepProvider,
{
    pub fn new(config: AssignConfig, generator: UrnGenerator<S, T, P>, registrar: R) -> Self {
        Self {
            config,
            generator,
            registrar,
        }
    }

    pub fn config(&self) -> &AssignConfig {
        &self.config
    }

    pub fn generator(&self) -> &UrnGenerator<S, T, P> {
        &self.generator
    }

    pub fn registrar(&self) -> &R {
        &self.registrar
    }

    #[cfg(feature = "tracing")]
    fn process_id(&self) -> i64 {
        self.generator.config().process_id
    }

    /// Brings `node` into a state where its identifier is registered and
    /// stored.
    ///
    /// `work_id` scopes singleton structure types; see
    /// [`IdentityStore::allocate`].
    ///
    /// # Errors
    ///
    /// - [`Error::NotAllowed`] if the node has no slot to write an identifier
    ///   into, or carries one only in the secondary slot while the primary
    ///   slot is not declared; no store or network call is made
    /// - any allocation, synthesis or registration error. A freshly
    ///   allocated row has been removed by the time it is returned.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all, fields(structure = %node.structure_type().name, process_id = self.process_id())))]
    pub fn assign<D: DocStruct>(&self, node: &mut D, work_id: Option<&str>) -> Result<NodeOutcome> {
        let primary = slot_value(node, &self.config.primary_slot);
        let secondary = slot_value(node, &self.config.secondary_slot);

        match (primary, secondary) {
            (None, Some(secondary)) => {
                if !node.allows_metadata(&self.config.primary_slot) {
                    return Err(Error::NotAllowed {
                        structure_type: node.structure_type().name.clone(),
                    });
                }
                node.add_metadata(&self.config.primary_slot, secondary.clone());
                Ok(NodeOutcome::Copied { urn: secondary })
            }
            (Some(primary), secondary) => {
                if secondary.as_ref().is_some_and(|s| *s != primary) {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        primary = %primary,
                        secondary = ?secondary,
                        process_id = self.process_id(),
                        "identifier slots disagree, using the primary value"
                    );
                }
                self.refresh(primary)
            }
            (None, None) => self.mint(node, work_id),
        }
    }

    fn refresh(&self, urn: String) -> Result<NodeOutcome> {
        if !self.config.owns(&urn) {
            #[cfg(feature = "tracing")]
            tracing::info!(
                urn = %urn,
                process_id = self.process_id(),
                "identifier outside of the configured namespace, not updating"
            );
            return Ok(NodeOutcome::Foreign { urn });
        }

        self.registrar
            .replace_targets(&urn, &self.config.target_urls)?;
        #[cfg(feature = "tracing")]
        tracing::info!(urn = %urn, process_id = self.process_id(), "replaced target URLs");
        Ok(NodeOutcome::Updated { urn })
    }

    fn mint<D: DocStruct>(&self, node: &mut D, work_id: Option<&str>) -> Result<NodeOutcome> {
        let structure = node.structure_type().clone();
        let write_primary = node.allows_metadata(&self.config.primary_slot);
        let write_secondary =
            self.config.write_secondary && node.allows_metadata(&self.config.secondary_slot);
        if !write_primary && !write_secondary {
            return Err(Error::NotAllowed {
                structure_type: structure.name,
            });
        }

        let handle = self.generator.allocate(work_id, &structure)?;
        let writer = SlotWriter {
            config: &self.config,
            primary: write_primary,
            secondary: write_secondary,
        };

        if handle.is_existing {
            if let Some(urn) = handle.urn.clone().filter(|u| !u.is_empty()) {
                writer.write(node, &urn);
                #[cfg(feature = "tracing")]
                tracing::info!(
                    urn = %urn,
                    id = handle.id,
                    process_id = self.process_id(),
                    "reusing stored identifier"
                );
                return Ok(NodeOutcome::Reused { urn });
            }
        }

        match self.register(&handle) {
            Ok(urn) => {
                writer.write(node, &urn);
                if !handle.is_existing && !self.generator.write_back(&handle, &urn) {
                    // the resolver already knows this identifier; nothing undoes that
                    #[cfg(feature = "tracing")]
                    tracing::error!(
                        urn = %urn,
                        id = handle.id,
                        process_id = self.process_id(),
                        "registered identifier could not be stored"
                    );
                }
                #[cfg(feature = "tracing")]
                tracing::info!(urn = %urn, id = handle.id, process_id = self.process_id(), "registered identifier");
                Ok(NodeOutcome::Registered { urn })
            }
            Err(err) if handle.is_existing => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    id = handle.id,
                    error = %err,
                    process_id = self.process_id(),
                    "registration for existing identity failed"
                );
                Ok(NodeOutcome::Recovered {
                    id: handle.id,
                    reason: err.to_string(),
                })
            }
            Err(err) => {
                if !self.generator.remove(handle.id) {
                    #[cfg(feature = "tracing")]
                    tracing::error!(
                        id = handle.id,
                        process_id = self.process_id(),
                        "could not remove identity after failed registration"
                    );
                }
                Err(err)
            }
        }
    }

    fn register(&self, handle: &IdentityHandle) -> Result<String> {
        let urn = self.generator.next_urn(
            &self.config.namespace,
            self.config.infix.as_deref(),
            handle,
        )?;
        let returned = self.registrar.register(&urn, &self.config.target_urls)?;
        if returned != urn {
            return Err(Error::UrnMismatch {
                requested: urn,
                returned,
            });
        }
        Ok(urn)
    }
}

struct SlotWriter<'a> {
    config: &'a AssignConfig,
    primary: bool,
    secondary: bool,
}

impl SlotWriter<'_> {
    fn write<D: DocStruct>(&self, node: &mut D, urn: &str) {
        if self.primary {
            node.add_metadata(&self.config.primary_slot, urn.to_owned());
        }
        if self.secondary {
            node.add_metadata(&self.config.secondary_slot, urn.to_owned());
        }
    }
}

fn slot_value<D: DocStruct>(node: &D, slot: &str) -> Option<String> {
    node.metadata_value(slot)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
