//! One pass over a document tree.

use core::fmt;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    BOUND_BOOK, DocStruct, IdentityStore, NodeOutcome, Registrar, SleepProvider, TimeSource,
    UrnAssigner,
};

/// Metadata slot carrying the catalog id of a work.
pub const WORK_ID_SLOT: &str = "CatalogIDDigital";

/// Which nodes of a tree receive identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkConfig {
    /// Structure type names processed anywhere in the tree. A non-empty list
    /// also makes the walker descend below the root.
    pub allowed_types: Vec<String>,
    /// Process topmost elements.
    pub include_work: bool,
    /// Process anchor elements.
    pub include_anchor: bool,
    pub work_id_slot: String,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            allowed_types: Vec::new(),
            include_work: true,
            include_anchor: false,
            work_id_slot: WORK_ID_SLOT.to_owned(),
        }
    }
}

impl WalkConfig {
    fn selects<D: DocStruct>(&self, node: &D) -> bool {
        let structure = node.structure_type();
        if structure.name == BOUND_BOOK {
            return false;
        }
        (structure.anchor && self.include_anchor)
            || (structure.topmost && self.include_work)
            || self.allowed_types.iter().any(|t| *t == structure.name)
    }

    fn descends<D: DocStruct>(&self, node: &D) -> bool {
        !self.allowed_types.is_empty() || node.structure_type().anchor
    }
}

/// The result of one processed node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeReport {
    pub structure_type: String,
    pub work_id: Option<String>,
    pub result: Result<NodeOutcome, String>,
}

/// Everything that happened during one [`TreeWalker::run`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub nodes: Vec<NodeReport>,
}

impl RunReport {
    /// `true` when no processed node failed.
    pub fn is_success(&self) -> bool {
        self.nodes.iter().all(|n| n.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &NodeReport> {
        self.nodes.iter().filter(|n| n.result.is_err())
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &NodeOutcome> {
        self.nodes.iter().filter_map(|n| n.result.as_ref().ok())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        write!(
            f,
            "{} nodes processed, {} succeeded, {failed} failed",
            self.nodes.len(),
            self.nodes.len() - failed
        )
    }
}

/// Applies an [`UrnAssigner`] to the selected nodes of a tree, depth first.
///
/// A failing node is recorded and fails the run, but its siblings are still
/// processed.
pub struct TreeWalker<'a, S, R, T, P>
where
    S: IdentityStore,
    R: Registrar,
    T: TimeSource,
    P: SleepProvider,
{
    assigner: &'a UrnAssigner<S, R, T, P>,
    config: WalkConfig,
}

impl<'a, S, R, T, P> TreeWalker<'a, S, R, T, P>
where
    S: IdentityStore,
    R: Registrar,
    T: TimeSource,
    P: SleepProvider,
{
    pub fn new(assigner: &'a UrnAssigner<S, R, T, P>, config: WalkConfig) -> Self {
        Self { assigner, config }
    }

    #[cfg_attr(feature = "tracing", instrument(level = "info", skip_all, fields(process_id = self.assigner.generator().config().process_id)))]
    pub fn run<D: DocStruct>(&self, root: &mut D) -> RunReport {
        let mut report = RunReport::default();
        let mut work_id = None;
        self.visit(root, &mut work_id, &mut report);

        #[cfg(feature = "tracing")]
        {
            if report.is_success() {
                tracing::info!(%report, "identifier pass finished");
            } else {
                tracing::error!(%report, "identifier pass failed");
            }
        }

        report
    }

    /// `work_id` is the latest catalog id seen anywhere in the pass so far,
    /// siblings visited earlier included.
    fn visit<D: DocStruct>(
        &self,
        node: &mut D,
        work_id: &mut Option<String>,
        report: &mut RunReport,
    ) {
        if let Some(id) = node.metadata_value(&self.config.work_id_slot) {
            *work_id = Some(id.to_owned());
        }

        if self.config.selects(node) {
            let structure_type = node.structure_type().name.clone();
            let result = self
                .assigner
                .assign(node, work_id.as_deref())
                .map_err(|err| err.to_string());

            #[cfg(feature = "tracing")]
            {
                let process_id = self.assigner.generator().config().process_id;
                match &result {
                    Ok(outcome) => tracing::info!(
                        structure = %structure_type,
                        work_id = ?work_id,
                        process_id,
                        "{outcome}"
                    ),
                    Err(err) => tracing::error!(
                        structure = %structure_type,
                        work_id = ?work_id,
                        process_id,
                        "{err}"
                    ),
                }
            }

            report.nodes.push(NodeReport {
                structure_type,
                work_id: work_id.clone(),
                result,
            });
        }

        if self.config.descends(node) {
            for child in node.children_mut() {
                self.visit(child, work_id, report);
            }
        }
    }
}
