use std::fs;

use anyhow::Context;
use urnid::{
    DEFAULT_BUSY_TIMEOUT, Registrar, RunReport, SqliteIdentityStore, StructNode, TreeWalker,
    UrnAssigner, UrnGenerator,
};

use crate::cli::config::RunConfig;

/// Reads the document, assigns identifiers with `registrar` and writes the
/// document back.
///
/// The document is written even when some nodes failed: identifiers that were
/// registered must not be lost.
pub fn process<R: Registrar>(config: &RunConfig, registrar: R) -> anyhow::Result<RunReport> {
    let raw = fs::read_to_string(&config.input)
        .with_context(|| format!("reading {}", config.input.display()))?;
    let mut root: StructNode = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", config.input.display()))?;

    let store = SqliteIdentityStore::open(&config.database, DEFAULT_BUSY_TIMEOUT)
        .with_context(|| format!("opening {}", config.database.display()))?;
    let generator = UrnGenerator::new(config.generator.clone(), store);
    let assigner = UrnAssigner::new(config.assign.clone(), generator, registrar);

    let report = TreeWalker::new(&assigner, config.walk.clone()).run(&mut root);

    let rendered = serde_json::to_string_pretty(&root)?;
    fs::write(&config.output, rendered)
        .with_context(|| format!("writing {}", config.output.display()))?;

    Ok(report)
}
