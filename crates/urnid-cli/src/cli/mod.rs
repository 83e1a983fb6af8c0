//! Configuration, logging and the document pass of the `urnid` binary.

pub mod config;
pub mod run;
pub mod telemetry;
