mod assigner;
mod config;
mod outcome;

pub use assigner::*;
pub use config::*;
pub use outcome::*;
