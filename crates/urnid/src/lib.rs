#![doc = include_str!("../README.md")]

mod assign;
mod checksum;
mod client;
mod document;
mod error;
mod generator;
#[cfg(test)]
mod mock;
mod store;
mod time;
mod walk;

pub use crate::assign::*;
pub use crate::checksum::*;
pub use crate::client::*;
pub use crate::document::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::store::*;
pub use crate::time::*;
pub use crate::walk::*;
