mod interface;
mod message;
mod outcome;
#[cfg(feature = "client")]
mod rest;

pub use interface::*;
pub use message::*;
pub use outcome::*;
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
#[cfg(feature = "client")]
pub use rest::*;
