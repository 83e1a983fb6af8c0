mod error;
mod nbn;

pub use error::*;
pub use nbn::*;
