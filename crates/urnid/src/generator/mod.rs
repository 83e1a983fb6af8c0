mod method;
#[cfg(test)]
mod tests;
mod urn;

pub use method::*;
pub use urn::*;
