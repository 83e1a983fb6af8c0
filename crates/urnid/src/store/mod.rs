mod handle;
mod interface;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use handle::*;
pub use interface::*;
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
#[cfg(feature = "sqlite")]
pub use sqlite::*;
