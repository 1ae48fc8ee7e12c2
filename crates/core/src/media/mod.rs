//! Media records and the transfer-complete payload they are built from.

mod adapter;
mod event;
mod types;

pub use adapter::DEFAULT_SOURCE;
pub use event::*;
pub use types::*;
