//! Cache resolution: from candidate releases to lazily unlocked stream links.

mod deferred;
mod disambiguate;
mod engine;
mod selection;
mod types;

pub use deferred::DeferredLinks;
pub use engine::DebridResolver;
pub use selection::{format_size, Selection, SelectionOption, Selector};
pub use types::*;
