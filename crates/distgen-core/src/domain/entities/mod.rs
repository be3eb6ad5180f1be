pub mod bindings;
pub mod rendered;

pub use bindings::{Bindings, NETWORK_KEY};
pub use rendered::RenderedOutput;
