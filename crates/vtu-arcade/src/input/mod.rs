pub mod bindings;
pub mod queue;
pub mod snapshot;
