mod loader;
mod store;
mod types;

#[cfg(test)]
pub(crate) use loader::testing;

pub use loader::{HttpModelSource, LoadOutcome, Loader, ModelSource};
pub use store::{ActiveModel, ModelStore};
pub use types::{AppEnvelope, ModelDescriptor, ModelOutput, STATUS_OK};
