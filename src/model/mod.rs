pub mod layers;
pub mod network;
pub mod optimizer;
pub mod store;

pub use network::RainNetwork;
pub use optimizer::Adam;
pub use store::{FileModelStore, MemoryModelStore, ModelArtifact, ModelStore};
