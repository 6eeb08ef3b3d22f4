pub mod bootstrap;
pub mod history;
pub mod trainer;

pub use bootstrap::{load_or_train, Bootstrap, ModelOrigin};
pub use history::{EpochMetrics, TrainingHistory};
pub use trainer::{train_model, train_network, TrainedModel, TrainingOptions};
