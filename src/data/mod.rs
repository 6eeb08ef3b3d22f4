pub mod dataset;
pub mod preprocessing;

pub use dataset::{
    load_training_set, read_training_set, DatasetOptions, LabelPolicy, LabeledExample, LoadReport,
    TrainingSet,
};
pub use preprocessing::NormalizationStats;
