pub mod loss;
pub mod model;
pub mod path_simulator;
pub mod trainer;

pub use loss::LossEvaluator;
pub use model::BsdeModel;
pub use path_simulator::PathSimulator;
pub use trainer::{adam, TrainBackend, TrainingHistory, TrainingLoop, TrainingRecord};
