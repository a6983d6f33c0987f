pub mod engine;

pub use engine::{CycleError, CycleOrchestrator, CycleOutcome, CycleSettings, CycleStage};
