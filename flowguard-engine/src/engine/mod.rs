mod error;
mod orchestrator;

pub use self::{
    error::{CycleError, CycleStage},
    orchestrator::{CycleOrchestrator, CycleOutcome, CycleSettings},
};

pub mod prelude {
    pub use super::{CycleError, CycleOrchestrator, CycleOutcome, CycleSettings, CycleStage};
}
