pub mod context_data;
pub mod control;
pub mod step;

pub use context_data::ContextData;
pub use control::{RunOutcome, StepControl};
pub use step::{Handler, Phase, SkipCondition, StepDef};
