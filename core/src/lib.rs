// ticketflow/src/lib.rs

//! ticketflow: asynchronous step pipelines.
//!
//! A pipeline is an ordered list of named steps. Each step carries `before`,
//! `on` and `after` handlers that share one lockable context for the whole
//! run. Handlers decide whether the run continues or stops, steps may be
//! optional or guarded by a skip condition, and a registry keyed by context
//! type dispatches a context to its pipeline.
//!
//! ```ignore
//! let mut p = Pipeline::<SignupCtx, AppError>::with_steps("signup", &[("validate", false), ("create", false)])?;
//! p.on("validate", |ctx| async move { /* ... */ Ok::<_, AppError>(StepControl::Continue) })?;
//! registry.register(p);
//! registry.run(ContextData::new(signup_ctx)).await?;
//! ```

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{RunOutcome, StepControl};
pub use crate::core::step::{Handler, Phase, SkipCondition, StepDef};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::Pipeline;
pub use crate::registry::Registry;
