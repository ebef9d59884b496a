// ticketflow/src/core/step.rs

use super::ContextData;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::control::StepControl;

/// Predicate evaluated right before a step; `true` skips the step.
pub type SkipCondition<TData> = Arc<dyn Fn(&TData) -> bool + Send + Sync + 'static>;

/// A boxed async step handler.
///
/// Handlers receive their own handle on the run's context and must not hold a
/// lock guard across an `.await`.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>> + Send + Sync,
>;

/// Where in a step a handler is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  pub const ALL: [Phase; 3] = [Phase::Before, Phase::On, Phase::After];

  pub fn as_str(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

pub struct StepDef<TData: Send + Sync + 'static> {
  pub name: String,
  /// An optional step without handlers is skipped instead of failing the run.
  pub optional: bool,
  pub skip_if: Option<SkipCondition<TData>>,
}

impl<TData: Send + Sync + 'static> StepDef<TData> {
  pub fn required(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      optional: false,
      skip_if: None,
    }
  }

  pub fn optional(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      optional: true,
      skip_if: None,
    }
  }
}

impl<TData: Send + Sync + 'static> fmt::Debug for StepDef<TData> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("has_skip_condition", &self.skip_if.is_some())
      .finish()
  }
}
