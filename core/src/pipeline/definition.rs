// ticketflow/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` type and the methods that shape its step list.

use crate::core::step::{Handler, Phase, SkipCondition, StepDef};
use crate::error::{FlowError, FlowResult};
use std::collections::HashMap;
use std::sync::Arc;

/// An ordered list of named steps over the context type `TData`.
///
/// `Err` is what handlers fail with. It has to absorb `FlowError` so the engine
/// can report its own failures (such as a required step without handlers)
/// through the same channel.
pub struct Pipeline<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) handlers: HashMap<(String, Phase), Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: Send + Sync + 'static,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      steps: Vec::new(),
      handlers: HashMap::new(),
    }
  }

  /// Builds a pipeline from `(step_name, optional)` pairs.
  pub fn with_steps(name: impl Into<String>, steps: &[(&str, bool)]) -> FlowResult<Self> {
    let mut pipeline = Self::new(name);
    for (step_name, optional) in steps {
      let def = if *optional {
        StepDef::optional(*step_name)
      } else {
        StepDef::required(*step_name)
      };
      pipeline.push_step(def)?;
    }
    Ok(pipeline)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  /// Appends a step at the end of the pipeline.
  pub fn push_step(&mut self, def: StepDef<TData>) -> FlowResult<&mut Self> {
    self.ensure_step_absent(&def.name)?;
    self.steps.push(def);
    Ok(self)
  }

  /// Inserts a step directly after `existing`.
  pub fn insert_step_after(&mut self, existing: &str, def: StepDef<TData>) -> FlowResult<&mut Self> {
    let idx = self.step_index(existing)?;
    self.ensure_step_absent(&def.name)?;
    self.steps.insert(idx + 1, def);
    Ok(self)
  }

  /// Attaches a skip condition to an existing step, replacing any previous one.
  pub fn skip_step_if(
    &mut self,
    step_name: &str,
    condition: impl Fn(&TData) -> bool + Send + Sync + 'static,
  ) -> FlowResult<&mut Self> {
    let idx = self.step_index(step_name)?;
    let condition: SkipCondition<TData> = Arc::new(condition);
    self.steps[idx].skip_if = Some(condition);
    Ok(self)
  }

  pub(crate) fn step_index(&self, step_name: &str) -> FlowResult<usize> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        pipeline: self.name.clone(),
        step_name: step_name.to_string(),
      })
  }

  fn ensure_step_absent(&self, step_name: &str) -> FlowResult<()> {
    if self.steps.iter().any(|s| s.name == step_name) {
      return Err(FlowError::DuplicateStep {
        pipeline: self.name.clone(),
        step_name: step_name.to_string(),
      });
    }
    Ok(())
  }

  pub(crate) fn handler_count(&self, step_name: &str) -> usize {
    Phase::ALL
      .iter()
      .filter_map(|phase| self.handlers.get(&(step_name.to_string(), *phase)))
      .map(Vec::len)
      .sum()
  }
}
