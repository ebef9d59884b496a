// tests/registry_tests.rs
mod common;

use common::*;
use ticketflow::{ContextData, FlowError, Pipeline, Registry, RunOutcome, StepControl};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct AlphaContext {
  val: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct BetaContext {
  num: i32,
}

fn alpha_pipeline(label: &'static str) -> Pipeline<AlphaContext, TestError> {
  let mut p = Pipeline::<AlphaContext, TestError>::with_steps(format!("alpha_{label}"), &[("alpha_task", false)]).unwrap();
  p.on("alpha_task", move |ctx: ContextData<AlphaContext>| async move {
    ctx.write().val = label.to_string();
    Ok::<_, TestError>(StepControl::Continue)
  })
  .unwrap();
  p
}

#[tokio::test]
async fn test_registry_runs_pipeline_for_context_type() {
  setup_tracing();
  let registry = Registry::<TestError>::new();

  registry.register(alpha_pipeline("alpha_processed"));

  let mut p_beta = Pipeline::<BetaContext, TestError>::with_steps("beta", &[("beta_task", false)]).unwrap();
  p_beta
    .on("beta_task", |ctx: ContextData<BetaContext>| async move {
      ctx.write().num = 100;
      Ok::<_, TestError>(StepControl::Continue)
    })
    .unwrap();
  registry.register(p_beta);

  assert_eq!(registry.len(), 2);
  assert!(registry.is_registered::<AlphaContext>());
  assert!(registry.is_registered::<BetaContext>());

  let ctx_alpha = ContextData::new(AlphaContext::default());
  assert_eq!(registry.run(ctx_alpha.clone()).await.unwrap(), RunOutcome::Completed);
  assert_eq!(ctx_alpha.read().val, "alpha_processed");

  let ctx_beta = ContextData::new(BetaContext::default());
  assert_eq!(registry.run(ctx_beta.clone()).await.unwrap(), RunOutcome::Completed);
  assert_eq!(ctx_beta.read().num, 100);
}

#[tokio::test]
async fn test_registry_reports_missing_pipeline() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  assert!(registry.is_empty());

  #[derive(Clone, Debug, Default)]
  struct UnregisteredContext;

  let result = registry.run(ContextData::new(UnregisteredContext)).await;
  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("NoPipelineRegistered"));
      assert!(s.contains("UnregisteredContext"));
    }
    other => panic!("Expected a NoPipelineRegistered error, got {:?}", other),
  }
}

#[tokio::test]
async fn test_registry_replaces_earlier_registration() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  registry.register(alpha_pipeline("first"));
  registry.register(alpha_pipeline("second"));

  assert_eq!(registry.len(), 1);
  let ctx = ContextData::new(AlphaContext::default());
  registry.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().val, "second");
}

#[tokio::test]
async fn test_registry_propagates_handler_error() {
  setup_tracing();
  let registry = Registry::<TestError>::new();
  let mut p = Pipeline::<AlphaContext, TestError>::with_steps("alpha_failing", &[("alpha_task", false)]).unwrap();
  p.on("alpha_task", |_ctx: ContextData<AlphaContext>| async move {
    Err::<StepControl, _>(TestError::Handler("alpha broke".to_string()))
  })
  .unwrap();
  registry.register(p);

  let result = registry.run(ContextData::new(AlphaContext::default())).await;
  assert_eq!(result.unwrap_err(), TestError::Handler("alpha broke".to_string()));
}

#[tokio::test]
async fn test_default_registry_uses_flow_error() {
  setup_tracing();
  let registry: Registry = Registry::default();
  let mut p = Pipeline::<BetaContext, FlowError>::with_steps("beta_plain", &[("beta_task", false)]).unwrap();
  p.on("beta_task", |ctx: ContextData<BetaContext>| async move {
    ctx.update(|c| c.num += 1);
    Ok::<_, FlowError>(StepControl::Stop)
  })
  .unwrap();
  registry.register(p);

  let ctx = ContextData::new(BetaContext::default());
  assert_eq!(registry.run(ctx.clone()).await.unwrap(), RunOutcome::Stopped);
  assert_eq!(ctx.read().num, 1);
}
