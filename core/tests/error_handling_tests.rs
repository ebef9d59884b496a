// tests/error_handling_tests.rs
mod common;

use common::*;
use serial_test::serial;
use ticketflow::{ContextData, FlowError, Pipeline, RunOutcome, StepControl, StepDef};

#[tokio::test]
#[serial]
async fn test_pipeline_run_catches_handler_missing() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::with_steps("bare", &[("missing", false)]).unwrap();
  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("missing"));
    }
    other => panic!("Expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_pipeline_with_flow_error_type() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, FlowError>::with_steps("flow_typed", &[("task", false)]).unwrap();
  pipeline
    .on("task", |ctx: ContextData<TestContext>| async move {
      ctx.write().counter = 1;
      Ok::<_, FlowError>(StepControl::Continue)
    })
    .unwrap();

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), RunOutcome::Completed);
  assert_eq!(ctx.read().counter, 1);

  let mut failing = Pipeline::<TestContext, FlowError>::with_steps("flow_failing", &[("fail_task", false)]).unwrap();
  failing
    .on("fail_task", |_ctx: ContextData<TestContext>| async move {
      Err::<StepControl, _>(anyhow::anyhow!("Intentional failure"))
    })
    .unwrap();
  match failing.run(ContextData::new(TestContext::default())).await {
    Err(FlowError::Handler { source }) => assert_eq!(source.to_string(), "Intentional failure"),
    other => panic!("Expected FlowError::Handler, got {:?}", other),
  }
}

#[test]
fn test_duplicate_step_is_rejected() {
  let result = Pipeline::<TestContext, TestError>::with_steps("dupes", &[("a", false), ("a", true)]);
  match result {
    Err(FlowError::DuplicateStep { pipeline, step_name }) => {
      assert_eq!(pipeline, "dupes");
      assert_eq!(step_name, "a");
    }
    Err(other) => panic!("Expected DuplicateStep, got {:?}", other),
    Ok(_) => panic!("Expected DuplicateStep, got a pipeline"),
  }
}

#[test]
fn test_unknown_step_is_rejected_everywhere() {
  let mut pipeline = Pipeline::<TestContext, TestError>::with_steps("known", &[("a", false)]).unwrap();

  assert!(matches!(
    pipeline.on("nope", create_simple_handler("nope", "")),
    Err(FlowError::StepNotFound { .. })
  ));
  assert!(matches!(
    pipeline.skip_step_if("nope", |_| true),
    Err(FlowError::StepNotFound { .. })
  ));
  assert!(matches!(
    pipeline.insert_step_after("nope", StepDef::required("b")),
    Err(FlowError::StepNotFound { .. })
  ));
  assert!(matches!(
    pipeline.insert_step_after("a", StepDef::required("a")),
    Err(FlowError::DuplicateStep { .. })
  ));
  assert_eq!(pipeline.step_names(), vec!["a"]);
}
