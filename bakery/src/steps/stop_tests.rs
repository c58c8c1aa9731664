//! Scenario tests for the stop-instance step.

#[cfg(test)]
mod tests {
    use crate::cancellation::CancellationToken;
    use crate::compute::{ApiError, InstanceHandle, LifecycleState, MockComputeApi};
    use crate::context::StepContext;
    use crate::errors::ProvisionError;
    use crate::poller::{PollerConfig, RetryConfig};
    use crate::report::CollectingReporter;
    use crate::steps::{Step, StepVerdict, StopInstanceStep};
    use crate::testing::ScriptedComputeApi;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("bakery=debug")
            .with_test_writer()
            .try_init();
    }

    fn fast_config() -> PollerConfig {
        PollerConfig::new()
            .with_poll_interval_ms(1)
            .with_max_wait_ms(5000)
            .with_initiate_retry(RetryConfig::new().with_max_attempts(2).with_base_delay_ms(1))
    }

    fn fast_step() -> StopInstanceStep {
        StopInstanceStep::new().with_poller_config(fast_config())
    }

    fn context_with(api: Arc<ScriptedComputeApi>) -> (StepContext, Arc<CollectingReporter>) {
        let reporter = Arc::new(CollectingReporter::new());
        let ctx = StepContext::new()
            .with_client(api)
            .with_resource(InstanceHandle::new("i-1"))
            .with_reporter(reporter.clone());
        (ctx, reporter)
    }

    #[tokio::test]
    async fn test_success_path() {
        init_tracing();
        let api = Arc::new(ScriptedComputeApi::new());
        api.script_status_sequence([
            LifecycleState::Running,
            LifecycleState::Running,
            LifecycleState::Stopping,
            LifecycleState::Stopped,
        ]);
        let (ctx, reporter) = context_with(api.clone());

        let verdict = fast_step().run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Continue);
        assert!(!ctx.has_error());
        assert_eq!(api.stop_call_count(), 1);
        assert!(reporter
            .messages()
            .iter()
            .any(|m| m.contains("Stopping instance i-1")));
        assert!(reporter.reports()[0].is_success());
    }

    #[tokio::test]
    async fn test_already_stopped_is_idempotent() {
        let api = Arc::new(ScriptedComputeApi::new());
        api.set_fallback_status(Ok(LifecycleState::Stopped));
        let (ctx, _reporter) = context_with(api.clone());
        let step = fast_step();

        let first = step.run(&ctx).await;
        let second = step.run(&ctx).await;

        assert_eq!(first, StepVerdict::Continue);
        assert_eq!(second, StepVerdict::Continue);
        assert_eq!(api.stop_call_count(), 0);
        assert!(!ctx.has_error());
    }

    #[tokio::test]
    async fn test_not_found_on_initiate_halts() {
        let api = Arc::new(ScriptedComputeApi::new());
        api.script_status(Ok(LifecycleState::Running));
        api.script_stop(Err(ApiError::NotFound {
            id: "i-1".to_string(),
        }));
        let (ctx, reporter) = context_with(api.clone());

        let verdict = fast_step().run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Halt);
        assert_eq!(
            ctx.error(),
            Some(ProvisionError::NotFound {
                id: "i-1".to_string()
            })
        );
        assert_eq!(api.stop_call_count(), 1);
        assert!(!reporter.errors().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_on_initiate_halts_mock_client() {
        let mut mock = MockComputeApi::new();
        mock.expect_describe_status()
            .times(1)
            .returning(|_| Ok(LifecycleState::Running));
        mock.expect_initiate_stop()
            .times(1)
            .returning(|handle| {
                Err(ApiError::NotFound {
                    id: handle.id().to_string(),
                })
            });

        let reporter = Arc::new(CollectingReporter::new());
        let ctx = StepContext::new()
            .with_client(Arc::new(mock))
            .with_resource(InstanceHandle::new("i-404"))
            .with_reporter(reporter);

        let verdict = fast_step().run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Halt);
        assert_eq!(
            ctx.error(),
            Some(ProvisionError::NotFound {
                id: "i-404".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_cancellation_halts_without_further_queries() {
        let api = Arc::new(ScriptedComputeApi::new());
        api.set_fallback_status(Ok(LifecycleState::Stopping));
        let token = CancellationToken::new();
        // Pre-flight query plus the first poll, then cancellation fires.
        api.cancel_after_status_queries(2, token.clone());

        let (ctx, _reporter) = context_with(api.clone());
        let ctx = ctx.with_cancellation(token);
        let step = StopInstanceStep::new()
            .with_poller_config(fast_config().with_poll_interval_ms(60_000));

        let verdict = step.run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Halt);
        assert!(ctx.error().map_or(false, |e| e.is_cancellation()));
        assert_eq!(api.status_call_count(), 2);
    }

    #[tokio::test]
    async fn test_timeout_halts_after_deadline() {
        let api = Arc::new(ScriptedComputeApi::new());
        api.set_fallback_status(Ok(LifecycleState::Stopping));
        let (ctx, _reporter) = context_with(api.clone());
        let step = StopInstanceStep::new().with_poller_config(
            fast_config()
                .with_poll_interval_ms(10)
                .with_max_wait_ms(60),
        );

        let before = std::time::Instant::now();
        let verdict = step.run(&ctx).await;

        assert!(before.elapsed() >= std::time::Duration::from_millis(60));
        assert_eq!(verdict, StepVerdict::Halt);
        assert!(ctx.error().map_or(false, |e| e.is_timeout()));
    }

    #[tokio::test]
    async fn test_verdict_matches_error_slot_in_both_directions() {
        // Continue leaves the slot empty.
        let api = Arc::new(ScriptedComputeApi::new());
        api.set_fallback_status(Ok(LifecycleState::Stopped));
        let (ctx, _reporter) = context_with(api);
        assert_eq!(fast_step().run(&ctx).await, StepVerdict::Continue);
        assert!(ctx.error().is_none());

        // Halt stores exactly one classified error.
        let api = Arc::new(ScriptedComputeApi::new());
        api.script_status(Ok(LifecycleState::Running));
        api.script_stop(Err(ApiError::failed("access denied")));
        let (ctx, _reporter) = context_with(api);
        assert_eq!(fast_step().run(&ctx).await, StepVerdict::Halt);
        assert!(ctx.error().is_some());
        assert!(ctx.take_error().is_some());
        assert!(ctx.error().is_none());
    }

    #[tokio::test]
    async fn test_spot_priced_capacity_skips_stop() {
        let api = Arc::new(ScriptedComputeApi::new());
        let (ctx, reporter) = context_with(api.clone());
        let step = fast_step().with_spot_price("0.85");

        let verdict = step.run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Continue);
        assert_eq!(api.stop_call_count(), 0);
        assert_eq!(api.status_call_count(), 0);
        assert!(reporter.messages().iter().any(|m| m.contains("Spot-priced")));
    }

    #[tokio::test]
    async fn test_zero_spot_price_stops_normally() {
        let api = Arc::new(ScriptedComputeApi::new());
        api.script_status_sequence([LifecycleState::Running, LifecycleState::Stopped]);
        let (ctx, _reporter) = context_with(api.clone());
        let step = fast_step().with_spot_price("0");

        let verdict = step.run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Continue);
        assert_eq!(api.stop_call_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_stop_short_circuits() {
        let api = Arc::new(ScriptedComputeApi::new());
        let (ctx, reporter) = context_with(api.clone());
        let step = fast_step().with_stop_disabled(true);

        let verdict = step.run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Continue);
        assert_eq!(api.stop_call_count(), 0);
        assert_eq!(api.status_call_count(), 0);
        assert!(reporter
            .messages()
            .iter()
            .any(|m| m.contains("stop disabled")));
    }

    #[tokio::test]
    async fn test_destructive_stop_targets_terminated() {
        let api = Arc::new(ScriptedComputeApi::new());
        api.script_status_sequence([
            LifecycleState::Running,
            LifecycleState::ShuttingDown,
            LifecycleState::Terminated,
        ]);
        let (ctx, reporter) = context_with(api.clone());
        let step = fast_step().with_destructive(true);

        let verdict = step.run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Continue);
        assert!(reporter
            .messages()
            .iter()
            .any(|m| m.contains("Terminating instance i-1")));
    }

    #[tokio::test]
    async fn test_missing_client_is_contract_violation() {
        let reporter = Arc::new(CollectingReporter::new());
        let ctx = StepContext::new()
            .with_resource(InstanceHandle::new("i-1"))
            .with_reporter(reporter.clone());

        let verdict = fast_step().run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Halt);
        assert!(ctx.error().map_or(false, |e| e.is_contract_violation()));
        assert!(!reporter.errors().is_empty());
    }

    #[tokio::test]
    async fn test_missing_resource_is_contract_violation() {
        let api = Arc::new(ScriptedComputeApi::new());
        let ctx = StepContext::new()
            .with_client(api)
            .with_reporter(Arc::new(CollectingReporter::new()));

        let verdict = fast_step().run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Halt);
        assert!(ctx.error().map_or(false, |e| e.is_contract_violation()));
    }

    #[tokio::test]
    async fn test_transient_status_errors_do_not_fail_the_run() {
        let api = Arc::new(ScriptedComputeApi::new());
        api.script_status(Ok(LifecycleState::Running));
        api.script_status(Err(ApiError::transient("throttled")));
        api.script_status(Ok(LifecycleState::Stopping));
        api.script_status(Ok(LifecycleState::Stopped));
        let (ctx, _reporter) = context_with(api.clone());

        let verdict = fast_step().run(&ctx).await;

        assert_eq!(verdict, StepVerdict::Continue);
        assert!(!ctx.has_error());
    }

    #[tokio::test]
    async fn test_cleanup_is_noop() {
        let api = Arc::new(ScriptedComputeApi::new());
        let (ctx, _reporter) = context_with(api.clone());

        fast_step().cleanup(&ctx).await;

        assert_eq!(api.stop_call_count(), 0);
        assert_eq!(api.status_call_count(), 0);
        assert!(!ctx.has_error());
    }
}
