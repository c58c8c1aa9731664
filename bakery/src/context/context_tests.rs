//! Tests for the step context.

#[cfg(test)]
mod tests {
    use crate::cancellation::CancellationToken;
    use crate::compute::InstanceHandle;
    use crate::context::StepContext;
    use crate::errors::ProvisionError;
    use crate::report::CollectingReporter;
    use crate::testing::ScriptedComputeApi;
    use std::sync::Arc;

    #[test]
    fn test_fresh_context_has_unique_run_id() {
        let a = StepContext::new();
        let b = StepContext::new();
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn test_missing_client_is_contract_violation() {
        let ctx = StepContext::new();

        let err = ctx.client().err().unwrap();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_missing_resource_is_contract_violation() {
        let ctx = StepContext::new();

        let err = ctx.resource().unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_supplied_slots_resolve() {
        let ctx = StepContext::new()
            .with_client(Arc::new(ScriptedComputeApi::new()))
            .with_resource(InstanceHandle::new("i-1"));

        assert!(ctx.client().is_ok());
        assert_eq!(ctx.resource().unwrap().id(), "i-1");
    }

    #[test]
    fn test_error_slot() {
        let ctx = StepContext::new();
        assert!(!ctx.has_error());
        assert!(ctx.error().is_none());

        ctx.record_error(ProvisionError::api("boom"));
        assert!(ctx.has_error());
        assert_eq!(ctx.error(), Some(ProvisionError::api("boom")));

        let taken = ctx.take_error();
        assert_eq!(taken, Some(ProvisionError::api("boom")));
        assert!(!ctx.has_error());
    }

    #[test]
    fn test_cancellation_delegation() {
        let token = CancellationToken::new();
        let ctx = StepContext::new().with_cancellation(token.clone());

        assert!(!ctx.is_cancelled());
        token.cancel("user interrupt");
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn test_cancel_through_context() {
        let ctx = StepContext::new();
        ctx.cancel("shutting down");

        assert!(ctx.is_cancelled());
        assert_eq!(
            ctx.cancellation().reason(),
            Some("shutting down".to_string())
        );
    }

    #[test]
    fn test_custom_reporter_is_used() {
        let reporter = Arc::new(CollectingReporter::new());
        let ctx = StepContext::new().with_reporter(reporter.clone());

        ctx.reporter().say("hello");
        assert_eq!(reporter.messages(), vec!["hello".to_string()]);
    }
}
