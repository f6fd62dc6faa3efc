//! Step control flow: subscription gate, then input adaptation and the wait

use crate::config::{ExternalDefaults, RunConfiguration};
use crate::context::ExecutionContext;
use crate::error::ActionError;
use crate::inputs::{ActionInputs, InputSource};
use crate::subscription::{SubscriptionClient, SubscriptionVerdict};
use crate::waiter::ErasedResourceWaiter;
use tracing::{debug, info};

/// Gate the run on the subscription service
///
/// # Errors
///
/// Returns `ActionError::LicensingDenied` only when the service answers 403.
pub async fn validate_subscription(
    client: &SubscriptionClient,
    context: &ExecutionContext,
) -> Result<(), ActionError> {
    context.log_summary();

    match client.check(context).await {
        SubscriptionVerdict::Denied => Err(ActionError::LicensingDenied),
        SubscriptionVerdict::Valid => Ok(()),
        SubscriptionVerdict::Unreachable(reason) => {
            debug!("Subscription check inconclusive: {reason}");
            info!("Timeout or API not reachable. Continuing to next step.");
            Ok(())
        }
    }
}

/// Read inputs and merge them over the optional defaults document
///
/// # Errors
///
/// Returns `ActionError::Input` for missing or malformed inputs and
/// `ActionError::Config` when the defaults document cannot be loaded.
pub fn build_configuration(
    source: &impl InputSource,
    context: &ExecutionContext,
) -> Result<RunConfiguration, ActionError> {
    let inputs = ActionInputs::read(source)?;

    let defaults = match &inputs.config {
        Some(path) => ExternalDefaults::load(path, context.workspace.as_deref())?,
        None => ExternalDefaults::default(),
    };

    Ok(RunConfiguration::assemble(defaults, &inputs))
}

/// Run the step once
///
/// The subscription gate always runs first. A denial short-circuits before
/// any input is read; every other failure is returned for the caller to
/// report as a failed run.
pub async fn run(
    source: &impl InputSource,
    context: &ExecutionContext,
    subscription: &SubscriptionClient,
    waiter: &dyn ErasedResourceWaiter,
) -> Result<(), ActionError> {
    validate_subscription(subscription, context).await?;

    let config = build_configuration(source, context)?;
    debug!(
        "Waiting on {} resource(s) with {}",
        config.resources.len(),
        waiter.name()
    );

    waiter.wait(&config).await?;
    debug!("Successfully waited for resources to become accessible");
    Ok(())
}
