//! Polling loop

use crate::check::{Observation, Prober};
use crate::options::ProbeOptions;
use crate::resource::Resource;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info};
use wait_on_action_core::{ResourceWaiter, RunConfiguration, WaitError};

/// Polls every resource until it holds its target state for the window
#[derive(Debug, Default, Clone)]
pub struct ProbeWaiter;

impl ProbeWaiter {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceWaiter for ProbeWaiter {
    async fn wait(&self, config: &RunConfiguration) -> Result<(), WaitError> {
        let options = ProbeOptions::try_from(config)?;
        let resources = config
            .resources
            .iter()
            .map(|raw| Resource::parse(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let prober = Arc::new(Prober::new(config, &options)?);

        let deadline = options.timeout.map(|t| Instant::now() + t);
        let mut pending = vec![true; resources.len()];

        let poll = poll_all(resources, prober, options, &mut pending);
        let outcome = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, poll).await,
            None => Ok(poll.await),
        };

        match outcome {
            Ok(result) => result,
            Err(_) => Err(WaitError::Timeout {
                pending: config
                    .resources
                    .iter()
                    .zip(&pending)
                    .filter(|(_, waiting)| **waiting)
                    .map(|(raw, _)| raw.clone())
                    .collect(),
            }),
        }
    }

    fn name(&self) -> &str {
        "probe"
    }
}

/// Run the delay, then poll all resources concurrently
///
/// Clears `pending[i]` as resource `i` settles. Dropping this future aborts
/// every outstanding check.
async fn poll_all(
    resources: Vec<Resource>,
    prober: Arc<Prober>,
    options: ProbeOptions,
    pending: &mut [bool],
) -> Result<(), WaitError> {
    if !options.delay.is_zero() {
        tokio::time::sleep(options.delay).await;
    }

    if options.log {
        let mode = if options.reverse { "unavailable" } else { "available" };
        info!("Waiting for {} resource(s) to become {mode}", resources.len());
    }

    let limit = options.simultaneous.unwrap_or(Semaphore::MAX_PERMITS);
    let permits = Arc::new(Semaphore::new(limit.min(Semaphore::MAX_PERMITS)));

    let mut set = JoinSet::new();
    for (index, resource) in resources.into_iter().enumerate() {
        let prober = Arc::clone(&prober);
        let permits = Arc::clone(&permits);
        set.spawn(async move {
            settle(&resource, &prober, &permits, options).await;
            (index, resource)
        });
    }

    while let Some(joined) = set.join_next().await {
        let (index, resource) =
            joined.map_err(|e| WaitError::Failed(format!("Probe task failed: {e}")))?;
        pending[index] = false;
        if options.log {
            info!("{resource} is ready");
        }
    }

    Ok(())
}

/// Poll one resource until it stays in the target state for the window
async fn settle(resource: &Resource, prober: &Prober, permits: &Semaphore, options: ProbeOptions) {
    let mut stable: Option<(Instant, Option<u64>)> = None;

    loop {
        let observation = match permits.acquire().await {
            Ok(_permit) => prober.check(resource).await,
            Err(_) => Observation::Unavailable("probe shut down".to_string()),
        };

        if options.verbose {
            debug!("{resource}: {observation:?}");
        }

        let on_target = observation.is_available() != options.reverse;
        if on_target {
            // File sizes must hold still across the window
            let signature = match observation {
                Observation::Available { size } if resource.is_file() => size,
                _ => None,
            };
            match stable {
                Some((since, previous)) if previous == signature => {
                    if since.elapsed() >= options.window {
                        return;
                    }
                }
                _ => stable = Some((Instant::now(), signature)),
            }
        } else {
            stable = None;
        }

        tokio::time::sleep(options.interval).await;
    }
}
