use std::future::Future;

use futures_util::future::{join_all, select_ok};
use tracing::{debug, warn};

use crate::{
    config::{Instance, Strategy},
    error::ProbeError,
};

/// Runs `attempt` against `instances` until one of them succeeds
///
/// Failed attempts are logged and skipped. Returns `None` once every instance failed,
/// or straight away when there are no instances.
pub async fn first_success<'a, T, F, Fut>(
    strategy: Strategy,
    instances: &'a [Instance],
    attempt: F,
) -> Option<(&'a Instance, T)>
where
    F: Fn(&'a Instance) -> Fut,
    Fut: Future<Output = Result<T, ProbeError>>,
{
    match strategy {
        Strategy::Ordered => {
            for instance in instances {
                debug!("Trying {instance}");
                match attempt(instance).await {
                    Ok(value) => return Some((instance, value)),
                    Err(e) => warn!("{instance}: {e}"),
                }
            }
            None
        }
        Strategy::Race => {
            // select_ok panics on an empty iterator
            if instances.is_empty() {
                return None;
            }

            let attempts = instances.iter().map(|instance| {
                let fut = attempt(instance);
                Box::pin(async move {
                    fut.await.map(|value| (instance, value)).inspect_err(|e| {
                        warn!("{instance}: {e}");
                    })
                })
            });

            select_ok(attempts).await.ok().map(|(found, _pending)| found)
        }
    }
}

/// Runs `attempt` against every instance and keeps every outcome, in instance order
///
/// [`Strategy::Ordered`] runs them one at a time, [`Strategy::Race`] all at once.
pub async fn each<'a, T, F, Fut>(strategy: Strategy, instances: &'a [Instance], attempt: F) -> Vec<T>
where
    F: Fn(&'a Instance) -> Fut,
    Fut: Future<Output = T>,
{
    match strategy {
        Strategy::Ordered => {
            let mut outcomes = Vec::with_capacity(instances.len());
            for instance in instances {
                outcomes.push(attempt(instance).await);
            }
            outcomes
        }
        Strategy::Race => join_all(instances.iter().map(&attempt)).await,
    }
}
