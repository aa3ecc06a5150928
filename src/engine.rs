//! Fan-out execution across credential contexts.
//!
//! Every context gets its own tokio task running the command dispatcher.
//! Workers append into a shared, mutex-guarded accumulator; nothing else is
//! shared between them apart from the fail-fast stop flag.
//!
//! Under [`FailurePolicy::BestEffort`] a failing context becomes a
//! [`Warning`] and the run only fails if no records were collected at all.
//! Under [`FailurePolicy::FailFast`] the first failure raises the stop flag,
//! the remaining workers finish whatever lookups are already in flight, and
//! that first failure is returned.

use crate::audit::{AuditReport, ContextScope, KeyRecord, Warning};
use crate::commands::{dispatch, Command, DispatchError, DispatchOptions};
use crate::config::{AuditConfig, FailurePolicy};
use crate::context::CredentialContext;
use crate::error::AuditError;
use crate::utils::format::format_number;
use crate::utils::progress::ProgressBar;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Results gathered from all workers, in completion order.
#[derive(Default)]
struct Accumulator {
    records: Vec<KeyRecord>,
    failures: Vec<(ContextScope, DispatchError)>,
}

fn lock(accumulator: &Mutex<Accumulator>) -> MutexGuard<'_, Accumulator> {
    // Workers never await while holding the lock, so poisoned data is intact.
    accumulator.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `command` against every context concurrently.
///
/// # Errors
///
/// - [`AuditError::NoContexts`] when `contexts` is empty
/// - [`AuditError::Dispatch`] for the first failing context under
///   [`FailurePolicy::FailFast`]
/// - [`AuditError::NoData`] when no context produced any records
pub async fn execute(
    contexts: Vec<CredentialContext>,
    command: Command,
    config: &AuditConfig,
) -> Result<AuditReport, AuditError> {
    execute_with_progress(contexts, command, config, ProgressBar::hidden()).await
}

/// [`execute`], advancing `progress` by one for each finished context.
///
/// # Errors
///
/// Same as [`execute`].
pub async fn execute_with_progress(
    contexts: Vec<CredentialContext>,
    command: Command,
    config: &AuditConfig,
    progress: ProgressBar,
) -> Result<AuditReport, AuditError> {
    if contexts.is_empty() {
        return Err(AuditError::NoContexts);
    }

    let fail_fast = config.failure_policy == FailurePolicy::FailFast;
    let command = Arc::new(command);
    let stop = Arc::new(AtomicBool::new(false));
    let options = DispatchOptions::with_stop_signal(config.user_concurrency, Arc::clone(&stop));
    let accumulator = Arc::new(Mutex::new(Accumulator::default()));

    debug!(
        command = command.name(),
        contexts = contexts.len(),
        "dispatching to all contexts"
    );

    let mut workers = Vec::with_capacity(contexts.len());
    for ctx in contexts {
        let scope = ctx.scope().clone();
        let command = Arc::clone(&command);
        let options = options.clone();
        let stop = Arc::clone(&stop);
        let accumulator = Arc::clone(&accumulator);
        let progress = progress.clone();

        let handle = tokio::spawn(async move {
            let outcome = dispatch(&ctx, &command, &options).await;

            let mut acc = lock(&accumulator);
            match outcome {
                Ok(records) => {
                    debug!(scope = %ctx.scope(), records = records.len(), "context finished");
                    acc.records.extend(records);
                }
                Err(err) => {
                    if fail_fast {
                        stop.store(true, Ordering::Relaxed);
                    }
                    acc.failures.push((ctx.scope().clone(), err));
                }
            }
            drop(acc);

            progress.inc();
        });
        workers.push((scope, handle));
    }

    let (scopes, handles): (Vec<_>, Vec<_>) = workers.into_iter().unzip();
    for (scope, joined) in scopes.into_iter().zip(join_all(handles).await) {
        if let Err(err) = joined {
            lock(&accumulator)
                .failures
                .push((scope, DispatchError::Worker(err.to_string())));
        }
    }

    let Accumulator { records, failures } = std::mem::take(&mut *lock(&accumulator));

    let warnings: Vec<Warning> = if fail_fast {
        if let Some((scope, source)) = failures.into_iter().next() {
            progress.finish_and_clear();
            return Err(AuditError::Dispatch { scope, source });
        }
        Vec::new()
    } else {
        failures
            .into_iter()
            .map(|(scope, err)| {
                warn!(%scope, error = %err, "command failed");
                Warning::new(scope, err.to_string())
            })
            .collect()
    };

    progress.finish_with_message(&format!(
        "Collected {} key records",
        format_number(records.len())
    ));

    if records.is_empty() {
        return Err(AuditError::NoData { warnings });
    }

    Ok(AuditReport { records, warnings })
}
