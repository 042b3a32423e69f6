//! One iteration of the managed reconcile loop.
//!
//! The loop itself (watching records, scheduling requeues, backoff) belongs
//! to the host. This module decides, for one record and one observation,
//! which external operation to run next and records the outcome as
//! conditions on the record.

use std::time::Duration;

use crate::condition::{Condition, ConditionReason, ConditionType, Conditions};
use crate::error::Result;
use crate::external::ExternalClient;
use crate::meta::{has_external_name, set_external_name};
use crate::resource::{ManagedKind, FINALIZER};

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Wait after a mutation or failure before looking again.
    pub short_wait: Duration,
    /// Wait between checks of a converged record.
    pub poll_interval: Duration,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            short_wait: Duration::from_secs(10),
            poll_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Look at the record again after the given delay.
    Requeue(Duration),
    /// The external object is gone and the record may be removed.
    Deleted,
}

/// Run one observe-then-act pass over `res`.
///
/// A failing external call is not returned: it is recorded as a
/// `Synced=False` condition and the record is requeued after the short
/// wait. Callers persist `res` whatever the action.
pub async fn reconcile_once<C: ExternalClient>(
    client: &C,
    res: &mut C::Resource,
    opts: &ReconcileOptions,
) -> ReconcileAction {
    match drive(client, res, opts).await {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!(
                name = %res.metadata().name,
                retryable = e.is_retryable(),
                "reconcile failed: {e}"
            );
            res.conditions_mut()
                .set(Condition::reconcile_error(e.to_string()));
            ReconcileAction::Requeue(opts.short_wait)
        }
    }
}

/// Message of the current `Synced` condition when the last pass failed.
pub fn last_error(conditions: &Conditions) -> Option<&str> {
    conditions
        .current(ConditionType::Synced)
        .filter(|c| c.reason == ConditionReason::ReconcileError)
        .map(|c| c.message.as_deref().unwrap_or_default())
}

async fn drive<C: ExternalClient>(
    client: &C,
    res: &mut C::Resource,
    opts: &ReconcileOptions,
) -> Result<ReconcileAction> {
    let name = res.metadata().name.clone();

    if !res.metadata().deletion_requested && !has_external_name(res.metadata()) {
        set_external_name(res.metadata_mut(), name.clone());
    }

    let obs = client.observe(res).await?;

    if res.metadata().deletion_requested {
        res.conditions_mut().set(Condition::deleting());
        if obs.resource_exists {
            client.delete(res).await?;
            res.conditions_mut().set(Condition::reconcile_success());
            return Ok(ReconcileAction::Requeue(opts.short_wait));
        }
        tracing::info!(%name, "external resource is gone; releasing record");
        res.metadata_mut().remove_finalizer(FINALIZER);
        res.conditions_mut().set(Condition::reconcile_success());
        return Ok(ReconcileAction::Deleted);
    }

    res.metadata_mut().add_finalizer(FINALIZER);

    if !obs.resource_exists {
        client.create(res).await?;
        res.conditions_mut().set(Condition::creating());
        res.conditions_mut().set(Condition::reconcile_success());
        return Ok(ReconcileAction::Requeue(opts.short_wait));
    }

    if !obs.resource_up_to_date {
        client.update(res).await?;
    }

    res.conditions_mut().set(Condition::reconcile_success());
    Ok(ReconcileAction::Requeue(opts.poll_interval))
}
