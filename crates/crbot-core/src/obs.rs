//! Structured observability hooks for crbot runs.
//!
//! Every run is wrapped in a [`run_span`] so all events carry its `run_id`.
//! Lifecycle events are emitted at `info!`; write failures at `warn!`.

use tracing::{info, warn};

use crate::mutation::Mutation;

/// Span tagged with the run id and organization.
///
/// Attach it to the run future with `tracing::Instrument` rather than
/// entering it, so the guard is never held across an `.await`.
pub fn run_span(run_id: &str, org: &str) -> tracing::Span {
    tracing::info_span!("crbot.run", run_id = %run_id, org = %org)
}

/// Emit event: run started.
pub fn emit_run_started(run_id: &str, org: &str, update_repo: bool, notification: &str) {
    info!(
        event = "run.started",
        run_id = %run_id,
        org = %org,
        update_repo = update_repo,
        notification = %notification,
    );
}

/// Emit event: a pull request has a verdict.
pub fn emit_pull_evaluated(repo: &str, number: u64, compliant: bool, external: bool, reason: &str) {
    info!(
        event = "pull.evaluated",
        repo = %repo,
        pull = number,
        compliant = compliant,
        external = external,
        reason = %reason,
    );
}

/// Emit event: a write is planned. `applied` is false on dry runs.
pub fn emit_mutation(repo: &str, number: u64, mutation: &Mutation, applied: bool) {
    info!(
        event = "mutation.planned",
        repo = %repo,
        pull = number,
        mutation = %mutation,
        applied = applied,
    );
    if !applied {
        info!(
            event = "mutation.skipped",
            repo = %repo,
            pull = number,
            "update-repo is disabled; skipping"
        );
    }
}

/// Emit event: a write failed (warning level).
pub fn emit_mutation_failed(
    repo: &str,
    number: u64,
    mutation: &Mutation,
    error: &dyn std::fmt::Display,
) {
    warn!(
        event = "mutation.failed",
        repo = %repo,
        pull = number,
        mutation = %mutation,
        error = %error,
    );
}

/// Emit event: a unit (repository or pull request) was skipped after a read failure.
pub fn emit_unit_skipped(unit: &str, error: &dyn std::fmt::Display) {
    warn!(event = "unit.skipped", unit = %unit, error = %error);
}

/// Emit event: run finished with verdict counts.
pub fn emit_run_finished(
    run_id: &str,
    compliant: usize,
    non_compliant: usize,
    external: usize,
    skipped: usize,
) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        compliant = compliant,
        non_compliant = non_compliant,
        external = external,
        skipped = skipped,
    );
}
