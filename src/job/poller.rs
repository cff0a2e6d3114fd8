use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::job::PollConfig;
use crate::api::{ApiError, EffectsApi, RemoteStatus, StatusResponse};
use crate::ui::UiSink;

/// The four states of the polling state machine.
///
/// Each job flows through: POLLING → {COMPLETED | FAILED | TIMED_OUT}
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Completed,
    Failed,
    TimedOut,
}

/// Errors that end a polling run without a result.
#[derive(Debug, Error)]
pub enum PollError {
    /// The status endpoint returned a transport or non-success failure.
    /// Terminal: the transport error itself is not retried.
    #[error("status check failed: {0}")]
    Status(#[from] ApiError),

    /// The server reported the job as failed, with its message when present.
    #[error("job processing failed: {0}")]
    JobFailed(String),

    /// The iteration budget elapsed without a terminal status.
    #[error("operation timed out, please try again")]
    TimedOut,

    /// The run was superseded or reset while waiting.
    #[error("polling cancelled")]
    Cancelled,
}

/// A successful polling run: the terminal response plus how many status
/// queries it took.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub response: StatusResponse,
    pub polls: u32,
}

/// One evaluated step of the poll loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollStep {
    /// Stay in Polling and wait one interval; progress is queries-so-far
    /// over the budget.
    Continue { progress_pct: u8 },
    Completed,
    Failed(String),
    TimedOut,
}

impl PollStep {
    pub fn state(&self) -> PollState {
        match self {
            PollStep::Continue { .. } => PollState::Polling,
            PollStep::Completed => PollState::Completed,
            PollStep::Failed(_) => PollState::Failed,
            PollStep::TimedOut => PollState::TimedOut,
        }
    }
}

/// Compute the next transition given the latest status response and the
/// number of queries issued so far (including this one).
pub fn evaluate(response: &StatusResponse, polls: u32, max_polls: u32) -> PollStep {
    match response.status {
        RemoteStatus::Completed => PollStep::Completed,
        RemoteStatus::Failed | RemoteStatus::Error => PollStep::Failed(
            response
                .error
                .clone()
                .unwrap_or_else(|| "job processing failed".to_string()),
        ),
        _ if polls >= max_polls => PollStep::TimedOut,
        _ => {
            let progress_pct =
                ((polls.saturating_sub(1) as f64 / max_polls as f64) * 100.0).round() as u8;
            PollStep::Continue { progress_pct }
        }
    }
}

/// Query job status on a fixed cadence until a terminal state or timeout.
///
/// Cooperative: each wait suspends this flow only. Cancellation is honored
/// before every query and during every wait. Never issues more than
/// `config.max_polls` queries and never waits less than the fixed interval
/// between them.
pub async fn poll_until_done(
    api: &impl EffectsApi,
    job_id: &str,
    config: &PollConfig,
    cancel: &CancellationToken,
    sink: &dyn UiSink,
) -> Result<PollOutcome, PollError> {
    let mut polls: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled);
        }

        let response = api.job_status(job_id).await?;
        polls += 1;

        match evaluate(&response, polls, config.max_polls) {
            PollStep::Completed => return Ok(PollOutcome { response, polls }),
            PollStep::Failed(message) => return Err(PollError::JobFailed(message)),
            PollStep::TimedOut => return Err(PollError::TimedOut),
            PollStep::Continue { progress_pct } => {
                sink.status(&format!("PROCESSING... ({progress_pct}%)"));
                tokio::select! {
                    _ = cancel.cancelled() => return Err(PollError::Cancelled),
                    _ = sleep(Duration::from_millis(config.interval_ms)) => {}
                }
            }
        }
    }
}
