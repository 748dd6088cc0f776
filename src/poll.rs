//! Bounded fixed-interval polling of a transaction until it settles.
//!
//! The customer approves a collection on their handset, which can take a while.
//! Polling runs at a fixed interval with a fixed attempt budget. A failed status
//! check ends the poll immediately.

use std::{fmt::Display, future::Future, time::Duration};

use tracing::instrument;

use crate::gateway::{
    self, GatewaySession,
    error::GatewayError,
    status::{TransactionResponse, TransactionStatus},
};

pub trait TransactionSource {
    fn fetch_transaction(
        &self,
        reference: &str,
    ) -> impl Future<Output = gateway::Result<TransactionResponse>>;
}

impl TransactionSource for GatewaySession {
    async fn fetch_transaction(&self, reference: &str) -> gateway::Result<TransactionResponse> {
        GatewaySession::fetch_transaction(self, reference).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollConfig {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 40;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
}

/// Non-terminal observation reported to the caller between attempts
#[derive(Debug)]
pub struct PollProgress<'a> {
    pub attempt: u32,
    pub max_attempts: u32,
    pub status: &'a TransactionStatus,
}

#[derive(Debug)]
pub enum PollError {
    /// A status check failed. The poll is abandoned at that attempt.
    Status { attempt: u32, source: GatewayError },
    /// The attempt budget ran out before the transaction settled
    TimedOut { attempts: u32 },
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Status { source, .. } => Some(source),
            Self::TimedOut { .. } => None,
        }
    }
}

impl Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { attempt, source } => {
                write!(f, "status check failed on attempt {attempt}: {source}")
            }
            Self::TimedOut { attempts } => write!(
                f,
                "transaction polling timed out after {attempts} attempts without a final status"
            ),
        }
    }
}

/// Polls `reference` until the gateway reports `SUCCESSFUL` or `FAILED`.
///
/// Returns the first terminal snapshot. `on_progress` is called for every
/// non-terminal snapshot before sleeping.
#[instrument(skip_all, fields(%reference, max_attempts = config.max_attempts))]
pub async fn poll_transaction<S, F>(
    source: &S,
    reference: &str,
    config: PollConfig,
    mut on_progress: F,
) -> Result<TransactionResponse, PollError>
where
    S: TransactionSource,
    F: FnMut(PollProgress<'_>),
{
    for attempt in 1..=config.max_attempts {
        let snapshot = source
            .fetch_transaction(reference)
            .await
            .map_err(|source| {
                tracing::debug!(attempt, status = ?source.status(), "Status check failed: {source}");
                PollError::Status { attempt, source }
            })?;

        let status = snapshot.normalized_status();
        if status.is_terminal() {
            tracing::info!(%status, attempt, "Transaction reached final status");
            return Ok(snapshot);
        }

        if let TransactionStatus::Other(raw) = &status {
            tracing::warn!(status = %raw, attempt, "Unrecognized transaction status");
        } else {
            tracing::debug!(%status, attempt, "Transaction still pending");
        }
        on_progress(PollProgress {
            attempt,
            max_attempts: config.max_attempts,
            status: &status,
        });

        if attempt < config.max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    tracing::warn!(attempts = config.max_attempts, "Transaction polling timed out");
    Err(PollError::TimedOut {
        attempts: config.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::VecDeque};

    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;

    /// Replays a fixed script of status-check outcomes
    struct ScriptedSource {
        script: RefCell<VecDeque<gateway::Result<TransactionResponse>>>,
        calls: RefCell<Vec<tokio::time::Instant>>,
    }

    impl ScriptedSource {
        fn new(script: impl IntoIterator<Item = gateway::Result<TransactionResponse>>) -> Self {
            Self {
                script: RefCell::new(script.into_iter().collect()),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl TransactionSource for ScriptedSource {
        async fn fetch_transaction(&self, reference: &str) -> gateway::Result<TransactionResponse> {
            assert_eq!(reference, "r1");
            self.calls.borrow_mut().push(tokio::time::Instant::now());
            self.script
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(snapshot("PENDING")))
        }
    }

    fn snapshot(status: &str) -> TransactionResponse {
        serde_json::from_value(json!({
            "reference": "r1",
            "external_reference": "TXN-1",
            "status": status,
            "amount": 100,
            "currency": "XAF",
        }))
        .unwrap()
    }

    fn config(max_attempts: u32) -> PollConfig {
        PollConfig {
            max_attempts,
            interval: Duration::from_secs(5),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_status_on_first_attempt_returns_immediately() {
        let source = ScriptedSource::new([Ok(snapshot("SUCCESSFUL"))]);
        let started = tokio::time::Instant::now();
        let tx = poll_transaction(&source, "r1", config(60), |_| panic!("no progress expected"))
            .await
            .unwrap();
        assert_eq!(tx.normalized_status(), TransactionStatus::Successful);
        assert_eq!(source.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_is_a_result_not_an_error() {
        let source = ScriptedSource::new([Ok(snapshot("PENDING")), Ok(snapshot(" failed "))]);
        let tx = poll_transaction(&source, "r1", config(40), |_| {}).await.unwrap();
        assert_eq!(tx.normalized_status(), TransactionStatus::Failed);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_exactly_the_budget_before_timing_out() {
        let source = ScriptedSource::new([]);
        let mut seen = Vec::new();
        let err = poll_transaction(&source, "r1", config(4), |p| {
            assert_eq!(p.max_attempts, 4);
            seen.push((p.attempt, p.status.clone()));
        })
        .await
        .unwrap_err();

        assert!(matches!(err, PollError::TimedOut { attempts: 4 }));
        assert_eq!(source.calls(), 4);
        assert_eq!(
            seen,
            (1..=4)
                .map(|a| (a, TransactionStatus::Pending))
                .collect::<Vec<_>>()
        );

        let calls = source.calls.borrow();
        for pair in calls.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_secs(5));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn no_sleep_after_last_attempt() {
        let source = ScriptedSource::new([]);
        let started = tokio::time::Instant::now();
        let _ = poll_transaction(&source, "r1", config(3), |_| {}).await;
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_check_aborts_without_further_attempts() {
        let source = ScriptedSource::new([
            Ok(snapshot("PENDING")),
            Err(GatewayError::from_error_body(
                StatusCode::UNAUTHORIZED,
                br#"{"code":"ER401","message":"Invalid token"}"#,
            )),
            Ok(snapshot("SUCCESSFUL")),
        ]);
        let err = poll_transaction(&source, "r1", config(60), |_| {})
            .await
            .unwrap_err();

        match err {
            PollError::Status { attempt, source } => {
                assert_eq!(attempt, 2);
                assert!(source.to_string().contains("ER401"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_status_keeps_polling_and_is_reported_as_is() {
        let source = ScriptedSource::new([
            Ok(snapshot("processing")),
            Ok(snapshot("SUCCESSFUL")),
        ]);
        let mut seen = Vec::new();
        poll_transaction(&source, "r1", config(10), |p| seen.push(p.status.to_string()))
            .await
            .unwrap();
        assert_eq!(seen, ["PROCESSING"]);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_times_out_without_calls() {
        let source = ScriptedSource::new([]);
        let err = poll_transaction(&source, "r1", config(0), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, PollError::TimedOut { attempts: 0 }));
        assert_eq!(source.calls(), 0);
    }

    #[test]
    fn timeout_is_distinct_from_gateway_failure() {
        let err = PollError::TimedOut { attempts: 40 };
        assert!(err.to_string().contains("timed out after 40 attempts"));
        assert!(std::error::Error::source(&err).is_none());
    }
}
