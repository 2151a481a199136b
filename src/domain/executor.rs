//! Stage Executor
//!
//! Runs one stage function under a [`RetryPolicy`] and condenses every
//! attempt into a single [`StageResult`].

use crate::domain::error::StageFailure;
use crate::domain::events::Reporter;
use crate::domain::models::{Stage, StageResult};
use crate::domain::policy::RetryPolicy;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of an executed stage plus the value of the successful attempt
#[derive(Debug)]
pub struct StageRun<T> {
    pub result: StageResult,
    pub value: Option<T>,
}

pub struct StageExecutor<'a> {
    stage: Stage,
    policy: &'a RetryPolicy,
    reporter: &'a Reporter,
}

impl<'a> StageExecutor<'a> {
    pub fn new(stage: Stage, policy: &'a RetryPolicy, reporter: &'a Reporter) -> Self {
        Self {
            stage,
            policy,
            reporter,
        }
    }

    /// Run `op` with no side effect between attempts. `op` receives the
    /// timeout of the attempt it is called for.
    pub async fn execute<T, Op, Fut>(&self, op: Op) -> StageRun<T>
    where
        Op: FnMut(Duration) -> Fut,
        Fut: Future<Output = Result<T, StageFailure>>,
    {
        self.execute_with(op, || std::future::ready(())).await
    }

    /// Run `op`, calling `before_retry` after the delay that precedes every
    /// attempt but the first
    pub async fn execute_with<T, Op, Fut, Hook, HookFut>(
        &self,
        mut op: Op,
        mut before_retry: Hook,
    ) -> StageRun<T>
    where
        Op: FnMut(Duration) -> Fut,
        Fut: Future<Output = Result<T, StageFailure>>,
        Hook: FnMut() -> HookFut,
        HookFut: Future<Output = ()>,
    {
        let max_attempts = self.policy.attempts();
        let mut last_detail = String::new();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = self.policy.delay_after(attempt - 1);
                debug!("{}: waiting {:?} before attempt {}", self.stage, delay, attempt);
                tokio::time::sleep(delay).await;
                before_retry().await;
            }

            let timeout = self.policy.attempt_timeout(attempt);
            let failure = match tokio::time::timeout(timeout, op(timeout)).await {
                Ok(Ok(value)) => {
                    info!(
                        "[{}] {} succeeded on attempt {}/{}",
                        self.reporter.device(),
                        self.stage,
                        attempt,
                        max_attempts
                    );
                    return StageRun {
                        result: StageResult::success(
                            self.stage,
                            success_detail(attempt),
                            attempt,
                        ),
                        value: Some(value),
                    };
                }
                Ok(Err(failure)) => failure,
                Err(_) => StageFailure::Recoverable(format!("attempt timed out after {:?}", timeout)),
            };

            match failure {
                StageFailure::Fatal(detail) => {
                    warn!(
                        "[{}] {} failed fatally: {}",
                        self.reporter.device(),
                        self.stage,
                        detail
                    );
                    return StageRun {
                        result: StageResult::fatal(self.stage, detail, attempt),
                        value: None,
                    };
                }
                StageFailure::Recoverable(detail) => {
                    warn!(
                        "[{}] {} attempt {}/{} failed: {}",
                        self.reporter.device(),
                        self.stage,
                        attempt,
                        max_attempts,
                        detail
                    );
                    self.reporter
                        .attempt_failed(self.stage, attempt, max_attempts, &detail);
                    last_detail = detail;
                }
            }
        }

        StageRun {
            result: StageResult::fatal(
                self.stage,
                format!(
                    "gave up after {} attempt(s): {}",
                    max_attempts, last_detail
                ),
                max_attempts,
            ),
            value: None,
        }
    }
}

fn success_detail(attempt: u32) -> String {
    if attempt == 1 {
        "ok".to_string()
    } else {
        format!("ok after {} attempts", attempt)
    }
}
