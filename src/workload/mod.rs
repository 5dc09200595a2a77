//! Synthetic workload behind `/slow`.
//!
//! Each call draws a delay from the configured list and, with
//! `failure_rate` probability, fails with one of the configured messages
//! instead. The wait is a tokio timer, so only the calling task is parked.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::config::WorkloadConfig;

/// A simulated downstream failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct WorkloadError(pub String);

/// What a single call will do, decided up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Sleep(Duration),
    Fail(String),
}

/// Randomized slow task.
#[derive(Debug, Clone)]
pub struct HeavyTask {
    config: WorkloadConfig,
}

impl HeavyTask {
    pub fn new(config: WorkloadConfig) -> Self {
        Self { config }
    }

    /// Decide the outcome of one call.
    pub fn plan<R: Rng>(&self, rng: &mut R) -> Plan {
        let delay_ms = self.config.delays_ms.choose(rng).copied().unwrap_or(0);

        if rng.gen_bool(self.config.failure_rate.clamp(0.0, 1.0)) {
            let message = self
                .config
                .failure_messages
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| "Heavy task failed".to_string());
            return Plan::Fail(message);
        }
        Plan::Sleep(Duration::from_millis(delay_ms))
    }

    /// Run one call, returning the time spent in milliseconds.
    pub async fn run(&self) -> Result<u64, WorkloadError> {
        // ThreadRng is not Send; keep it out of the await.
        let plan = self.plan(&mut rand::thread_rng());
        match plan {
            Plan::Fail(message) => Err(WorkloadError(message)),
            Plan::Sleep(delay) => {
                tokio::time::sleep(delay).await;
                Ok(delay.as_millis() as u64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn task(delays_ms: Vec<u64>, failure_rate: f64) -> HeavyTask {
        HeavyTask::new(WorkloadConfig {
            delays_ms,
            failure_rate,
            ..WorkloadConfig::default()
        })
    }

    #[test]
    fn test_plan_picks_configured_delay() {
        let task = task(vec![100, 200, 300], 0.0);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            match task.plan(&mut rng) {
                Plan::Sleep(d) => assert!([100, 200, 300].contains(&(d.as_millis() as u64))),
                Plan::Fail(m) => panic!("unexpected failure {m}"),
            }
        }
    }

    #[test]
    fn test_plan_always_fails_at_rate_one() {
        let task = task(vec![100], 1.0);
        let mut rng = StdRng::seed_from_u64(7);
        match task.plan(&mut rng) {
            Plan::Fail(m) => assert!(WorkloadConfig::default().failure_messages.contains(&m)),
            Plan::Sleep(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_run_sleeps_for_delay() {
        let task = task(vec![40], 0.0);
        let started = tokio::time::Instant::now();
        let elapsed = task.run().await.unwrap();
        assert_eq!(elapsed, 40);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_run_failure() {
        let task = HeavyTask::new(WorkloadConfig {
            delays_ms: vec![10],
            failure_rate: 1.0,
            failure_messages: vec!["DB Server is Down".into()],
        });
        assert_eq!(
            task.run().await.unwrap_err(),
            WorkloadError("DB Server is Down".into())
        );
    }
}
