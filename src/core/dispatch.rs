//! Where sunset fetches run.
//!
//! The engine never blocks on the network itself. It submits dates to a
//! [`FetchDispatch`] and drains finished [`FetchOutcome`]s at the start of
//! every tick. [`InlineDispatch`] runs the fetch during `submit` (one-shot
//! commands, tests); [`WorkerDispatch`] hands it to a background thread.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::error::SunsetError;
use crate::sunset::{SunsetFetcher, SunsetRecord};

/// A finished fetch for one date.
#[derive(Debug)]
pub struct FetchOutcome {
    pub date: NaiveDate,
    pub result: Result<SunsetRecord, SunsetError>,
}

pub trait FetchDispatch: Send {
    /// Queue a fetch for `date`.
    fn submit(&mut self, date: NaiveDate);

    /// Outcomes finished since the last call, oldest first.
    fn completed(&mut self) -> Vec<FetchOutcome>;
}

/// Runs every fetch synchronously inside `submit`.
pub struct InlineDispatch<F> {
    fetcher: F,
    finished: VecDeque<FetchOutcome>,
}

impl<F: SunsetFetcher> InlineDispatch<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            finished: VecDeque::new(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

impl<F: SunsetFetcher> FetchDispatch for InlineDispatch<F> {
    fn submit(&mut self, date: NaiveDate) {
        let result = self.fetcher.fetch(date);
        self.finished.push_back(FetchOutcome { date, result });
    }

    fn completed(&mut self) -> Vec<FetchOutcome> {
        self.finished.drain(..).collect()
    }
}

/// Runs fetches on a dedicated thread, one at a time in submission order.
pub struct WorkerDispatch {
    requests: Sender<NaiveDate>,
    outcomes: Receiver<FetchOutcome>,
}

impl WorkerDispatch {
    pub fn spawn<F: SunsetFetcher + 'static>(fetcher: F) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<NaiveDate>();
        let (outcome_tx, outcome_rx) = mpsc::channel();

        thread::Builder::new()
            .name("sunset-fetch".to_string())
            .spawn(move || {
                // Ends when the engine drops its sender
                for date in request_rx {
                    let result = fetcher.fetch(date);
                    if outcome_tx.send(FetchOutcome { date, result }).is_err() {
                        break;
                    }
                }
            })
            .context("Failed to spawn sunset fetch worker")?;

        Ok(Self {
            requests: request_tx,
            outcomes: outcome_rx,
        })
    }
}

impl FetchDispatch for WorkerDispatch {
    fn submit(&mut self, date: NaiveDate) {
        if self.requests.send(date).is_err() {
            log_error!("Sunset fetch worker has stopped; request for {date} dropped");
        }
    }

    fn completed(&mut self) -> Vec<FetchOutcome> {
        self.outcomes.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sunset::fetcher::MockSunsetFetcher;
    use std::time::{Duration, Instant};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_inline_dispatch_completes_immediately() {
        let mut fetcher = MockSunsetFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|date| SunsetRecord::parse(&format!("{date}T18:42:00+03:00")).map_err(SunsetError::Lookup));

        let mut dispatch = InlineDispatch::new(fetcher);
        dispatch.submit(day(15));
        dispatch.submit(day(16));

        let outcomes = dispatch.completed();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].date, day(15));
        assert_eq!(
            outcomes[1].result.as_ref().unwrap().to_string(),
            "2024-03-16T18:42:00+03:00"
        );
        assert!(dispatch.completed().is_empty());
    }

    #[test]
    fn test_worker_dispatch_returns_outcomes() {
        let mut fetcher = MockSunsetFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Err(SunsetError::Lookup(anyhow::anyhow!("offline"))));

        let mut dispatch = WorkerDispatch::spawn(fetcher).unwrap();
        dispatch.submit(day(15));

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outcomes = Vec::new();
        while outcomes.is_empty() && Instant::now() < deadline {
            outcomes = dispatch.completed();
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].date, day(15));
        assert!(outcomes[0].result.is_err());
    }
}
