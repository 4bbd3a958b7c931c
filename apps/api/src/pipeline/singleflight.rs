//! Fingerprint-keyed single-flight table.
//!
//! The table is the only shared mutable state between requests. A claim is
//! test-and-set under one mutex lock: the first request for a fingerprint
//! becomes the owner and runs the pipeline; concurrent requests with the
//! same fingerprint attach as waiters and receive the owner's outcome over
//! a `watch` channel. The entry is removed when the flight finishes, and a
//! flight whose waiters have all detached observes `Sender::closed()` and
//! stops instead of completing for nobody.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::watch;

use crate::errors::AppError;
use crate::models::result::RenderedOutput;
use crate::pipeline::fingerprint::Fingerprint;

pub type FlightOutcome = Result<RenderedOutput, AppError>;
pub type OutcomeSender = watch::Sender<Option<FlightOutcome>>;
pub type OutcomeReceiver = watch::Receiver<Option<FlightOutcome>>;

/// Result of claiming a fingerprint.
pub enum FlightClaim {
    /// This request claimed the fingerprint and must run the pipeline,
    /// publish the outcome through the sender, and release the entry.
    Owner(OutcomeSender),
    /// Another request already owns this fingerprint; await its outcome.
    Waiter(OutcomeReceiver),
}

#[derive(Default)]
pub struct FlightTable {
    inner: Mutex<HashMap<Fingerprint, OutcomeSender>>,
}

impl FlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic test-and-set: subscribe to an in-flight generation or become
    /// its owner.
    pub fn claim(&self, fingerprint: Fingerprint) -> FlightClaim {
        let mut inner = self.inner.lock().expect("flight table poisoned");
        if let Some(tx) = inner.get(&fingerprint) {
            return FlightClaim::Waiter(tx.subscribe());
        }
        let (tx, _rx) = watch::channel(None);
        inner.insert(fingerprint, tx.clone());
        FlightClaim::Owner(tx)
    }

    /// Releases a fingerprint once its flight reached Done or Failed (or
    /// was abandoned by every waiter).
    pub fn release(&self, fingerprint: &Fingerprint) {
        let mut inner = self.inner.lock().expect("flight table poisoned");
        inner.remove(fingerprint);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.lock().expect("flight table poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use sha2::{Digest, Sha256};

    use crate::models::result::OutputFormat;

    fn fp(tag: &str) -> Fingerprint {
        // Build a fingerprint the same way production does, from a tag.
        let mut hasher = Sha256::new();
        hasher.update(tag.as_bytes());
        Fingerprint::from_hex(hex::encode(hasher.finalize()))
    }

    fn outcome() -> FlightOutcome {
        Ok(RenderedOutput {
            format: OutputFormat::Text,
            payload: Bytes::from_static(b"ok"),
        })
    }

    #[test]
    fn test_first_claim_is_owner_second_is_waiter() {
        let table = FlightTable::new();
        let first = table.claim(fp("a"));
        assert!(matches!(first, FlightClaim::Owner(_)));
        let second = table.claim(fp("a"));
        assert!(matches!(second, FlightClaim::Waiter(_)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_distinct_fingerprints_do_not_share_a_flight() {
        let table = FlightTable::new();
        assert!(matches!(table.claim(fp("a")), FlightClaim::Owner(_)));
        assert!(matches!(table.claim(fp("b")), FlightClaim::Owner(_)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_release_allows_a_fresh_owner() {
        let table = FlightTable::new();
        let key = fp("a");
        assert!(matches!(table.claim(key.clone()), FlightClaim::Owner(_)));
        table.release(&key);
        assert!(matches!(table.claim(key), FlightClaim::Owner(_)));
    }

    #[tokio::test]
    async fn test_waiter_receives_owner_outcome() {
        let table = FlightTable::new();
        let key = fp("a");
        let tx = match table.claim(key.clone()) {
            FlightClaim::Owner(tx) => tx,
            FlightClaim::Waiter(_) => panic!("expected owner"),
        };
        let mut rx = match table.claim(key.clone()) {
            FlightClaim::Waiter(rx) => rx,
            FlightClaim::Owner(_) => panic!("expected waiter"),
        };

        tx.send(Some(outcome())).unwrap();
        table.release(&key);

        let received = rx
            .wait_for(|v| v.is_some())
            .await
            .unwrap()
            .clone()
            .unwrap();
        assert_eq!(received.unwrap().payload, Bytes::from_static(b"ok"));
    }
}
