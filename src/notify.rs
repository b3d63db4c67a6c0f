//! Broadcast hub announcing committed summary changes.
//!
//! One hub, any number of subscribers. Delivery is fire-and-forget and
//! at-most-once: a slow or absent subscriber never blocks or fails a billing
//! mutation that already committed, so publish errors are logged and
//! dropped. Snapshots are serializable for whatever transport wraps the hub.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::entities::rcc;

/// Snapshot of a summary's state after a committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryUpdate {
    /// Id of the summary that changed
    pub rcc_id: i32,
    /// Account the summary belongs to
    pub account: i32,
    /// Billing period marker
    pub rcc_date: String,
    /// Equipment total after the mutation
    pub equipment_total: Decimal,
    /// Service total after the mutation
    pub service_total: Decimal,
    /// Company total after the mutation
    pub company_total: Decimal,
}

impl From<&rcc::Model> for SummaryUpdate {
    fn from(summary: &rcc::Model) -> Self {
        Self {
            rcc_id: summary.id,
            account: summary.account,
            rcc_date: summary.rcc_date.clone(),
            equipment_total: summary.equipment_total,
            service_total: summary.service_total,
            company_total: summary.company_total,
        }
    }
}

/// Handle to the summary broadcast channel.
///
/// Cloning shares the same underlying channel, so the engine and any
/// subscriber-facing layer can each hold a handle.
#[derive(Clone)]
pub struct SummaryHub {
    sender: broadcast::Sender<SummaryUpdate>,
}

impl SummaryHub {
    /// Creates a hub whose channel buffers up to `capacity` undelivered
    /// updates per subscriber before the oldest are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Registers a new subscriber. Updates published before this call are
    /// not replayed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SummaryUpdate> {
        self.sender.subscribe()
    }

    /// Publishes a snapshot to all current subscribers, best effort.
    pub fn publish(&self, update: SummaryUpdate) {
        let rcc_id = update.rcc_id;
        match self.sender.send(update) {
            Ok(subscribers) => {
                debug!(rcc_id, subscribers, "published summary update");
            }
            Err(_) => {
                debug!(rcc_id, "no subscribers for summary update, dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn sample_update(rcc_id: i32) -> SummaryUpdate {
        SummaryUpdate {
            rcc_id,
            account: 42,
            rcc_date: "2022-04".to_string(),
            equipment_total: Decimal::from(150),
            service_total: Decimal::from(30),
            company_total: Decimal::ZERO,
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let hub = SummaryHub::new(8);
        // Must not panic or error; the mutation already committed
        hub.publish(sample_update(1));
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_update() {
        let hub = SummaryHub::new(8);
        let mut receiver = hub.subscribe();

        hub.publish(sample_update(7));

        let update = receiver.recv().await.unwrap();
        assert_eq!(update.rcc_id, 7);
        assert_eq!(update.equipment_total, Decimal::from(150));
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_every_update() {
        let hub = SummaryHub::new(8);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        hub.publish(sample_update(1));
        hub.publish(sample_update(2));

        assert_eq!(first.recv().await.unwrap().rcc_id, 1);
        assert_eq!(first.recv().await.unwrap().rcc_id, 2);
        assert_eq!(second.recv().await.unwrap().rcc_id, 1);
        assert_eq!(second.recv().await.unwrap().rcc_id, 2);
    }
}
