use std::{
    future::Future,
    time::{Duration, Instant},
};

use futures_util::future::join_all;
use tokio::time::sleep;
use tracing::debug;

use crate::models::{
    broadcast::{DeliveryRecord, DispatchOutcome, Payload},
    dispatch::DispatchConfig,
    recipient::RecipientId,
};

/// Delivers a payload to one recipient.
///
/// Implementations report failure through [`DispatchOutcome::Failed`] instead of
/// an error so a batch can be joined without short-circuiting.
pub trait DeliveryChannel: Sync {
    fn deliver(
        &self,
        recipient: RecipientId,
        payload: &Payload,
    ) -> impl Future<Output = DispatchOutcome> + Send;
}

#[derive(Debug, Clone)]
pub struct DispatchRun {
    /// One record per recipient, in dispatch order.
    pub records: Vec<DeliveryRecord>,
    pub batches: usize,
    pub elapsed: Duration,
}

impl DispatchRun {
    pub fn delivered(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.is_delivered())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.delivered()
    }
}

/// Number of batches needed for `total` recipients.
pub fn batch_count(total: usize, batch_size: usize) -> usize {
    total.div_ceil(batch_size.max(1))
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Sends `payload` to every recipient in consecutive batches.
    ///
    /// All deliveries of a batch are in flight together and the batch is fully
    /// settled before the cooldown starts. No cooldown follows the last batch.
    pub async fn dispatch<C: DeliveryChannel>(
        &self,
        channel: &C,
        recipients: &[RecipientId],
        payload: &Payload,
    ) -> DispatchRun {
        let start = Instant::now();
        let total_batches = batch_count(recipients.len(), self.config.batch_size);
        let mut records = Vec::with_capacity(recipients.len());

        for (index, batch) in recipients.chunks(self.config.batch_size.max(1)).enumerate() {
            let outcomes = join_all(
                batch
                    .iter()
                    .map(|recipient| channel.deliver(*recipient, payload)),
            )
            .await;

            let failed = outcomes.iter().filter(|o| !o.is_delivered()).count();
            debug!(
                batch = index + 1,
                total_batches,
                size = batch.len(),
                failed,
                "Batch settled"
            );

            records.extend(
                batch
                    .iter()
                    .zip(outcomes)
                    .map(|(recipient, outcome)| DeliveryRecord {
                        recipient: *recipient,
                        outcome,
                    }),
            );

            if index + 1 < total_batches {
                sleep(self.config.batch_delay).await;
            }
        }

        DispatchRun {
            records,
            batches: total_batches,
            elapsed: start.elapsed(),
        }
    }
}
