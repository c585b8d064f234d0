use std::{io, sync::Arc};

use bytes::Bytes;
use comms::GradientBatch;
use log::{debug, error};
use tokio::task;

use super::{ServiceConfig, ShutdownSignal};
use crate::{
    model::Model,
    storage::{Escalation, ParameterStore, UpdateError},
    synchronization::RwLock,
};

const PAYLOAD_SLACK: usize = 4;
const MIN_PAYLOAD_LIMIT: usize = 64 * 1024;

/// Everything a request handler needs, built once per service and shared by every request.
///
/// It bridges the async request handlers with the blocking `ParameterStore` and
/// reader-writer lock. The lock guard is always scoped to a single call, so it's
/// released on every way out of it.
pub struct ServiceContext<M: Model> {
    store: ParameterStore<M>,
    lock: Option<RwLock>,
    shutdown_on_fatal: bool,
    signal: Arc<ShutdownSignal>,
}

impl<M: Model> ServiceContext<M> {
    /// Creates a new `ServiceContext`.
    ///
    /// # Arguments
    /// * `store` - The parameter store to serve.
    /// * `config` - Whether to lock and how to react to an exhausted budget.
    /// * `signal` - The shutdown signal of the owning service.
    ///
    /// # Returns
    /// A new `ServiceContext` instance.
    pub fn new(store: ParameterStore<M>, config: &ServiceConfig, signal: Arc<ShutdownSignal>) -> Self {
        Self {
            store,
            lock: config.acquire_lock.then(RwLock::new),
            shutdown_on_fatal: config.shutdown_on_fatal,
            signal,
        }
    }

    pub fn store(&self) -> &ParameterStore<M> {
        &self.store
    }

    /// The reader-writer lock, `None` when locking is disabled.
    pub fn lock(&self) -> Option<&RwLock> {
        self.lock.as_ref()
    }

    /// The largest update payload worth reading.
    ///
    /// An encoded `GradientBatch` has the same layout as the encoded snapshot, so
    /// anything a few times larger can't be a valid update.
    pub fn max_payload_len(&self) -> usize {
        // kind and count headers, then rank, dims and values of every tensor
        let encoded = self
            .store
            .read()
            .iter()
            .map(|t| 4 + 8 * t.shape().len() + 4 * t.len())
            .fold(8, usize::saturating_add);

        encoded.saturating_mul(PAYLOAD_SLACK).max(MIN_PAYLOAD_LIMIT)
    }

    /// Reads the current snapshot under a read lock and encodes it.
    ///
    /// # Returns
    /// The encoded `ParameterSnapshot` or an `io::Error` if it can't be encoded.
    pub fn read_snapshot(&self) -> io::Result<Bytes> {
        let snapshot = {
            let _guard = self.lock.as_ref().map(RwLock::read);
            self.store.read()
        };

        comms::encode(&*snapshot)
    }

    /// Decodes `payload` and applies it to the store under a write lock.
    ///
    /// # Arguments
    /// * `payload` - An encoded `GradientBatch`.
    ///
    /// # Returns
    /// An `UpdateError` if the update wasn't applied, a payload that can't be decoded
    /// is charged to the error budget like any other failed update.
    pub fn apply_update(&self, payload: &[u8]) -> Result<(), UpdateError> {
        let _guard = self.lock.as_ref().map(RwLock::write);

        let grads = comms::decode::<GradientBatch>(payload)
            .map_err(|err| self.store.escalate(err.into()))?;

        self.store.apply(grads)
    }

    /// Async call to `Self::read_snapshot`.
    pub async fn fetch(&self) -> io::Result<Bytes> {
        task::block_in_place(|| self.read_snapshot())
    }

    /// Async call to `Self::apply_update`.
    ///
    /// A fatal failure trips the shutdown signal before being returned, the service
    /// stops if it was configured to do so.
    pub async fn update(&self, payload: &[u8]) -> Result<(), UpdateError> {
        let res = task::block_in_place(|| self.apply_update(payload));

        match &res {
            Ok(()) => debug!(bytes = payload.len(); "update applied"),
            Err(err) if err.escalation() == Escalation::Fatal => {
                error!(
                    failures = self.store.budget().failures();
                    "{err}, the parameter server needs to be restarted"
                );
                self.signal.trip(self.shutdown_on_fatal);
            }
            Err(_) => {}
        }

        res
    }
}
