use std::{
    io,
    net::{Ipv4Addr, SocketAddr, TcpListener},
    sync::Arc,
    thread::{self, JoinHandle},
};

use axum::Router;
use log::{error, info};
use tokio::runtime;

use super::{ServiceConfig, ServiceContext, ShutdownSignal, address, handlers};
use crate::{model::Model, storage::ParameterStore};

/// A running parameter server.
///
/// The request handlers run on a dedicated thread with their own runtime, so a
/// failing service never takes down the caller's own executor. Dropping the service
/// stops it.
pub struct ParameterService {
    local_addr: SocketAddr,
    master_addr: SocketAddr,
    signal: Arc<ShutdownSignal>,
    thread: Option<JoinHandle<io::Result<()>>>,
}

impl ParameterService {
    /// Starts serving `store`.
    ///
    /// The listener is bound before returning, so the service accepts connections as
    /// soon as this call succeeds.
    ///
    /// # Arguments
    /// * `config` - The runtime settings of the service.
    /// * `store` - The parameter store to serve.
    ///
    /// # Returns
    /// The running service or an `io::Error` if the port couldn't be bound.
    pub fn start<M: Model + 'static>(
        config: &ServiceConfig,
        store: ParameterStore<M>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, config.port))?;
        listener.set_nonblocking(true)?;

        let local_addr = listener.local_addr()?;
        let master_addr = address::determine_master(local_addr.port());

        let signal = Arc::new(ShutdownSignal::default());
        let ctx = ServiceContext::new(store, config, Arc::clone(&signal));
        let app = handlers::router(Arc::new(ctx));

        let thread = thread::Builder::new().name("parameter-service".into()).spawn({
            let signal = Arc::clone(&signal);
            move || serve(listener, app, signal)
        })?;

        info!(
            local_addr:% = local_addr,
            master_addr:% = master_addr,
            acquire_lock = config.acquire_lock;
            "parameter server listening"
        );

        Ok(Self {
            local_addr,
            master_addr,
            signal,
            thread: Some(thread),
        })
    }

    /// The address the service is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The address workers should use to reach the service.
    pub fn master_addr(&self) -> SocketAddr {
        self.master_addr
    }

    /// Whether the error budget of the served store was exhausted.
    pub fn budget_exhausted(&self) -> bool {
        self.signal.is_exhausted()
    }

    /// Waits until the service was asked to stop, either through `stop` or because
    /// its error budget was exhausted.
    pub async fn stopped(&self) {
        self.signal.cancelled().await
    }

    /// Stops the service and waits for its thread to exit.
    ///
    /// In-flight requests are abandoned, not drained.
    ///
    /// # Returns
    /// An `io::Error` if the service failed while serving.
    pub fn stop(mut self) -> io::Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> io::Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        info!(local_addr:% = self.local_addr; "stopping the parameter server");
        self.signal.cancel();

        thread
            .join()
            .map_err(|_| io::Error::other("the parameter server thread panicked"))?
    }
}

impl Drop for ParameterService {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("failed to stop the parameter server: {e}");
        }
    }
}

/// Runs `app` on `listener` until `signal` is cancelled.
///
/// The runtime is dropped on return, which abandons every request still in flight.
fn serve(listener: TcpListener, app: Router, signal: Arc<ShutdownSignal>) -> io::Result<()> {
    let rt = runtime::Builder::new_multi_thread()
        .thread_name("parameter-service-worker")
        .enable_all()
        .build()?;

    rt.block_on(async {
        let listener = tokio::net::TcpListener::from_std(listener)?;

        tokio::select! {
            res = axum::serve(listener, app).into_future() => res?,
            _ = signal.cancelled() => {}
        }

        // The serve loop may also end on its own, every waiter must still be woken up.
        signal.cancel();
        Ok::<_, io::Error>(())
    })
}
