pub mod api;
mod error;
pub mod response;
pub mod routes;
mod service;

use std::net::SocketAddr;

use tokio::runtime::Runtime;
use tracing::{info, instrument};

pub use api::ServerConfig;
pub use error::ControllerError;
pub use response::{Envelope, TaskOverview};
pub use routes::Route;
pub use service::TaskService;

use crate::datastore::SharedStorage;

/// Running HTTP side of the tracker.
pub struct TaskController {
    addr: SocketAddr,
    _api_runtime: Runtime,
}

impl TaskController {
    #[instrument(skip(storage, cfg))]
    pub fn start(storage: SharedStorage, cfg: ServerConfig) -> anyhow::Result<Self> {
        let service = TaskService::new(storage);
        let (api_runtime, addr) = api::build_runtime(cfg, service)?;
        Ok(Self {
            addr,
            _api_runtime: api_runtime,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn stop(self) -> Result<(), ControllerError> {
        info!("Stopping api...");
        self._api_runtime
            .shutdown_timeout(std::time::Duration::from_millis(100));
        Ok(())
    }
}
