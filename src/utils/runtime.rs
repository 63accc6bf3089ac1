//! Blocking bridge for the async HTTP clients
//!
//! The turn worker is a plain thread, so each HTTP client owns a small
//! current-thread tokio runtime and drives its requests with `block_on`.

use crate::{MurmurError, Result};
use std::future::Future;
use tokio::runtime::{Builder, Runtime};

pub struct BlockingRuntime {
    runtime: Runtime,
}

impl BlockingRuntime {
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| MurmurError::ConfigError(format!("Failed to create runtime: {}", e)))?;

        Ok(Self { runtime })
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
