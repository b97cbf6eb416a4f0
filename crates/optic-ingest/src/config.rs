use std::net::SocketAddr;

/// Ingest service configuration, fixed at startup.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    bind_addr: SocketAddr,
    namespace: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9460".parse().unwrap(),
            namespace: "frames".to_string(),
        }
    }
}

impl IngestConfig {
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Key prefix for stored frames, e.g. `frames/1714000000123.jpg`.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}
