use crate::tools::{CatalogTools, CatalogToolsConfig};
use anyhow::Result;
use rmcp::transport::sse_server::SseServer;
use std::net::SocketAddr;

pub struct SseServerApp {
    bind_addr: SocketAddr,
    config: CatalogToolsConfig,
}

impl SseServerApp {
    pub fn new(bind_addr: SocketAddr, config: CatalogToolsConfig) -> Self {
        Self { bind_addr, config }
    }

    /// Starts the SSE server and serves CatalogTools over Server-Sent Events.
    ///
    /// Every session gets a clone of one initialized [`CatalogTools`], so the
    /// classifier and the language cache are shared. Runs until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns an error if the tools cannot be initialized or the server fails
    /// to bind to the specified address.
    pub async fn serve(self) -> Result<()> {
        tracing::info!("Initializing catalog tools before starting SSE server...");
        let tools = CatalogTools::new(self.config)?;
        tools.initialize().await?;

        let sse_server = SseServer::serve(self.bind_addr).await?;
        tracing::info!("SSE server listening on {}", self.bind_addr);
        let cancellation_token = sse_server.with_service(move || tools.clone());

        // Wait for Ctrl+C signal to gracefully shutdown
        tokio::signal::ctrl_c().await?;

        cancellation_token.cancel();

        Ok(())
    }
}
