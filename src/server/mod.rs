pub mod api;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::net::TcpListener;

use crate::cli::Args;
use crate::llm::GeminiClient;
use api::AppState;

pub struct Server {
    addr: String,
    state: AppState,
    max_upload_bytes: usize,
}

impl Server {
    pub fn new(gemini: Arc<GeminiClient>, args: &Args) -> Self {
        Self {
            addr: args.server_addr.clone(),
            state: AppState {
                gemini,
                request_timeout: Duration::from_secs(args.request_timeout_secs),
            },
            max_upload_bytes: args.max_upload_bytes,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let app = api::router(self.state.clone(), self.max_upload_bytes);
        let listener = TcpListener::bind(&self.addr).await?;
        info!("HTTP API server listening on: http://{}", self.addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
