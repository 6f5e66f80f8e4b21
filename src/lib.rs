pub mod attachment;
pub mod cli;
pub mod extract;
pub mod llm;
pub mod models;
pub mod server;

use std::error::Error;
use std::sync::Arc;

use log::{ info, warn };

use cli::Args;
use llm::{ GeminiClient, GeminiConfig };
use server::Server;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Base URL: {}", args.chat_base_url);
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("Max Upload Bytes: {}", args.max_upload_bytes);
    info!("-------------------------");

    if args.api_key.trim().is_empty() {
        warn!("GOOGLE_GENERATIVE_AI_API_KEY is not set; chat requests will fail.");
    }

    let gemini = Arc::new(GeminiClient::new(GeminiConfig {
        api_key: args.api_key.clone(),
        model: args.chat_model.clone(),
        base_url: args.chat_base_url.clone(),
    }));

    let server = Server::new(gemini, &args);
    server.run().await
}
