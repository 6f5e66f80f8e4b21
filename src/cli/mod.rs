use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// API key for the hosted generative-model service.
    #[arg(long, env = "GOOGLE_GENERATIVE_AI_API_KEY", default_value = "")]
    pub api_key: String,

    /// Model identifier used for chat completion.
    #[arg(long, env = "CHAT_MODEL", default_value = "gemini-2.0-flash")]
    pub chat_model: String,

    /// Base URL for the generative-model API.
    #[arg(
        long,
        env = "CHAT_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub chat_base_url: String,

    /// Upper bound in seconds on how long a single request may run.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Maximum accepted upload size in bytes.
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "10485760")]
    pub max_upload_bytes: usize,
}
