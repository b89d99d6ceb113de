use clap::Parser;
use std::time::Duration;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "ollama-relay")]
#[command(about = "HTTP relay and telemetry collector for Ollama")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // Ollama server, with or without scheme
    // Example: "localhost:11434" or "http://10.0.0.5:11434"
    #[arg(short, long, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    // Model used when a generate request names none
    #[arg(short, long, env = "OLLAMA_MODEL", default_value = "llama3.2")]
    pub model: String,

    // Model queried for every ingested telemetry record
    #[arg(long, env = "TELEMETRY_MODEL", default_value = "llama3.2")]
    pub telemetry_model: String,

    // Generate timeout in seconds (idle timeout while streaming)
    #[arg(long, default_value_t = 60)]
    pub generate_timeout: u64,

    // Model pull timeout in seconds
    #[arg(long, default_value_t = 1800)]
    pub pull_timeout: u64,

    // Model listing timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub tags_timeout: u64,
}

/// Per-endpoint upstream timeouts.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub generate: Duration,
    pub pull: Duration,
    pub tags: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            generate: Duration::from_secs(60),
            pull: Duration::from_secs(1800),
            tags: Duration::from_secs(60),
        }
    }
}

impl Args {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            generate: Duration::from_secs(self.generate_timeout),
            pull: Duration::from_secs(self.pull_timeout),
            tags: Duration::from_secs(self.tags_timeout),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// "localhost:11434 " -> "http://localhost:11434"
pub fn normalize_base_url(raw: &str) -> String {
    let url = raw.trim();
    let full_url = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    };
    full_url.trim_end_matches('/').to_string()
}
