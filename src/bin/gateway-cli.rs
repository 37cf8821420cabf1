use axum::http::Method;
use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use media_gateway::routing::{BackendVariant, RouteClassifier};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the media gateway", long_about = None)]
struct Cli {
    /// Admin API base URL
    #[arg(short, long, default_value = "http://127.0.0.1:9001")]
    url: String,

    /// Admin API key
    #[arg(short, long, default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// Inspect the image/subtitle cache
    Cache,
    /// Classify a request path offline
    Classify {
        /// emby, jellyfin or fntv
        #[arg(short, long, default_value = "emby")]
        backend: BackendVariant,

        #[arg(short, long, default_value = "GET")]
        method: String,

        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let endpoint = match cli.command {
        Commands::Classify {
            backend,
            method,
            path,
        } => {
            let classifier = RouteClassifier::new(backend)?;
            let method: Method = method.to_ascii_uppercase().parse()?;
            println!("{}", classifier.classify(&method, &path));
            return Ok(());
        }
        Commands::Status => "status",
        Commands::Cache => "cache",
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let res = reqwest::Client::new()
        .get(format!("{}/admin/{}", cli.url.trim_end_matches('/'), endpoint))
        .headers(headers)
        .send()
        .await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
