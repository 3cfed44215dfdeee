use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "sentinel-cli")]
#[command(about = "Query job health from a running job-sentinel", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate health of all jobs
    Status,
    /// Health of a single job
    Job {
        /// Job name as registered
        name: String,
    },
    /// List every registered job
    Jobs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let path = match &cli.command {
        Commands::Status => "/health".to_string(),
        Commands::Job { name } => format!("/health/jobs/{}", name),
        Commands::Jobs => "/jobs".to_string(),
    };

    let res = client.get(format!("{}{}", cli.url, path)).send().await?;
    print_response(res).await
}

/// Health endpoints answer 503 with a JSON body when degraded, so the body
/// is printed for any status that carries JSON.
async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => {
            eprintln!("Error: health endpoint returned status {}", status);
            eprintln!("Response: {}", text);
            return Ok(());
        }
    }

    if !status.is_success() {
        eprintln!("Status: {}", status);
        std::process::exit(1);
    }
    Ok(())
}
