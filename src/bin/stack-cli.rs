use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "stack-cli")]
#[command(about = "Command-line client for the stack gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Portainer API key, forwarded by the gateway.
    #[arg(short, long, env = "PORTAINER_API_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all stacks
    List,
    /// Show one stack
    Get { id: u64 },
    /// Print a stack's compose file
    File { id: u64 },
    /// Redeploy a stack with its current compose file
    Redeploy {
        id: u64,
        /// Remove services no longer in the compose file
        #[arg(long)]
        prune: bool,
        /// Skip pulling images
        #[arg(long)]
        no_pull: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", HeaderValue::from_str(&cli.key)?);

    let request = match cli.command {
        Commands::List => client.get(format!("{}/stacks", cli.url)),
        Commands::Get { id } => client.get(format!("{}/stacks/{}", cli.url, id)),
        Commands::File { id } => client.get(format!("{}/stacks/{}/file", cli.url, id)),
        Commands::Redeploy { id, prune, no_pull } => client
            .put(format!("{}/stacks/{}", cli.url, id))
            .json(&json!({ "prune": prune, "pullImage": !no_pull })),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
