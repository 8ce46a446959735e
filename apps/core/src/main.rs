// Outbreak Intelligence CLI
// Routes a free-text request and prints the decision

use anyhow::Context;
use clap::Parser;
use outbreak_intel_core::{Router, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "outbreak_intel_core=info";

#[derive(Parser, Debug)]
#[command(name = "outbreak-intel")]
#[command(about = "Route an outbreak intelligence request to the agent that should handle it")]
#[command(version)]
struct Cli {
    /// Request text, e.g. "What is the outbreak status in Travis County?"
    #[arg(required = true, num_args = 1..)]
    text: Vec<String>,

    /// Location to assume when the text names none
    #[arg(short, long)]
    location: Option<String>,

    /// Print a one-paragraph explanation after the JSON decision
    #[arg(short, long)]
    explain: bool,

    /// Emit logs as JSON
    #[arg(long, env = "OUTBREAK_JSON_LOGS")]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let settings = Settings::from_env().context("Failed to load settings")?;
    let router = Router::with_settings(&settings).context("Failed to build router")?;

    let text = cli.text.join(" ");
    info!("Routing request ({} chars)", text.chars().count());
    let decision = router.route_request(&text, cli.location.as_deref());

    println!("{}", serde_json::to_string_pretty(&decision)?);
    if cli.explain {
        println!("\n{}", Router::explain(&decision));
    }
    Ok(())
}
