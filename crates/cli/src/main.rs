use clap::{Parser, Subcommand};

mod commands;

use commands::{CheckConfigArgs, RunArgs, ScanArgs};

#[derive(Parser)]
#[command(name = "crypto-signal")]
#[command(about = "EMA bounce signal scanner for crypto spot pairs", long_about = None)]
struct Cli {
    /// Optional log file path (logs to file instead of stderr)
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan on a fixed interval and send signals to Telegram until Ctrl+C
    Run(RunArgs),
    /// Run a single scan pass and print the results
    Scan(ScanArgs),
    /// Validate configuration and print it with secrets masked
    CheckConfig(CheckConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file.as_deref())?;

    match cli.command {
        Commands::Run(args) => commands::run_bot(args).await?,
        Commands::Scan(args) => commands::run_scan(args).await?,
        Commands::CheckConfig(args) => commands::run_check_config(&args)?,
    }

    Ok(())
}

fn init_logging(log_file: Option<&str>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}
