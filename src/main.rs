use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

mod cli;
use crate::cli::Args;

mod error;
use crate::error::ListResult;

mod expiry;

mod helper;
use crate::helper::options;

mod yahoo;
use crate::yahoo::YahooClient;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Ctrl-C ends the run right away, nothing half-rendered
    if let Err(e) = ctrlc::set_handler(|| std::process::exit(1)) {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "list_options=debug,warn" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> ListResult<()> {
    // time the entire program
    let start = Instant::now();

    let settings = args.settings()?;
    let client = YahooClient::new()?;

    // fetch everything before printing anything
    let report = options::build_report(&client, &settings)?;

    let dates: Vec<String> = report.expirations.iter().map(|d| d.to_string()).collect();
    println!("Expiration date: {}", dates.join(", "));
    println!("{}", options::render_table("Calls Options", &report.calls));
    println!("{}", options::render_table("Puts Options", &report.puts));

    tracing::debug!(elapsed = ?start.elapsed(), sort = %settings.sort_key, "report printed");
    Ok(())
}
