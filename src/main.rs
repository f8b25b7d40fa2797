use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ski_results_client::{
    default_export_path, render_page, write_analysis_csv, write_results_csv, Config, OutputOptions,
    Page, PageData, SearchQuery, TerminalSink, BASE_URL_ENV, DEFAULT_BASE_URL,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ski racing results client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Server hosting the results API
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Give up on a request after this many seconds (0 or unset waits forever)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Show hours instead of wrapping race times at 60 minutes
    #[arg(long, global = true)]
    long_times: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search athletes by fiscode and/or name
    Search(SearchArgs),
    /// Show an athlete and their qualification races
    Athlete(AthleteArgs),
    /// Show a race and its results
    Race(RaceArgs),
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[arg(long)]
    fiscode: Option<String>,
    #[arg(long)]
    firstname: Option<String>,
    #[arg(long)]
    lastname: Option<String>,
}

#[derive(Args, Debug)]
struct AthleteArgs {
    fiscode: String,
    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Args, Debug)]
struct RaceArgs {
    raceid: String,
    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Also write the fetched rows to CSV
    #[arg(long)]
    csv: bool,

    /// CSV path (defaults to a timestamped file in the current directory)
    #[arg(short, long, requires = "csv")]
    output: Option<PathBuf>,

    /// Only export rows ranked this or better
    #[arg(long)]
    top: Option<u32>,
}

impl ExportArgs {
    fn path(&self, prefix: &str) -> PathBuf {
        self.output.clone().unwrap_or_else(|| default_export_path(prefix))
    }

    fn options(&self) -> OutputOptions {
        OutputOptions { top_n: self.top }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::new(&cli.base_url, cli.timeout_secs, cli.long_times)?;
    let client = config.http_client()?;
    info!(base_url = %config.base_url, "using results server");

    let (page, export) = match cli.command {
        Command::Search(args) => {
            let query = SearchQuery::new(
                args.fiscode.as_deref(),
                args.firstname.as_deref(),
                args.lastname.as_deref(),
            );
            (Page::Search(query), None)
        }
        Command::Athlete(args) => (Page::Athlete { fiscode: args.fiscode }, Some(args.export)),
        Command::Race(args) => (Page::Race { raceid: args.raceid }, Some(args.export)),
    };

    let mut sink = TerminalSink;
    let data = render_page(&client, &page, config.page_options(), &mut sink).await?;

    let Some(export) = export.filter(|e| e.csv) else {
        return Ok(());
    };

    match (&page, data) {
        (Page::Athlete { fiscode }, PageData::Athlete(_, Some(analysis))) => {
            let path = export.path(&format!("athlete_{}", fiscode));
            write_analysis_csv(&path, &analysis.races, &export.options())?;
            println!("Analysis written to {}", path.display());
        }
        (Page::Race { raceid }, PageData::Race(_, Some(results))) => {
            let path = export.path(&format!("race_{}", raceid));
            write_results_csv(&path, raceid, &results, &export.options())?;
            println!("Results written to {}", path.display());
        }
        _ => eprintln!("Nothing to export"),
    }

    Ok(())
}
