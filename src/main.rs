mod cache;
mod fetch;
mod parser;
mod pipeline;
mod record;
mod settings;
mod table;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use cache::TtlCache;
use record::PartnerRecord;
use settings::Settings;

#[derive(Parser)]
#[command(name = "livelo_rates", about = "Livelo partner earn-rate tracker")]
struct Cli {
    /// Override the static USD → BRL exchange rate
    #[arg(long, global = true)]
    exchange_rate: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the partner listing and rate every partner for today
    Scrape {
        /// Append the extracted rows to this history file
        #[arg(short, long)]
        append: Option<PathBuf>,
        /// Observation day to stamp on the rows (default: today)
        #[arg(long)]
        day: Option<NaiveDate>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Rate a history export and label the latest day's trend
    Process {
        /// History CSV (name, points, currency, amount, day by position)
        #[arg(long)]
        history: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Scrape, append to history, then process the whole history
    Run {
        #[arg(long)]
        history: PathBuf,
        #[arg(long)]
        day: Option<NaiveDate>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Re-print the listing periodically, refetching only when the cache expires
    Watch {
        /// Seconds between prints
        #[arg(short, long, default_value = "60")]
        interval: u64,
        /// Cache lifetime in seconds (default: from settings)
        #[arg(long)]
        ttl: Option<u64>,
    },
}

#[derive(Args)]
struct OutputArgs {
    #[arg(short, long, value_enum, default_value = "table")]
    format: Format,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(rate) = cli.exchange_rate {
        settings.exchange_rate = rate;
    }

    let result = match cli.command {
        Commands::Scrape { append, day, output } => {
            let records = scrape(&settings, day).await?;
            if let Some(path) = append {
                table::append_history(&path, &records)?;
                info!("Appended {} rows to {}", records.len(), path.display());
            }
            emit(&records, &output)
        }
        Commands::Process { history, output } => {
            let records = process(&settings, &history)?;
            emit(&records, &output)
        }
        Commands::Run { history, day, output } => {
            let scraped = scrape(&settings, day).await?;
            table::append_history(&history, &scraped)?;
            info!("Appended {} rows to {}", scraped.len(), history.display());
            let records = process(&settings, &history)?;
            emit(&records, &output)
        }
        Commands::Watch { interval, ttl } => {
            let ttl = Duration::from_secs(ttl.unwrap_or(settings.cache_ttl_secs));
            watch(&settings, Duration::from_secs(interval.max(1)), ttl).await
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn scrape(settings: &Settings, day: Option<NaiveDate>) -> Result<Vec<PartnerRecord>> {
    let html = fetch::fetch_listing(settings).await?;
    let day = day.unwrap_or_else(|| chrono::Local::now().date_naive());
    Ok(parser::process_document(&html, day, &settings.exchange_table()))
}

fn process(settings: &Settings, history: &Path) -> Result<Vec<PartnerRecord>> {
    let records = table::load_history(history, &settings.exchange_table())?;
    info!("Loaded {} history rows from {}", records.len(), history.display());
    Ok(pipeline::annotate_history(records))
}

fn emit(records: &[PartnerRecord], output: &OutputArgs) -> Result<()> {
    let mut out: Box<dyn Write> = match &output.out {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    match output.format {
        Format::Table => writeln!(out, "{}", table::render_overview(records))?,
        Format::Csv => table::write_csv(&mut out, records)?,
        Format::Json => {
            table::write_json(&mut out, records)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

async fn watch(settings: &Settings, interval: Duration, ttl: Duration) -> Result<()> {
    let mut cache: TtlCache<Vec<PartnerRecord>> = TtlCache::new(ttl);
    let mut ticker = tokio::time::interval(interval);
    info!(
        "Watching every {}s (cache ttl {}s); Ctrl-C to stop",
        interval.as_secs(),
        cache.ttl().as_secs()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }

        let records = match cache.get() {
            Some(records) => records.clone(),
            None => {
                let fresh = scrape(settings, None).await?;
                cache.insert(fresh.clone());
                fresh
            }
        };
        if records.is_empty() {
            warn!("Listing had no partner cards; not keeping it cached");
            cache.invalidate();
        }
        println!("{}\n", table::render_overview(&records));
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
