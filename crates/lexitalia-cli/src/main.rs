mod display;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use lexitalia_core::{CitationStyle, InstrumentType, format_citation, parse_citation, validate_citation};
use lexitalia_crawl::ClientFactory;
use lexitalia_ingest::{IngestConfig, Orchestrator, RunOptions};
use lexitalia_store::{CorpusIndex, Outcome, SeedStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lexitalia",
    version,
    about = "Italian statute ingestion and citation tooling"
)]
struct Cli {
    /// TOML configuration file; flags override its values.
    #[arg(long, global = true, env = "LEXITALIA_CONFIG")]
    config: Option<PathBuf>,

    /// Seed directory (overrides `seeds_dir`).
    #[arg(long, global = true, env = "LEXITALIA_SEEDS_DIR")]
    seeds_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl pending census entries and write seeds.
    Ingest(IngestArgs),
    /// Parse a citation and print it in the requested style.
    Cite(CiteArgs),
    /// Resolve a citation against the seed corpus.
    Validate(ValidateArgs),
    /// Print one seed as a card.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct IngestArgs {
    #[arg(long, env = "LEXITALIA_CENSUS")]
    census: Option<PathBuf>,

    /// Instrument type code, e.g. `dlgs`.
    #[arg(long = "type", value_parser = parse_instrument)]
    instrument: Option<InstrumentType>,

    #[arg(long)]
    year: Option<i32>,

    #[arg(long)]
    id: Option<String>,

    #[arg(long, default_value_t = false)]
    force: bool,

    #[arg(long)]
    limit: Option<usize>,

    #[arg(long)]
    passes: Option<u32>,

    #[arg(long, env = "LEXITALIA_MIN_DELAY_MS")]
    min_delay_ms: Option<u64>,

    #[arg(long, default_value_t = false)]
    include_pre_republic: bool,
}

#[derive(Args, Debug)]
struct CiteArgs {
    text: String,

    #[arg(long, value_enum, default_value_t = Style::Short)]
    style: Style,

    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    text: String,

    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct ShowArgs {
    id: String,

    /// Provisions listed before truncating.
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Style {
    Full,
    Short,
    Pinpoint,
}

impl From<Style> for CitationStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Full => CitationStyle::Full,
            Style::Short => CitationStyle::Short,
            Style::Pinpoint => CitationStyle::Pinpoint,
        }
    }
}

fn parse_instrument(raw: &str) -> Result<InstrumentType, String> {
    InstrumentType::from_code(raw).ok_or_else(|| {
        let known: Vec<&str> = InstrumentType::ALL.iter().map(|t| t.code()).collect();
        format!("unknown instrument type {raw:?} (expected one of {})", known.join(", "))
    })
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => IngestConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => IngestConfig::default(),
    };
    if let Some(dir) = cli.seeds_dir {
        config.seeds_dir = dir;
    }

    match cli.command {
        Command::Ingest(args) => ingest(config, args).await,
        Command::Cite(args) => cite(args),
        Command::Validate(args) => validate(&config, args),
        Command::Show(args) => show(&config, args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn ingest(mut config: IngestConfig, args: IngestArgs) -> Result<()> {
    if let Some(census) = args.census {
        config.census_path = census;
    }
    if let Some(passes) = args.passes {
        config.passes = passes;
    }
    if let Some(ms) = args.min_delay_ms {
        config.min_delay_ms = ms;
    }
    config.include_pre_republic |= args.include_pre_republic;
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        census = %config.census_path.display(),
        seeds = %config.seeds_dir.display(),
        "lexitalia ingest"
    );

    let factory = ClientFactory::new(config.session_config(), config.min_delay())
        .context("building HTTP client")?;
    let orchestrator = Orchestrator::new(factory, config);
    let opts = RunOptions {
        instrument: args.instrument,
        year: args.year,
        id: args.id,
        force: args.force,
        limit: args.limit,
    };
    let report = orchestrator.run(&opts).await.context("ingestion run")?;

    println!(
        "{} acts: {} success, {} partial, {} failed, {} skipped; {} provisions over {} pass(es)",
        report.acts.len(),
        report.count(Outcome::Success),
        report.count(Outcome::Partial),
        report.count(Outcome::Failed),
        report.skipped(),
        report.provisions(),
        report.passes,
    );
    Ok(())
}

fn cite(args: CiteArgs) -> Result<()> {
    let parsed = parse_citation(&args.text);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }
    if !parsed.valid {
        anyhow::bail!(parsed.error.unwrap_or_else(|| "invalid citation".into()));
    }
    println!("{}", format_citation(&parsed, args.style.into()));
    Ok(())
}

fn validate(config: &IngestConfig, args: ValidateArgs) -> Result<()> {
    let store = SeedStore::new(&config.seeds_dir);
    let corpus = CorpusIndex::load(&store)
        .with_context(|| format!("loading seeds from {}", config.seeds_dir.display()))?;
    let result = validate_citation(&parse_citation(&args.text), &corpus);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        display::print_validation(&args.text, &result);
    }
    if !result.valid {
        std::process::exit(2);
    }
    Ok(())
}

fn show(config: &IngestConfig, args: ShowArgs) -> Result<()> {
    let store = SeedStore::new(&config.seeds_dir);
    let seed = store
        .load(&args.id)
        .with_context(|| format!("reading seed {}", args.id))?;
    display::print_seed_card(&seed, args.limit);
    Ok(())
}
