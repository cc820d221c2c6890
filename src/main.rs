use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tourfeed::classify::Classifier;
use tourfeed::cli::{Cli, Commands};
use tourfeed::config::{validate_source_url, Config};
use tourfeed::errors::{TourfeedError, TourfeedResult};
use tourfeed::filter::TopicFilter;
use tourfeed::services::{CurationService, PublishService};
use tourfeed::sources::{HttpFetcher, SourceList};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> TourfeedResult<()> {
    // .env first so TOURFEED_CONFIG can come from it
    Config::load_dotenv();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config.log_level);

    match cli.command.unwrap_or(Commands::Run {
        output: None,
        dry_run: false,
    }) {
        Commands::Run { output, dry_run } => cmd_run(&config, output, dry_run),
        Commands::List { opml } => cmd_list(&config, opml),
        Commands::Inspect { url, json } => cmd_inspect(&config, &url, json),
    }
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout is reserved for command output (and the XML in dry-run mode)
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn curation_service(config: &Config) -> TourfeedResult<CurationService<HttpFetcher>> {
    Ok(CurationService::new(
        HttpFetcher::new(&config.fetch)?,
        Classifier::new()?,
        TopicFilter::from_config(&config.filter),
        config.fetch.concurrency,
    ))
}

fn cmd_run(config: &Config, output: Option<String>, dry_run: bool) -> TourfeedResult<()> {
    let started_at = Utc::now();
    let sources = SourceList::from_config(config)?;
    let service = curation_service(config)?;

    info!(sources = sources.len(), "fetching sources");

    let (feed, report) =
        service.build_feed(config.feed_info(), &sources, started_at, config.feed.max_items)?;
    let publisher = PublishService::default();

    if dry_run {
        let xml = publisher.render_checked(&feed)?;
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", xml)?;
        stdout.flush()?;
        return Ok(());
    }

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| config.feed.output.clone());
    publisher.publish(&feed, &path)?;

    println!(
        "Wrote {} items to {} ({} of {} sources succeeded)\n",
        feed.items.len(),
        path.display(),
        report.succeeded,
        sources.len()
    );

    if !report.failures.is_empty() {
        println!("Skipped {} sources:", report.failures.len());
        for (url, error) in &report.failures {
            println!("  ! {}: {}", url, error);
        }
        println!();
    }

    if !report.rejected.is_empty() {
        println!("Filtered {} pages:", report.rejected.len());
        for (url, reason) in &report.rejected {
            println!("  - {}: {}", url, reason);
        }
        println!();
    }

    Ok(())
}

fn cmd_list(config: &Config, opml: bool) -> TourfeedResult<()> {
    let sources = SourceList::from_config(config)?;

    if opml {
        println!("{}", sources.to_opml(&config.feed.title)?);
        return Ok(());
    }

    if sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }

    println!("Configured sources:\n");
    for source in sources.iter() {
        let category = source
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "auto".to_string());
        println!("  {} [{}]", source.url, category);
    }

    Ok(())
}

fn cmd_inspect(config: &Config, url: &str, json: bool) -> TourfeedResult<()> {
    validate_source_url(url)?;
    let service = curation_service(config)?;
    let inspection = service.inspect(url)?;

    if json {
        let rendered = serde_json::to_string_pretty(&inspection)
            .map_err(|e| TourfeedError::Render(e.to_string()))?;
        println!("{}", rendered);
        return Ok(());
    }

    let meta = &inspection.metadata;
    println!("{}", inspection.url);
    println!("  Title: {}", meta.title);
    if let Some(description) = &meta.description {
        println!("  Description: {}", description);
    }
    if let Some(image) = &meta.image_url {
        println!("  Image: {}", image);
    }
    if let Some(canonical) = &meta.canonical_url {
        println!("  Canonical: {}", canonical);
    }
    if let Some(published) = &meta.published_at {
        println!("  Published: {}", published.to_rfc3339());
    }
    match inspection.category {
        Some(category) => println!("  Category: {}", category),
        None => println!("  Category: (none)"),
    }
    match &inspection.rejected {
        Some(reason) => println!("  Verdict: rejected ({})", reason),
        None => println!("  Verdict: included"),
    }

    Ok(())
}
