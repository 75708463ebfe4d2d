use clap::Parser;
use interlink_finder::{Finder, input, write_csv};
use std::fs::File;
use std::io;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut finder = Finder::new();
    if let Some(path) = &args.config {
        finder = finder.with_config_file(path)?;
    }
    if let Some(concurrency) = args.concurrency {
        finder = finder.with_concurrency(concurrency);
    }
    if let Some(threshold) = args.threshold {
        finder = finder.with_exclusion_threshold(threshold);
    }
    if let Some(timeout) = args.timeout {
        finder = finder.with_fetch_timeout(timeout);
    }
    if let Some(webdriver_url) = &args.webdriver {
        finder = finder.with_webdriver(webdriver_url);
    }

    let mut sources = args.urls.clone();
    if let Some(path) = &args.sources {
        sources.extend(input::load_source_urls(path)?);
    }

    let mut pairs = args.manual_pairs()?;
    if let Some(path) = &args.pairs {
        pairs.extend(input::load_keyword_pairs(path)?);
    }

    ::log::info!(
        "Starting search of {} URLs for {} keywords with concurrency {}",
        sources.len(),
        pairs.len(),
        finder.config().concurrency
    );

    let report = match finder.run(sources.as_slice(), pairs).await {
        Ok(report) => report,
        Err(e) => {
            ::log::error!("Search failed: {}", e);
            return Err(e.into());
        }
    };

    match &args.output {
        Some(path) => write_csv(File::create(path)?, &report.results)?,
        None => write_csv(io::stdout().lock(), &report.results)?,
    }

    let summary = &report.summary;
    ::log::info!(
        "Found {} opportunities across {} URLs",
        summary.opportunities,
        report.matched_urls()
    );
    ::log::info!(
        "Evaluated {} of {} sources ({} invalid, {} skipped, {} failed) in {:.2} seconds",
        summary.pages_evaluated,
        summary.sources_total,
        summary.sources_invalid,
        summary.sources_skipped,
        summary.pages_failed,
        summary.elapsed.as_secs_f64()
    );

    Ok(())
}
