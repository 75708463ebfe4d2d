use clap::Parser;
use interlink_finder::{FinderError, KeywordTarget};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "interlink-finder")]
#[command(about = "Finds unlinked keyword mentions that could become internal links")]
#[command(version)]
pub struct Args {
    /// CSV file with a source_url column
    #[arg(short, long)]
    pub sources: Option<PathBuf>,

    /// Source URL to check (repeatable)
    #[arg(short, long = "url")]
    pub urls: Vec<String>,

    /// CSV file with keyword and target_url columns
    #[arg(short, long)]
    pub pairs: Option<PathBuf>,

    /// Keyword to look for (repeatable, paired with --target in order)
    #[arg(short, long = "keyword")]
    pub keywords: Vec<String>,

    /// Target URL for the keyword at the same position
    #[arg(short, long = "target")]
    pub targets: Vec<String>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of pages evaluated concurrently (1-20)
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// Leading words of each page that are never reported
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Fetch timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Render pages through this WebDriver server instead of plain HTTP
    #[arg(long)]
    pub webdriver: Option<String>,

    /// Write results to this CSV file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Pairs given with --keyword/--target, matched up by position
    pub fn manual_pairs(&self) -> Result<Vec<KeywordTarget>, FinderError> {
        if self.keywords.len() != self.targets.len() {
            ::log::warn!(
                "{} keywords and {} targets given; extra values are ignored",
                self.keywords.len(),
                self.targets.len()
            );
        }
        self.keywords
            .iter()
            .zip(&self.targets)
            .map(|(keyword, target)| KeywordTarget::new(keyword, target))
            .collect()
    }
}
