use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Download every file listed in a URL list", long_about = None)]
pub struct Cli {
    /// File with one URL per line
    #[arg(short, long, default_value = "cadurls.md")]
    pub input: PathBuf,

    /// Output directory for downloaded files
    #[arg(short, long, default_value = "downloads")]
    pub output: PathBuf,

    /// Number of concurrent downloads
    #[arg(short, long, default_value = "10")]
    pub workers: usize,

    /// Per-request timeout in seconds
    #[arg(short, long, default_value = "30")]
    pub timeout: u64,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
