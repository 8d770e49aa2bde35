use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ft_cli")]
#[command(about = "FolderText: OCR remote image folders and search their text")]
pub struct Cli {
    /// JSON config file (falls back to FT_CONFIG).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Remote store uri, e.g. `file:///srv/scans` or `s3://bucket/prefix`.
    #[arg(long, global = true)]
    pub remote: Option<String>,
    #[arg(long, global = true)]
    pub staging_root: Option<String>,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Recognize every image in a remote folder and publish its text record.
    #[command(name = "r", alias = "ingest")]
    R { folder_name: String },
    /// List folders whose recognized text contains the query.
    #[command(name = "s", alias = "search")]
    S {
        #[arg(allow_hyphen_values = true)]
        query: String,
        /// Fail on unreadable records instead of skipping them.
        #[arg(long)]
        strict: bool,
    },
}
