use clap::Parser;
use pomscan::{FsContentSource, extract_all_pom_files};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Extract and resolve Maven dependencies across a multi-module project.
#[derive(Parser)]
#[command(name = "pomscan", version, about)]
struct Cli {
    /// pom.xml paths, relative to the project root
    #[arg(required = true)]
    paths: Vec<String>,

    /// Project root directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> pomscan::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = FsContentSource::new(cli.root);
    let files = extract_all_pom_files(&source, &cli.paths).await;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&files)?
    } else {
        serde_json::to_string(&files)?
    };

    match cli.out {
        Some(path) => tokio::fs::write(path, json).await?,
        None => println!("{json}"),
    }
    Ok(())
}
