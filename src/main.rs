use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use rssagg::config::Config;
use rssagg::pipeline::Aggregator;

/// Get the config directory path (~/.config/rssagg/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("rssagg"))
}

/// Prints `message` and reads one line from stdin, without the line ending.
fn prompt(message: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", message).context("Failed to write prompt")?;
    stdout.flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;

    let line = line.trim_end_matches(['\r', '\n']).to_string();
    if line.trim().is_empty() {
        anyhow::bail!("No input given");
    }
    Ok(line)
}

#[derive(Parser, Debug)]
#[command(
    name = "rssagg",
    about = "Convert RSS 2.0 feeds listed in an XML feed list into HTML pages"
)]
struct Args {
    /// XML feed list (`<feeds title=".."><feed url=".." file=".." name=".."/></feeds>`);
    /// prompted for when omitted
    #[arg(long, value_name = "FILE")]
    feeds: Option<String>,

    /// Index HTML file to write; prompted for when omitted
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Config file (default: ~/.config/rssagg/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so prompts and results on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => Some(path),
        None => match get_config_dir() {
            Ok(dir) => Some(dir.join("config.toml")),
            Err(e) => {
                tracing::warn!(error = %e, "No config directory, using defaults");
                None
            }
        },
    };
    let config = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let aggregator = Aggregator::new(&config).context("Failed to build HTTP client")?;

    let feeds = match args.feeds {
        Some(feeds) => feeds,
        None => prompt("Enter a name of an XML file containing valid URLs: ")?,
    };

    let list = match aggregator.load_feed_list(&feeds).await {
        Ok(list) => list,
        Err(e) if e.is_contract_violation() => {
            tracing::error!(feeds = %feeds, error = %e, "Rejected feed list");
            println!("Invalid file");
            std::process::exit(1);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load feed list {}", feeds));
        }
    };

    let output = match args.output {
        Some(output) => output,
        None => PathBuf::from(prompt("Enter the name of a file ending in .html: ")?),
    };

    let report = match aggregator.process_feed_list(&list, &output).await {
        Ok(report) => report,
        Err(e) if e.is_contract_violation() => {
            tracing::error!(output = %output.display(), error = %e, "Rejected feed");
            println!("Invalid file");
            std::process::exit(1);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to generate {}", output.display()));
        }
    };

    let items: usize = report.feeds.iter().map(|f| f.items).sum();
    println!(
        "Wrote {} ({} feeds, {} items)",
        report.index.display(),
        report.feeds.len(),
        items
    );
    Ok(())
}
