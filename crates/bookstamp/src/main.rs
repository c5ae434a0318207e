use std::path::PathBuf;

use anyhow::Result;
use bookstamp_core::bookstack::{BookstackClient, BookstackClientConfig};
use bookstamp_core::config::{DEFAULT_CONFIG_FILE_NAME, load_config};
use bookstamp_core::stamp::{StampOptions, stamp_page};
use bookstamp_core::version::{VERSION_FILE_NAME, format_stamp_date, load_or_init_version};
use chrono::Local;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "bookstamp",
    version,
    about = "Append a dated release-version row to a Bookstack version table"
)]
struct Cli {
    #[arg(help = "Release number folded into the computed version string")]
    release: String,
    #[arg(help = "Bookstack book id that owns the version page")]
    book_id: i64,
    #[arg(help = "Bookstack page id of the version table")]
    page_id: i64,
    #[arg(long, value_name = "PATH", help = "Read settings from this TOML file")]
    config: Option<PathBuf>,
    #[arg(
        long,
        value_name = "PATH",
        help = "Version record location (default: version.json)"
    )]
    version_file: Option<PathBuf>,
    #[arg(long, help = "Fetch and mutate the page HTML but skip the remote update")]
    dry_run: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE_NAME));
    let config = load_config(&config_path)?;

    let now = Local::now();
    let version_path = cli
        .version_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(VERSION_FILE_NAME));
    let (record, wrote_version_file) = load_or_init_version(&version_path, &cli.release, now)?;

    println!("release: {}", cli.release);
    println!("version: {}", record.version);
    println!(
        "version_file: {} ({})",
        version_path.display(),
        if wrote_version_file {
            "created"
        } else {
            "existing"
        }
    );

    let options = StampOptions {
        book_id: cli.book_id,
        page_id: cli.page_id,
        date: format_stamp_date(now),
        version: record.version.clone(),
        dry_run: cli.dry_run,
    };
    let mut client = BookstackClient::new(BookstackClientConfig::from_config(&config)?)?;
    let report = stamp_page(&mut client, &options)?;

    println!("book_id: {}", report.book_id);
    println!("page_id: {}", report.page_id);
    println!("date: {}", report.date);
    println!("updated: {}", format_flag(report.updated));
    if cli.dry_run {
        println!();
        println!("{}", report.html);
    }

    Ok(())
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
