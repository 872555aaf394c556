// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, written to stderr)
// 3. Validate the options and open the output file
// 4. Run the crawl with the chosen strategy
// 5. Print the summary and exit (0 = success, 2 = error)
//
// Rust concepts used:
// - async/await: pages are fetched over the network
// - Result<T, E>: errors bubble up to run() with the ? operator
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - validated crawl options
mod crawl;    // src/crawl/ - crawl session, page step, shared state
mod extract;  // src/extract.rs - email extraction
mod fetch;    // src/fetch/ - page fetching (reqwest + scraper)
mod sink;     // src/sink.rs - background email writer
mod urls;     // src/urls.rs - URL helpers

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use crawl::{CrawlSession, CrawlSummary};
use fetch::HttpFetcher;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = cli.options().build().context("invalid options")?;
    let fetcher = HttpFetcher::new(options.timeout, &options.user_agent)
        .context("failed to build HTTP client")?;

    if !cli.json {
        println!("🔍 Crawling: {}", options.seed_url);
        match options.max_depth {
            Some(depth) => println!("📊 Max depth: {}", depth),
            None => println!("📊 Max depth: unbounded"),
        }
    }

    let session = CrawlSession::start(options, Arc::new(fetcher)).await?;
    let summary = session.run(cli.strategy()).await;

    print_summary(&summary, cli.json)?;

    Ok(0)
}

// RUST_LOG wins; otherwise info, or debug with --verbose.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(summary: &CrawlSummary, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(summary)?;
        println!("{}", json_output);
        return Ok(());
    }

    println!();
    if summary.emails.is_empty() {
        println!("📭 No emails found");
    } else {
        println!("📧 Emails:");
        for email in &summary.emails {
            println!("   {}", email);
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   🌐 URLs visited: {}", summary.urls_visited);
    println!("   📄 Pages crawled: {}", summary.urls_crawled);
    println!("   ✉️  Pages with emails: {}", summary.urls_with_emails);
    println!("   📋 Emails: {}", summary.emails.len());
    if let Some(path) = &summary.output_file {
        println!("   💾 Written to {}: {}", path, summary.emails_written);
    }
    println!("   ⏱️  Took {} ms", summary.elapsed_ms);

    Ok(())
}
