//! Run with: cargo run --bin analyze -- <chat.json | shot1.png shot2.png ...>

use anyhow::{bail, Context};
use std::env;

use friendzoned::config::sentiment::SentimentConfig;
use friendzoned::modules::analysis::{intake, session::Session, stats};
use friendzoned::services::sentiment::SentimentClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        bail!("Usage: analyze <chat.json | image files...>");
    }

    let config = SentimentConfig::from_env()?;
    let client = SentimentClient::new(&config)?;

    let files = intake::load_files(&paths)?;
    let mut session = Session::new(config.document_id);

    if let Some(notice) = session.select(files)? {
        println!("! {}", notice);
    }

    if let Some(log) = session.staged_log() {
        println!(
            "Staged {} messages ({} sent, {} received)",
            log.len(),
            log.sent_count(),
            log.received_count()
        );
    } else {
        for staged in session.staged_images() {
            println!("Staged {} -> {}", staged.image.file_name, staged.preview.url());
        }
    }

    println!("Sending to {}...", client.url());
    let result = session
        .submit(&client)
        .await
        .context("Analysis failed")?;
    let view = stats::project(&result);

    println!();
    println!("Verdict:   {}", result.verdict());
    println!("Score:     {}%", result.score);
    println!("Sentences: {}", result.stats.total);
    println!("  positive {:>5.1}%", view.positive_pct);
    println!("  negative {:>5.1}%", view.negative_pct);
    println!("  neutral  {:>5.1}%", view.neutral_pct);

    Ok(())
}
