//! Basic scan example.
//!
//! This example shows how to:
//! - Build a scanner from a configuration snapshot
//! - Check scannability before scanning
//! - Scan a file and handle the verdict
//!
//! Run with: cargo run --example scan_file -- <path>
//!
//! Scanning a real file requires a running clamd; without one the
//! verdict is `Unchecked` and a warning event is logged.

use virusgate::prelude::*;
use virusgate::StaticSchemeClassifier;

use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Cargo.toml".to_string());

    // Point at a local clamd; allow unchecked files through when it is
    // unreachable, and log clean results too.
    let config = ScannerConfig::new(ScanMode::DaemonTcp)
        .with_daemon_tcp(DaemonTcpConfig::new("localhost", 3310))
        .with_outage_action(OutageAction::AllowUnchecked)
        .with_verbose(true);

    let classifier = StaticSchemeClassifier::new().with_local("public");
    let scanner = Scanner::builder(config)
        .with_classifier(Arc::new(classifier))
        .build()?;

    let file = FileReference::from_path(&path)?;
    println!("Scanning {} ({} bytes)", file.uri(), file.size());

    if !scanner.is_enabled() || !scanner.is_scannable(&file) {
        println!("File is excluded from scanning");
        return Ok(());
    }

    match scanner.scan(&file).await {
        ScanVerdict::Clean => println!("Verdict: clean"),
        ScanVerdict::Infected { virus_name } => {
            println!(
                "Verdict: INFECTED ({})",
                virus_name.as_deref().unwrap_or("unnamed")
            )
        }
        ScanVerdict::Unchecked => {
            if scanner.allow_unchecked_files() {
                println!("Verdict: unchecked, allowed through by outage policy");
            } else {
                println!("Verdict: unchecked, blocked by outage policy");
            }
        }
    }

    if let Some(version) = scanner.version().await {
        println!("Engine version: {version}");
    }

    Ok(())
}
