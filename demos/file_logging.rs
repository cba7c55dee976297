//! File logging example
//!
//! Demonstrates logging to the console and several files simultaneously,
//! each with its own minimum level.
//!
//! Run with: cargo run --example file_logging

use multilog::attrs;
use multilog::files::FileRegistry;
use multilog::prelude::*;

fn main() -> Result<()> {
    println!("=== multilog - File Logging Example ===\n");

    let registry = FileRegistry::new();
    let logger = Logger::new(std::io::stderr(), "files", Flags::STD);

    // Parent directories are created on demand
    registry.add_file_writer(&logger, Level::DEBUG, "logs/application.log")?;
    registry.add_file_writer(&logger, Level::ERROR, "logs/errors.log")?;
    registry.add_json_file(&logger, Level::INFO, "logs/events.json")?;

    println!("1. Logging to console and files:");

    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.info("Configuration loaded successfully");
    logger.warn("Using default settings for some options");
    logger.error_with("Failed to load optional plugin", attrs!["plugin" => "geo"]);

    println!("\n2. Performing some operations:");

    for i in 1..=5 {
        logger.info_with("Processing item", attrs!["item" => i, "of" => 5]);
        if i == 3 {
            logger.warn("Item 3 took longer than expected");
        }
    }

    logger.info("All operations completed");

    let closed = registry.close_all();

    println!("\n=== Example completed successfully! ===");
    println!("Closed {} files; check 'logs/' for the output", closed);

    Ok(())
}
