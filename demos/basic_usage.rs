//! Basic logger usage example
//!
//! Demonstrates leveled, structured and formatted logging plus per-output
//! minimum levels.
//!
//! Run with: cargo run --example basic_usage

use multilog::prelude::*;
use multilog::{attrs, global, info, warn};

fn main() -> Result<()> {
    println!("=== multilog - Basic Usage Example ===\n");

    // Text output on stderr at DEBUG and above
    let logger = Logger::new(std::io::stderr(), "demo", Flags::STD | Flags::MICROSECONDS);

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message (below DEBUG, hidden)");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.notice("This is a notice message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.critical("This is a critical message");

    println!("\n2. Structured and formatted logging:");
    logger.info_with("user logged in", attrs!["user_id" => 42, "method" => "oauth"]);
    info!(logger, "processed {} items in {}ms", 128, 37);
    warn!(logger, "retry attempt {} of {}", 3, 5);

    println!("\n3. A second output that only sees errors, as JSON on stdout:");
    logger.add_handler(Level::ERROR, JsonHandler::new(std::io::stdout()));
    logger.info("text only");
    logger.error_with("text and json", attrs!["code" => 500]);

    println!("\n4. Colored console output:");
    logger.set_colored_output(Level::ALL, ColorOptions::with_mode(ColorMode::Auto));
    logger.trace("colored trace");
    logger.warn("colored warning");

    println!("\n5. The process-wide default logger:");
    global::set_prefix("global");
    global::println("stdlib-style println");
    global::notice_with("structured", attrs!["answer" => 42]);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
