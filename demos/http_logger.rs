//! HTTP access logging example
//!
//! Serves a small axum app with the logging middleware in front of it.
//!
//! Run with: cargo run --example http_logger
//! Then: curl -d 'hello' localhost:3000/echo

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use multilog::http::{HttpLogOptions, HttpLogging};
use multilog::prelude::*;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let logger = Arc::new(Logger::new(std::io::stderr(), "http", Flags::STD));
    logger.set_colored_output(Level::DEBUG, ColorOptions::with_mode(ColorMode::Auto));

    let logging = HttpLogging::new(
        Arc::clone(&logger),
        HttpLogOptions {
            mode: ColorMode::Auto,
            include_query: true,
            log_body: true,
            max_body_bytes: 256,
        },
    );

    let app = logging.wrap(
        Router::new()
            .route("/", get(|| async { "hello" }))
            .route("/echo", post(|body: String| async move { body }))
            .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
            .route("/boom", get(|| async { StatusCode::INTERNAL_SERVER_ERROR })),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    logger.info("listening on http://127.0.0.1:3000");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
