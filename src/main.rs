// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use atlassynth::{api::start_server, config::ServerConfig, version};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServerConfig::parse();

    println!("🚀 Starting {}...\n", version::get_version_string());
    println!("🌐 Listening on http://{}", config.listen_addr);
    println!("🧠 CLIP model: {}", display_dir(&config.clip_model_dir));
    println!("🏔️ Depth model: {}", display_dir(&config.depth_model_dir));
    println!();

    start_server(config).await
}

fn display_dir(dir: &str) -> &str {
    if dir.trim().is_empty() {
        "(disabled)"
    } else {
        dir
    }
}
