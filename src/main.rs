// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use beras_vision_node::{
    api::http_server::{start_server, AppState},
    config::ServerConfig,
    report::ReportAssembler,
    version,
    vision::DetectorService,
};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServerConfig::load();

    println!("🚀 Starting {}...\n", version::SERVICE_NAME);
    println!("📦 BUILD VERSION: {}", version::get_version_string());
    println!();

    // Server starts without a model; /predict then reports it unavailable
    println!("🌾 Loading detection model from {}...", config.model_path.display());
    let detector = DetectorService::load(config.detector_config());
    if detector.is_available() {
        println!("✅ Detection model loaded");
    } else {
        println!("⚠️  Detection model unavailable, /predict will return errors");
    }

    let staging_dir = config.staging_dir();
    println!("📁 Staging report images in {}", staging_dir.display());
    let assembler = ReportAssembler::new(staging_dir);

    let state = AppState::new(detector, assembler);

    println!("🌐 Serving on http://{}:{}", config.host, config.port);
    println!("\nPress Ctrl+C to shutdown...");

    start_server(&config, state).await?;

    println!("\n👋 Shutdown complete");
    Ok(())
}
