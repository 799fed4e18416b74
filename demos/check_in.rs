//! Weekly check-in example
//!
//! Usage:
//!   PULSE_EMAIL=me@example.com PULSE_PASSWORD=secret cargo run --example check_in

use pulse_rs_client::models::{NewPulseLog, PulseLogFilter};
use pulse_rs_client::{ClientConfig, FileStorage, LoginRequest, PulseClient};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    let email = std::env::var("PULSE_EMAIL").unwrap_or_else(|_| "demo@example.com".to_string());
    let password = std::env::var("PULSE_PASSWORD").unwrap_or_else(|_| "demo".to_string());

    println!("=== Pulse Check-in Example ===");
    println!("API: {}", config.api_url());
    println!();

    let storage = Arc::new(FileStorage::default_location()?);
    let client = PulseClient::new(config, storage)?;

    if client.startup()? {
        println!("✓ Restored session from profile snapshot");
    }

    let user = client.login(&LoginRequest::new(email, password)).await?;
    println!("✓ Logged in as {}", user.display_name());

    let Some(team) = user.team_ids().first().copied() else {
        println!("User has no team, nothing to check in for");
        client.logout().await;
        return Ok(());
    };

    let moods = client.moods().list().await?;
    let workloads = client.workloads().list().await?;
    let (Some(mood), Some(workload)) = (moods.first(), workloads.first()) else {
        println!("No mood or workload options configured");
        client.logout().await;
        return Ok(());
    };

    let log = client
        .pulse_logs()
        .create(&NewPulseLog {
            team,
            mood: mood.id,
            workload: workload.id,
            comment: "Checked in from the example".to_string(),
        })
        .await?;
    println!("✓ Created pulse log {}", log.id);

    let history = client
        .pulse_logs()
        .list(&PulseLogFilter {
            team: Some(team),
            ..Default::default()
        })
        .await?;
    println!("  Team has {} pulse logs", history.count);

    let teams = client.teams().list(1).await?;
    for t in &teams.results {
        println!("  Team {}: {}", t.id, t.team_name);
    }

    client.logout().await;
    println!("✓ Logged out");
    Ok(())
}
