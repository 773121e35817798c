// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use taskboard_server::{config::Config, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Seeding database {}", config.database_url);

    let pool = database::establish_connection_pool(&config.database_url).await?;
    let (boards, tasks) = seed::seed_demo_data(&pool).await?;
    pool.close().await;

    println!("Seed data inserted: {} boards, {} tasks.", boards, tasks);
    Ok(())
}
