mod cli;

use crate::cli::{Command, CLI};
use clap::Parser;
use pinhole_generator::RandomGenerator;
use pinhole_shortener::{LinkStats, ShortCode, ShortenerService, ShortenerSettings};
use pinhole_storage::JsonFileStore;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::parse();

    pinhole_telemetry::init(config.log_format.into())?;

    info!(
        data_file = %config.data_file.display(),
        base_url = %config.base_url,
        log_format = %config.log_format,
        "starting pinhole"
    );

    let generator = RandomGenerator::default();
    debug!(keyspace = ?generator.keyspace(), "using random short codes");

    let settings = ShortenerSettings::builder()
        .base_url(config.base_url)
        .build();
    let service = ShortenerService::open(
        JsonFileStore::new(config.data_file),
        generator,
        settings,
    )
    .await?;

    let output = match config.command {
        Command::Shorten { url } => serde_json::to_string_pretty(&service.shorten(&url).await?)?,
        Command::Resolve { short_code } => {
            let record = service.resolve(&short_code).await?;
            let stats = LinkStats::new(ShortCode::new(short_code)?, &record);
            serde_json::to_string_pretty(&stats)?
        }
        Command::Stats { short_code } => {
            serde_json::to_string_pretty(&service.stats(&short_code).await?)?
        }
        Command::List => serde_json::to_string_pretty(&service.list().await)?,
    };
    println!("{output}");

    service.shutdown().await?;
    Ok(())
}
