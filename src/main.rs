use anyhow::Result;
use clap::{Parser, Subcommand};
use cloudflare_images_provider::{
    local::record_from_path, CloudflareImagesProvider, FileRecord, ProviderConfig,
    ProviderMetadata, StorageProvider,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "cf-images")]
#[command(about = "Upload, delete and check images on Cloudflare Images")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a local file and print the resulting file record as JSON.
    Upload {
        path: PathBuf,
        /// Stream the file instead of reading it into memory first.
        #[arg(long)]
        stream: bool,
    },
    /// Delete a previously uploaded image.
    Delete {
        #[arg(value_name = "IMAGE_ID")]
        image_id: String,
    },
    /// Check whether an image still exists.
    Exists {
        #[arg(value_name = "IMAGE_ID")]
        image_id: String,
    },
}

fn record_for_id(image_id: String) -> FileRecord {
    FileRecord::new(image_id.clone(), 0, "application/octet-stream")
        .with_provider_metadata(ProviderMetadata::with_cloudflare_id(image_id))
}

async fn run(command: Command) -> Result<()> {
    let config = ProviderConfig::from_env()?;
    let provider = CloudflareImagesProvider::new(config)?;

    match command {
        Command::Upload { path, stream } => {
            let mut file = record_from_path(&path, stream).await?;
            if stream {
                provider.upload_stream(&mut file).await?;
            } else {
                provider.upload(&mut file).await?;
            }
            println!("{}", serde_json::to_string_pretty(&file)?);
        }
        Command::Delete { image_id } => {
            provider.delete(&record_for_id(image_id)).await?;
        }
        Command::Exists { image_id } => {
            let exists = provider.check_file_existence(&record_for_id(image_id)).await;
            println!("{}", exists);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloudflare_images_provider=info,cf_images=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(args.command).await {
        Ok(()) => {
            info!("Done");
            Ok(())
        }
        Err(e) => {
            error!("cf-images failed: {}", e);
            std::process::exit(1);
        }
    }
}
