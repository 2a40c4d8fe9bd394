//! RegionDB - Region server

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use regiondb::cluster::DirectoryRegistry;
use regiondb::server::{RegionConfig, RegionServer, DEFAULT_REGION_PORT, DEFAULT_REGISTRY_DIR};

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve one RegionDB region", long_about = None)]
struct Args {
    /// Region name, unique within the cluster.
    #[arg(long)]
    name: String,

    /// Host address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on. Use 0 for an ephemeral port.
    #[arg(long, short, default_value_t = DEFAULT_REGION_PORT)]
    port: u16,

    /// Address to publish in the registry instead of the bound address.
    #[arg(long)]
    advertise: Option<String>,

    /// Registry directory to publish this region into.
    #[arg(long, default_value = DEFAULT_REGISTRY_DIR)]
    registry_dir: PathBuf,
}

impl Args {
    fn into_config(self) -> RegionConfig {
        let config = RegionConfig::new()
            .name(self.name)
            .host(self.host)
            .port(self.port)
            .registry_dir(self.registry_dir);

        match self.advertise {
            Some(address) => config.advertise(address),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    regiondb::init_tracing();

    let config = Args::parse().into_config();

    let server = RegionServer::bind(config.name.clone(), &config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    let local_addr = server.local_addr()?;
    info!(region = %config.name, "region listening on {}", local_addr);

    let registry = DirectoryRegistry::open(&config.registry_dir).with_context(|| {
        format!(
            "failed to open registry directory {}",
            config.registry_dir.display()
        )
    })?;
    let advertise = config
        .advertise
        .clone()
        .unwrap_or_else(|| local_addr.to_string());
    let registration = registry
        .register(&config.name, &advertise)
        .with_context(|| format!("failed to register region {}", config.name))?;

    let result = server.run_until_ctrl_c().await;
    drop(registration);

    if let Err(err) = result {
        warn!("region exited with error: {err:?}");
        return Err(err.into());
    }

    Ok(())
}
