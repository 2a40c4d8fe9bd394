//! RegionDB - Master server

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use regiondb::cluster::registry::{self, DirectoryRegistry, Registry, StaticRegistry};
use regiondb::cluster::ClusterState;
use regiondb::server::{MasterConfig, MasterServer, RegistrySource, DEFAULT_MASTER_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about = "Route SQL commands to RegionDB regions", long_about = None)]
struct Args {
    /// Host address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on. Use 0 for an ephemeral port.
    #[arg(long, short, default_value_t = DEFAULT_MASTER_PORT)]
    port: u16,

    /// Registry directory regions publish themselves into.
    #[arg(long, conflicts_with = "region")]
    registry_dir: Option<PathBuf>,

    /// Fixed region as NAME=HOST:PORT; repeat for more regions.
    #[arg(long, value_parser = parse_region)]
    region: Vec<(String, String)>,

    /// How often the registry directory is polled, in milliseconds.
    #[arg(long, default_value_t = 500)]
    poll_interval_ms: u64,
}

fn parse_region(arg: &str) -> std::result::Result<(String, String), String> {
    StaticRegistry::parse_entry(arg).map_err(|err| err.to_string())
}

impl Args {
    fn into_config(self) -> MasterConfig {
        let mut config = MasterConfig::new()
            .host(self.host)
            .port(self.port)
            .poll_interval(Duration::from_millis(self.poll_interval_ms));

        if !self.region.is_empty() {
            config = config.registry(RegistrySource::Static(self.region));
        } else if let Some(dir) = self.registry_dir {
            config = config.registry(RegistrySource::Directory(dir));
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    regiondb::init_tracing();

    let config = Args::parse().into_config();
    let state = Arc::new(ClusterState::new());

    let source: Arc<dyn Registry> = match &config.registry {
        RegistrySource::Directory(dir) => Arc::new(
            DirectoryRegistry::open(dir)
                .with_context(|| format!("failed to open registry directory {}", dir.display()))?,
        ),
        RegistrySource::Static(entries) => Arc::new(StaticRegistry::new(entries.clone())?),
    };

    if let Err(err) = registry::refresh(source.as_ref(), &state) {
        warn!(error = ?err, "failed to read region registry");
    }
    let watcher = match &config.registry {
        RegistrySource::Directory(_) => Some(registry::spawn_watcher(
            source,
            Arc::clone(&state),
            config.poll_interval,
        )),
        RegistrySource::Static(_) => None,
    };

    let server = MasterServer::bind(&config.bind_address(), state)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!("master listening on {}", server.local_addr()?);

    let result = server.run_until_ctrl_c().await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }
    if let Err(err) = result {
        warn!("master exited with error: {err:?}");
        return Err(err.into());
    }

    Ok(())
}
