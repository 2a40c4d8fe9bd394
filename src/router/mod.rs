//! Request routing for the master
//!
//! [`Router::route`] classifies one command, sends it to the regions of the
//! current membership snapshot and assembles the reply lines.

pub mod classifier;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cluster::{ClusterState, Membership, Region};
use crate::server::transport::{self, Framing};

pub use classifier::{classify, Dispatch};

/// Reply to a blank request line
pub const EMPTY_SQL: &str = "Empty SQL.";

/// Reply when the membership is empty
pub const NO_REGIONS: &str = "No regions available.";

/// Routes commands from clients to regions
#[derive(Debug, Clone)]
pub struct Router {
    state: Arc<ClusterState>,
}

impl Router {
    /// Create a router over shared cluster state
    pub fn new(state: Arc<ClusterState>) -> Self {
        Self { state }
    }

    /// Shared cluster state
    pub fn state(&self) -> &Arc<ClusterState> {
        &self.state
    }

    /// Route one command and return the reply lines for the client
    pub async fn route(&self, sql: &str) -> Vec<String> {
        if sql.trim().is_empty() {
            return vec![EMPTY_SQL.to_string()];
        }

        let snapshot = self.state.snapshot();
        if snapshot.is_empty() {
            return vec![NO_REGIONS.to_string()];
        }

        let dispatch = classify(sql, &self.state);
        debug!(?dispatch, regions = snapshot.len(), "dispatching command");

        match dispatch {
            Dispatch::Ddl | Dispatch::FullScan => {
                fan_out(&snapshot, sql, Framing::StreamToClose).await
            }
            Dispatch::Broadcast => fan_out(&snapshot, sql, Framing::SingleLine).await,
            Dispatch::Point { key } => {
                let Some(region) = snapshot.region_for_key(&key) else {
                    return vec![NO_REGIONS.to_string()];
                };
                debug!(key = %key, region = %region.name, "routing to owning region");

                match transport::request(&region.address, sql, Framing::SingleLine).await {
                    Ok(lines) => lines,
                    Err(err) => {
                        warn!(region = %region.name, error = ?err, "region request failed");
                        vec![format!("Error: {}", err)]
                    }
                }
            }
        }
    }
}

/// Send `sql` to every region concurrently; replies come back in snapshot
/// order, each line prefixed with its region name
async fn fan_out(snapshot: &Membership, sql: &str, framing: Framing) -> Vec<String> {
    let pending: Vec<_> = snapshot
        .regions()
        .iter()
        .cloned()
        .map(|region| {
            let address = region.address.clone();
            let sql = sql.to_string();
            let handle =
                tokio::spawn(async move { transport::request(&address, &sql, framing).await });
            (region, handle)
        })
        .collect();

    let mut lines = Vec::new();
    for (region, handle) in pending {
        let reply = match handle.await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                warn!(region = %region.name, error = ?err, "region request failed");
                vec![format!("Error: {}", err)]
            }
            Err(err) => {
                warn!(region = %region.name, error = ?err, "region request task failed");
                vec![format!("Error: {}", err)]
            }
        };
        lines.extend(reply.into_iter().map(|line| prefixed(&region, &line)));
    }
    lines
}

fn prefixed(region: &Region, line: &str) -> String {
    format!("[{}] {}", region.name, line)
}
