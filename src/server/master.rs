//! Master server
//!
//! Accepts one command per connection, routes it through the [`Router`]
//! and streams the assembled reply back before closing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tracing::{debug, info, warn};

use super::transport::{read_request, write_response};
use crate::cluster::ClusterState;
use crate::error::Result;
use crate::router::Router;

/// Master server bound to a listener
pub struct MasterServer {
    listener: TcpListener,
    router: Router,
}

impl MasterServer {
    /// Create a server routing against `state`
    pub fn new(listener: TcpListener, state: Arc<ClusterState>) -> Self {
        Self {
            listener,
            router: Router::new(state),
        }
    }

    /// Bind to `addr` and create a server routing against `state`
    pub async fn bind(addr: &str, state: Arc<ClusterState>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::new(listener, state))
    }

    /// Address the server is listening on
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared cluster state
    pub fn state(&self) -> &Arc<ClusterState> {
        self.router.state()
    }

    /// Serve until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let MasterServer { listener, router } = self;
        tokio::pin!(shutdown);

        loop {
            select! {
                _ = &mut shutdown => {
                    info!("master shutting down");
                    break;
                }
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer)) => spawn_connection(stream, peer, &router),
                        Err(err) => warn!(error = ?err, "failed to accept connection"),
                    }
                }
            }
        }

        Ok(())
    }

    /// Serve until Ctrl-C
    pub async fn run_until_ctrl_c(self) -> Result<()> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await
    }
}

fn spawn_connection(stream: TcpStream, peer: SocketAddr, router: &Router) {
    let router = router.clone();
    tokio::spawn(async move {
        if let Err(err) = handle_connection(stream, &router).await {
            warn!(peer = %peer, error = ?err, "client connection closed with error");
        }
    });
}

async fn handle_connection(stream: TcpStream, router: &Router) -> Result<()> {
    let (reader, mut writer) = stream.into_split();

    let sql = read_request(reader).await?;
    debug!(sql = %sql, "received command");

    let reply = router.route(&sql).await;
    write_response(&mut writer, &reply.join("\n")).await
}
