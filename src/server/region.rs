//! Region server
//!
//! Accepts one command per connection, runs it against the region's table
//! store and replies with the response text before closing.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tracing::{debug, info, warn};

use super::transport::{read_request, write_response};
use crate::error::Result;
use crate::executor::ExecutionEngine;

/// Region server bound to a listener
pub struct RegionServer {
    name: String,
    listener: TcpListener,
    engine: ExecutionEngine,
}

impl RegionServer {
    /// Create a server with an empty table store
    pub fn new(name: impl Into<String>, listener: TcpListener) -> Self {
        Self::with_engine(name, listener, ExecutionEngine::new())
    }

    /// Create a server over an existing engine
    pub fn with_engine(
        name: impl Into<String>,
        listener: TcpListener,
        engine: ExecutionEngine,
    ) -> Self {
        Self {
            name: name.into(),
            listener,
            engine,
        }
    }

    /// Bind to `addr` and create a server with an empty table store
    pub async fn bind(name: impl Into<String>, addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::new(name, listener))
    }

    /// Region name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address the server is listening on
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let RegionServer {
            name,
            listener,
            engine,
        } = self;
        tokio::pin!(shutdown);

        loop {
            select! {
                _ = &mut shutdown => {
                    info!(region = %name, "region shutting down");
                    break;
                }
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer)) => spawn_connection(&name, stream, peer, &engine),
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

fn spawn_connection(name: &str, stream: TcpStream, peer: SocketAddr, engine: &ExecutionEngine) {
    let name = name.to_string();
    let engine = engine.clone();
    tokio::spawn(async move {
        if let Err(err) = handle_connection(&name, stream, &engine).await {
            warn!(region = %name, peer = %peer, error = ?err, "connection closed with error");
        }
    });
}

async fn handle_connection(name: &str, stream: TcpStream, engine: &ExecutionEngine) -> Result<()> {
    let (reader, mut writer) = stream.into_split();

    // EOF before a full line executes as an empty command
    let sql = read_request(reader).await?;
    debug!(region = %name, sql = %sql, "received command");

    let response = engine.execute(&sql);
    write_response(&mut writer, &response).await
}
