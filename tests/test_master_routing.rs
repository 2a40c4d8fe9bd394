use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use regiondb::cluster::registry::{spawn_watcher, DirectoryRegistry};
use regiondb::cluster::{slot_for_key, ClusterState, Membership};
use regiondb::executor::ExecutionEngine;
use regiondb::server::{request, Framing, MasterServer, RegionServer};
use regiondb::storage::TableStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Running {
    addr: String,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Running {
    async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.handle.await;
    }
}

fn spawn_until_shutdown<F, Fut>(addr: String, run: F) -> Running
where
    F: FnOnce(oneshot::Receiver<()>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (shutdown, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(run(shutdown_rx));
    Running {
        addr,
        shutdown,
        handle,
    }
}

async fn start_region(name: &str, store: Arc<TableStore>) -> Result<Running> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let server = RegionServer::with_engine(name, listener, ExecutionEngine::with_store(store));
    let addr = server.local_addr()?.to_string();

    Ok(spawn_until_shutdown(addr, |rx| async move {
        let _ = server
            .run_until(async move {
                let _ = rx.await;
            })
            .await;
    }))
}

async fn start_master(state: Arc<ClusterState>) -> Result<Running> {
    let server = MasterServer::bind("127.0.0.1:0", state).await?;
    let addr = server.local_addr()?.to_string();

    Ok(spawn_until_shutdown(addr, |rx| async move {
        let _ = server
            .run_until(async move {
                let _ = rx.await;
            })
            .await;
    }))
}

async fn send(master: &Running, sql: &str) -> Result<Vec<String>> {
    Ok(request(&master.addr, sql, Framing::StreamToClose).await?)
}

async fn send_raw(master: &Running, bytes: &[u8]) -> Result<String> {
    let mut stream = TcpStream::connect(&master.addr).await?;
    stream.write_all(bytes).await?;

    let mut reply = String::new();
    stream.read_to_string(&mut reply).await?;
    Ok(reply)
}

/// Region stand-in that answers `reply` only after `delay`
async fn start_slow_region(reply: &'static str, delay: Duration) -> Result<Running> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();

    Ok(spawn_until_shutdown(addr, move |mut rx| async move {
        loop {
            tokio::select! {
                _ = &mut rx => break,
                accepted = listener.accept() => {
                    let Ok((mut stream, _)) = accepted else { continue };
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = stream.read(&mut buf).await;
                        tokio::time::sleep(delay).await;
                        let _ = stream.write_all(format!("{}\n", reply).as_bytes()).await;
                        let _ = stream.shutdown().await;
                    });
                }
            }
        }
    }))
}

async fn unreachable_address() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    drop(listener);
    Ok(addr)
}

struct Cluster {
    master: Running,
    regions: Vec<Running>,
    stores: Vec<Arc<TableStore>>,
}

impl Cluster {
    async fn start(names: &[&str]) -> Result<Self> {
        let mut regions = Vec::new();
        let mut stores = Vec::new();
        let mut entries = Vec::new();

        for name in names {
            let store = Arc::new(TableStore::new());
            let region = start_region(name, Arc::clone(&store)).await?;
            entries.push((name.to_string(), region.addr.clone()));
            regions.push(region);
            stores.push(store);
        }

        let state = Arc::new(ClusterState::with_membership(Membership::from_entries(
            entries,
        )));
        let master = start_master(state).await?;

        Ok(Self {
            master,
            regions,
            stores,
        })
    }

    async fn stop(self) {
        self.master.stop().await;
        for region in self.regions {
            region.stop().await;
        }
    }
}

#[tokio::test]
async fn test_ddl_reaches_every_region() -> Result<()> {
    let cluster = Cluster::start(&["r1", "r2"]).await?;

    assert_eq!(
        send(&cluster.master, "CREATE TABLE u (id INT, val TEXT, PRIMARY KEY(id))").await?,
        vec!["[r1] Table created: u", "[r2] Table created: u"]
    );
    assert_eq!(
        send(&cluster.master, "CREATE TABLE u (id INT, val TEXT, PRIMARY KEY(id))").await?,
        vec!["[r1] Table already exists: u", "[r2] Table already exists: u"]
    );
    assert_eq!(
        send(&cluster.master, "DROP TABLE u").await?,
        vec!["[r1] Table dropped: u", "[r2] Table dropped: u"]
    );

    cluster.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_point_routing_targets_owning_region() -> Result<()> {
    let cluster = Cluster::start(&["r1", "r2"]).await?;
    send(&cluster.master, "CREATE TABLE u (id INT, val TEXT, PRIMARY KEY(id))").await?;

    assert_eq!(
        send(&cluster.master, "INSERT INTO u (id, val) VALUES (1, 'A')").await?,
        vec!["OK"]
    );
    assert_eq!(
        send(&cluster.master, "INSERT INTO u (id, val) VALUES (1, 'B')").await?,
        vec!["Duplicate primary key: 1"]
    );
    assert_eq!(
        send(&cluster.master, "SELECT * FROM u WHERE id = 1").await?,
        vec!["{id=1, val=A}"]
    );

    // Exactly the hashed slot holds the row
    let owner = slot_for_key("1", 2);
    assert_eq!(cluster.stores[owner].with_table("u", |t| t.len())?, 1);
    assert_eq!(cluster.stores[1 - owner].with_table("u", |t| t.len())?, 0);

    assert_eq!(
        send(&cluster.master, "UPDATE u SET val = 'Z' WHERE id = 1").await?,
        vec!["Updated rows: 1"]
    );
    assert_eq!(
        send(&cluster.master, "DELETE FROM u WHERE id = 1").await?,
        vec!["Deleted rows: 1"]
    );

    cluster.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_full_scan_and_broadcast_prefix_lines() -> Result<()> {
    let cluster = Cluster::start(&["r2", "r1"]).await?;
    send(&cluster.master, "CREATE TABLE u (id INT, val TEXT, PRIMARY KEY(id))").await?;

    // "1" hashes to slot 1 (r2), "2" and "4" to slot 0 (r1)
    for (id, val) in [(1, "A"), (2, "B"), (4, "D")] {
        let sql = format!("INSERT INTO u (id, val) VALUES ({}, '{}')", id, val);
        assert_eq!(send(&cluster.master, &sql).await?, vec!["OK"]);
    }

    assert_eq!(
        send(&cluster.master, "SELECT * FROM u").await?,
        vec![
            "[r1] {id=2, val=B}",
            "[r1] {id=4, val=D}",
            "[r2] {id=1, val=A}",
        ]
    );
    assert_eq!(
        send(&cluster.master, "SELECT * FROM u WHERE val = 'A'").await?,
        vec!["[r1] Empty result.", "[r2] {id=1, val=A}"]
    );
    assert_eq!(
        send(&cluster.master, "DELETE FROM u WHERE val = 'Z'").await?,
        vec!["[r1] Deleted rows: 0", "[r2] Deleted rows: 0"]
    );
    assert_eq!(
        send(&cluster.master, "DELETE FROM u").await?,
        vec!["[r1] Table cleared: u", "[r2] Table cleared: u"]
    );
    assert_eq!(
        send(&cluster.master, "SELECT * FROM u").await?,
        vec!["[r1] Empty table.", "[r2] Empty table."]
    );

    cluster.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_unreachable_region_fills_its_slot_with_error() -> Result<()> {
    let store = Arc::new(TableStore::new());
    let r1 = start_region("r1", Arc::clone(&store)).await?;

    // Created behind the master's back, so no primary key is cached
    ExecutionEngine::with_store(Arc::clone(&store))
        .execute("CREATE TABLE t (id INT, val TEXT, PRIMARY KEY(id))");

    let state = Arc::new(ClusterState::with_membership(Membership::from_entries([
        ("r1".to_string(), r1.addr.clone()),
        ("r2".to_string(), unreachable_address().await?),
    ])));
    let master = start_master(state).await?;

    let reply = send(&master, "INSERT INTO t (id, val) VALUES (1, 'A')").await?;
    assert_eq!(reply.len(), 2);
    assert_eq!(reply[0], "[r1] OK");
    assert!(reply[1].starts_with("[r2] Error: "), "got {:?}", reply[1]);

    let reply = send(&master, "SELECT * FROM t").await?;
    assert_eq!(reply[0], "[r1] {id=1, val=A}");
    assert!(reply[1].starts_with("[r2] Error: "));

    master.stop().await;
    r1.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_master_short_circuits() -> Result<()> {
    let master = start_master(Arc::new(ClusterState::new())).await?;

    assert_eq!(send(&master, "").await?, vec!["Empty SQL."]);
    assert_eq!(send(&master, "   ").await?, vec!["Empty SQL."]);
    assert_eq!(
        send(&master, "SELECT * FROM u").await?,
        vec!["No regions available."]
    );

    master.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_master_follows_directory_registry() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let registry = DirectoryRegistry::open(dir.path())?;
    let state = Arc::new(ClusterState::new());
    let watcher = spawn_watcher(
        Arc::new(registry.clone()),
        Arc::clone(&state),
        Duration::from_millis(10),
    );
    let master = start_master(Arc::clone(&state)).await?;

    let region = start_region("r1", Arc::new(TableStore::new())).await?;
    let registration = registry.register("r1", &region.addr)?;

    let mut reply = Vec::new();
    for _ in 0..200 {
        reply = send(&master, "CREATE TABLE u (id INT, PRIMARY KEY(id))").await?;
        if reply != vec!["No regions available."] {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(reply, vec!["[r1] Table created: u"]);

    drop(registration);
    for _ in 0..200 {
        if state.snapshot().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(
        send(&master, "SELECT * FROM u").await?,
        vec!["No regions available."]
    );

    watcher.abort();
    master.stop().await;
    region.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_master_answers_non_utf8_request() -> Result<()> {
    let cluster = Cluster::start(&["r1"]).await?;
    send(&cluster.master, "CREATE TABLE u (id INT, val TEXT, PRIMARY KEY(id))").await?;

    let reply = send_raw(&cluster.master, b"SELECT * FROM u WHERE val = '\xff'\n").await?;
    assert_eq!(reply, "[r1] Empty table.\n");

    let reply = send_raw(&cluster.master, b"\xff\n").await?;
    assert_eq!(reply, "[r1] Unsupported SQL.\n");

    cluster.stop().await;
    Ok(())
}

#[tokio::test]
async fn test_fan_out_keeps_name_order_when_first_region_is_slow() -> Result<()> {
    let slow = start_slow_region("slow", Duration::from_millis(200)).await?;
    let fast = start_region("r2", Arc::new(TableStore::new())).await?;

    let state = Arc::new(ClusterState::with_membership(Membership::from_entries([
        ("r2".to_string(), fast.addr.clone()),
        ("r1".to_string(), slow.addr.clone()),
    ])));
    let master = start_master(state).await?;

    assert_eq!(
        send(&master, "SELECT * FROM t WHERE val = 'x'").await?,
        vec!["[r1] slow", "[r2] Table not found: t"]
    );
    assert_eq!(
        send(&master, "DROP TABLE t").await?,
        vec!["[r1] slow", "[r2] Table not found: t"]
    );

    master.stop().await;
    slow.stop().await;
    fast.stop().await;
    Ok(())
}
