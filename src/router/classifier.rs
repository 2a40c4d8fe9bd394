//! Command classification for the master
//!
//! Decides how a command reaches the regions: schema changes and full
//! scans go everywhere, commands bound to a known primary-key value go to
//! the one region owning that key, everything else is broadcast.

use tracing::debug;

use crate::cluster::ClusterState;
use crate::sql::ast::*;
use crate::sql::parse_command;

/// How a command is dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// CREATE TABLE or DROP TABLE, sent to every region
    Ddl,
    /// SELECT without WHERE, sent to every region
    FullScan,
    /// Bound to a primary-key value, sent to the owning region only
    Point { key: String },
    /// No extractable key, sent to every region
    Broadcast,
}

/// Classify a command, learning primary keys from CREATE TABLE as it goes
pub fn classify(sql: &str, state: &ClusterState) -> Dispatch {
    let up = sql.trim().to_ascii_uppercase();

    if up.starts_with("CREATE TABLE") {
        if let Command::CreateTable(stmt) = parse_command(sql) {
            debug!(table = %stmt.table_name, pk = %stmt.primary_key, "caching primary key");
            state.register_primary_key(&stmt.table_name, &stmt.primary_key);
        }
        return Dispatch::Ddl;
    }
    if up.starts_with("DROP TABLE") {
        return Dispatch::Ddl;
    }
    if up.starts_with("SELECT") && !up.contains("WHERE") {
        return Dispatch::FullScan;
    }

    match extract_key(&parse_command(sql), state) {
        Some(key) => Dispatch::Point { key },
        None => Dispatch::Broadcast,
    }
}

/// Primary-key value a command is bound to, if any
fn extract_key(command: &Command, state: &ClusterState) -> Option<String> {
    let table = command.table_name()?;
    let pk = state.primary_key_for(table)?;

    let value = match command {
        Command::Insert(stmt) => stmt.value_for(&pk),
        Command::Select(SelectStatement { predicate, .. })
        | Command::Delete(DeleteStatement { predicate, .. }) => predicate
            .as_ref()
            .filter(|p| p.column == pk)
            .map(|p| p.value.as_str()),
        Command::Update(stmt) => {
            Some(stmt.predicate.value.as_str()).filter(|_| stmt.predicate.column == pk)
        }
        _ => None,
    }?;

    Some(value.trim().to_string())
}
