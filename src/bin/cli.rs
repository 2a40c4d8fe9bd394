//! RegionDB - CLI Client

use anyhow::Result;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use regiondb::server::{request, Framing, DEFAULT_MASTER_PORT};

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive RegionDB client", long_about = None)]
struct Args {
    /// Master host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Master port.
    #[arg(long, short, default_value_t = DEFAULT_MASTER_PORT)]
    port: u16,
}

/// Print welcome banner
fn print_banner(master: &str) {
    println!("RegionDB client connected to {}", master);
    println!("Each line is sent as one command. Type 'help' for examples, 'exit' to quit.\n");
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  help               Show this help message
  exit, quit         Leave the client

SQL Commands:
  CREATE TABLE ...   Create a table on every region
  DROP TABLE ...     Drop a table on every region
  INSERT INTO ...    Insert one row
  SELECT * FROM ...  Query rows
  UPDATE ...         Update rows
  DELETE FROM ...    Delete rows

Examples:
  CREATE TABLE users (id INT, name TEXT, PRIMARY KEY(id))
  INSERT INTO users (id, name) VALUES (1, 'Alice')
  SELECT * FROM users WHERE id = 1
"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let master = format!("{}:{}", args.host, args.port);

    let mut editor = DefaultEditor::new()?;
    print_banner(&master);

    loop {
        let line = match editor.readline("regiondb> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error reading input: {}", err);
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        if trimmed.eq_ignore_ascii_case("help") {
            print_help();
            continue;
        }
        if !trimmed.is_empty() {
            let _ = editor.add_history_entry(trimmed);
        }

        match request(&master, trimmed, Framing::StreamToClose).await {
            Ok(reply) => println!("{}", reply.join("\n")),
            Err(err) => eprintln!("Error communicating with master: {}", err),
        }
    }

    println!("Goodbye!");
    Ok(())
}
