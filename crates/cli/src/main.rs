//! # CLI — SiltKV Interactive Shell
//!
//! A REPL-style command-line interface for the SiltKV storage engine.
//! Reads commands from stdin, executes them against the engine, and prints
//! results to stdout. Designed for both interactive use and scripted
//! testing (pipe commands via stdin).
//!
//! ## Commands
//!
//! ```text
//! SET key value      Insert or update a key-value pair
//! GET key            Look up a key (prints value or "(nil)")
//! FLUSH              Force flush the memtable to an SSTable
//! STATS              Print engine debug info
//! EXIT / QUIT        Shut down gracefully
//! ```
//!
//! ## Configuration
//!
//! All settings are controlled via environment variables:
//!
//! ```text
//! SILT_WAL_DIR             WAL directory            (default: "data/wal")
//! SILT_SSTABLE_DIR         SSTable directory        (default: "data/sst")
//! SILT_MEMTABLE_THRESHOLD  Flush threshold, entries (default: 1024)
//! SILT_WAL_SEGMENT_MB      WAL segment size in MiB  (default: 16)
//! SILT_WAL_MAX_SEGMENTS    Sealed-segment cap       (default: 0 = unlimited)
//! SILT_WAL_MAX_AGE_SECS    Sealed-segment max age   (default: 0 = unlimited)
//! ```
//!
//! Logging honors `RUST_LOG` (default `info`).

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;
use engine::{Config, Engine, Entry, NotFound};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use wal::RetentionPolicy;

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn config_from_env() -> Config {
    let threshold: usize = env_or("SILT_MEMTABLE_THRESHOLD", "1024")
        .parse()
        .unwrap_or(1024);
    let segment_mb: u64 = env_or("SILT_WAL_SEGMENT_MB", "16").parse().unwrap_or(16);
    let max_segments: usize = env_or("SILT_WAL_MAX_SEGMENTS", "0").parse().unwrap_or(0);
    let max_age_secs: u64 = env_or("SILT_WAL_MAX_AGE_SECS", "0").parse().unwrap_or(0);

    Config {
        wal_dir: env_or("SILT_WAL_DIR", "data/wal").into(),
        wal_segment_size: segment_mb * 1024 * 1024,
        wal_retention: RetentionPolicy {
            max_segments,
            max_age: Duration::from_secs(max_age_secs),
        },
        sstable_dir: env_or("SILT_SSTABLE_DIR", "data/sst").into(),
        memtable_threshold: threshold,
    }
}

fn main() -> Result<()> {
    let log_level = env_or("RUST_LOG", "info").parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = config_from_env();
    println!(
        "SiltKV started (wal={}, sst={}, threshold={})",
        config.wal_dir.display(),
        config.sstable_dir.display(),
        config.memtable_threshold
    );
    let engine = Engine::open(config)?;

    println!("Commands: SET key value | GET key | FLUSH | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "SET" => {
                    if let Some(key) = parts.next() {
                        let value: String = parts.collect::<Vec<&str>>().join(" ");
                        if value.is_empty() {
                            println!("ERR usage: SET key value");
                        } else {
                            match engine.put(Entry::new(key, value.into_bytes())) {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR set failed: {}", e),
                            }
                        }
                    } else {
                        println!("ERR usage: SET key value");
                    }
                }
                "GET" => {
                    if let Some(key) = parts.next() {
                        match engine.get(key) {
                            Ok(entry) => println!("{}", String::from_utf8_lossy(&entry.value)),
                            Err(e) if e.downcast_ref::<NotFound>().is_some() => {
                                println!("(nil)")
                            }
                            Err(e) => println!("ERR read failed: {}", e),
                        }
                    } else {
                        println!("ERR usage: GET key");
                    }
                }
                "FLUSH" => match engine.force_flush() {
                    Ok(()) => println!("OK (sstables={})", engine.sstable_count()),
                    Err(e) => println!("ERR flush failed: {}", e),
                },
                "STATS" => {
                    println!("{:?}", engine);
                }
                "EXIT" | "QUIT" => {
                    engine.close()?;
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {}", other);
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use engine::{Config, Engine, Entry};
    use wal::RetentionPolicy;

    #[test]
    fn engine_round_trip_through_cli_config_shape() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            wal_dir: dir.path().join("wal"),
            wal_segment_size: 1024 * 1024,
            wal_retention: RetentionPolicy {
                max_segments: 4,
                max_age: Duration::from_secs(3600),
            },
            sstable_dir: dir.path().join("sst"),
            memtable_threshold: 8,
        };

        let engine = Engine::open(config).unwrap();
        engine.put(Entry::new("name", b"alice".to_vec())).unwrap();
        assert_eq!(engine.get("name").unwrap().value, b"alice");
        engine.close().unwrap();
    }
}
