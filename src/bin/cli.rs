//! memwire CLI Client
//!
//! Command-line interface for issuing single memcached commands.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use memwire::{Client, Config, StatValue};
use tracing_subscriber::{fmt, EnvFilter};

/// memwire CLI
#[derive(Parser, Debug)]
#[command(name = "memwire-cli")]
#[command(about = "CLI for memcached over the text protocol")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = memwire::config::DEFAULT_SERVER)]
    server: String,

    /// Read/write timeout in milliseconds (0 disables)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Connect timeout in milliseconds (0 disables)
    #[arg(long, default_value = "2000")]
    connect_timeout_ms: u64,

    /// Set TCP_NODELAY on the socket
    #[arg(long)]
    no_delay: bool,

    /// Prefix applied to every key
    #[arg(short, long, default_value = "")]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Get a value and its CAS token
    Gets {
        key: String,
    },

    /// Store a value
    Set {
        key: String,
        value: String,
        /// Expiration in seconds (0 = never)
        #[arg(short, long, default_value = "0")]
        expire: u32,
    },

    /// Store a value only if the key is absent
    Add {
        key: String,
        value: String,
        #[arg(short, long, default_value = "0")]
        expire: u32,
    },

    /// Store a value only if the key exists
    Replace {
        key: String,
        value: String,
        #[arg(short, long, default_value = "0")]
        expire: u32,
    },

    /// Append to an existing value
    Append {
        key: String,
        value: String,
    },

    /// Prepend to an existing value
    Prepend {
        key: String,
        value: String,
    },

    /// Delete a key
    Delete {
        key: String,
    },

    /// Increment a counter
    Incr {
        key: String,
        #[arg(default_value = "1")]
        amount: u64,
    },

    /// Decrement a counter
    Decr {
        key: String,
        #[arg(default_value = "1")]
        amount: u64,
    },

    /// Update a key's expiration
    Touch {
        key: String,
        expire: u32,
    },

    /// Print server statistics
    Stats {
        /// Stats group, e.g. "settings" or "items"
        args: Vec<String>,
    },

    /// Invalidate all items
    FlushAll {
        #[arg(default_value = "0")]
        delay: u32,
    },

    /// Print the server version
    Version,
}

fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,memwire=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut builder = Config::builder()
        .server(&args.server)
        .no_delay(args.no_delay)
        .key_prefix(args.prefix.as_bytes());
    if args.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(args.timeout_ms));
    }
    if args.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(args.connect_timeout_ms));
    }

    let mut client = Client::new(builder.build());
    let result = run(&mut client, args.command);
    let _ = client.quit();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{} failed: {}", args.server, e);
            ExitCode::FAILURE
        }
    }
}

fn run(client: &mut Client, command: Commands) -> memwire::Result<()> {
    match command {
        Commands::Get { key } => match client.get(&key)? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("(miss)"),
        },
        Commands::Gets { key } => match client.gets(&key)? {
            Some((value, cas)) => println!("{} (cas {})", String::from_utf8_lossy(&value), cas),
            None => println!("(miss)"),
        },
        Commands::Set { key, value, expire } => {
            print_stored(client.set(&key, value.as_bytes(), expire, false)?)
        }
        Commands::Add { key, value, expire } => {
            print_stored(client.add(&key, value.as_bytes(), expire, false)?)
        }
        Commands::Replace { key, value, expire } => {
            print_stored(client.replace(&key, value.as_bytes(), expire, false)?)
        }
        Commands::Append { key, value } => {
            print_stored(client.append(&key, value.as_bytes(), 0, false)?)
        }
        Commands::Prepend { key, value } => {
            print_stored(client.prepend(&key, value.as_bytes(), 0, false)?)
        }
        Commands::Delete { key } => {
            if client.delete(&key, false)? {
                println!("DELETED");
            } else {
                println!("NOT_FOUND");
            }
        }
        Commands::Incr { key, amount } => print_counter(client.incr(&key, amount, false)?),
        Commands::Decr { key, amount } => print_counter(client.decr(&key, amount, false)?),
        Commands::Touch { key, expire } => {
            if client.touch(&key, expire, false)? {
                println!("TOUCHED");
            } else {
                println!("NOT_FOUND");
            }
        }
        Commands::Stats { args } => {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            let mut stats: Vec<(String, StatValue)> = client.stats(&args)?.into_iter().collect();
            stats.sort_by(|a, b| a.0.cmp(&b.0));
            for (name, value) in stats {
                match value {
                    StatValue::Int(v) => println!("{} {}", name, v),
                    StatValue::Float(v) => println!("{} {}", name, v),
                    StatValue::Bool(v) => println!("{} {}", name, v),
                    StatValue::Text(v) => println!("{} {}", name, v),
                }
            }
        }
        Commands::FlushAll { delay } => {
            client.flush_all(delay, false)?;
            println!("OK");
        }
        Commands::Version => println!("{}", client.version()?),
    }
    Ok(())
}

fn print_stored(stored: bool) {
    if stored {
        println!("STORED");
    } else {
        println!("NOT_STORED");
    }
}

fn print_counter(value: Option<u64>) {
    match value {
        Some(v) => println!("{}", v),
        None => println!("NOT_FOUND"),
    }
}
