//! kvstr CLI Client
//!
//! Command-line interface for interacting with a kvstr server.

use std::io::Write;
use std::time::Duration;

use clap::{Parser, Subcommand};
use kvstr::network::client;
use kvstr::protocol::Request;

/// kvstr CLI
#[derive(Parser, Debug)]
#[command(name = "kvstr-cli")]
#[command(about = "CLI for the kvstr key-value store")]
struct Args {
    /// Server host name or address
    server: String,

    /// Server port
    port: u16,

    /// Give up on a silent server after this many milliseconds (0 = wait forever)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    #[command(alias = "GET")]
    Get {
        /// The key to get
        key: String,
    },

    /// Store a key-value pair
    #[command(alias = "PUT")]
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    #[command(alias = "DEL")]
    Del {
        /// The key to delete
        key: String,
    },
}

impl From<Commands> for Request {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Get { key } => Request::Get { key: key.into_bytes() },
            Commands::Put { key, value } => Request::Put {
                key: key.into_bytes(),
                value: value.into_bytes(),
            },
            Commands::Del { key } => Request::Del { key: key.into_bytes() },
        }
    }
}

fn main() {
    let args = Args::parse();

    let timeout = (args.timeout_ms > 0).then(|| Duration::from_millis(args.timeout_ms));
    let request = Request::from(args.command);
    let message = kvstr::protocol::encode_request(&request);

    let response = match client::send_raw((args.server.as_str(), args.port), &message, timeout) {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Failed to reach {}:{}: {}", args.server, args.port, e);
            std::process::exit(1);
        }
    };

    // Raw response text, exactly as the server sent it
    let mut stdout = std::io::stdout().lock();
    let written = stdout
        .write_all(&response)
        .and_then(|()| stdout.write_all(b"\n"))
        .and_then(|()| stdout.flush());
    if let Err(e) = written {
        eprintln!("Failed to write response: {}", e);
        std::process::exit(1);
    }
}
