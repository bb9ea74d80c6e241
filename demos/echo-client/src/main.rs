//! Interactive roomlink client.
//!
//! ```text
//! cargo run -p echo-client -- ws://localhost:8080/rooms ABCD
//! ```
//!
//! Each stdin line is sent as an envelope: `event {json}` sends `event`
//! with that payload, anything else is sent as `chat` with `{"text": line}`.
//! Lines typed while the server is unreachable are queued and delivered in
//! order once the connection comes back. Ctrl-D disconnects.

use roomlink::prelude::*;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: echo-client <ws-base-url> <destination>";

/// Splits an input line into an event name and payload.
fn parse_line(line: &str) -> (String, Value) {
    if let Some((event, rest)) = line.split_once(' ') {
        if let Ok(payload) = serde_json::from_str::<Value>(rest) {
            if !event.is_empty() {
                return (event.to_string(), payload);
            }
        }
    }
    ("chat".to_string(), json!({ "text": line }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(base_url), Some(destination)) = (args.next(), args.next()) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let manager = ConnectionManager::new(WebSocketConnector::new(base_url));

    for event in [
        lifecycle::CONNECTED,
        lifecycle::DISCONNECTED,
        lifecycle::RECONNECTING,
        lifecycle::CONNECTION_FAILED,
        lifecycle::MESSAGE_QUEUED,
        lifecycle::MESSAGE_FAILED,
        lifecycle::ERROR,
    ] {
        manager.on(event, move |data| tracing::info!(event, %data, "lifecycle"))?;
    }
    manager.on("chat", |data| println!("< {data}"))?;

    manager.connect(destination.as_str())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (event, payload) = parse_line(line);
        manager.send(event, payload)?;
    }

    manager.disconnect().await?;
    Ok(())
}
