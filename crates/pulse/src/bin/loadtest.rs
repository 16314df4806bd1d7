//! Load test binary - floods the write endpoint with randomized heartbeats
//!
//! Run against a live server to measure ingestion throughput:
//!
//! ```bash
//! cargo run --release -p pulse --bin loadtest -- --events 1000000 --clients 16
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tokio::task::JoinSet;

/// Load test configuration
#[derive(Parser, Debug)]
#[command(name = "loadtest", about = "Pulse write-path load test")]
struct Args {
    /// Server base URL
    #[arg(short, long, default_value = "http://127.0.0.1:7070")]
    server: String,

    /// Total events to send
    #[arg(short, long, default_value = "1000000")]
    events: u64,

    /// Number of concurrent clients
    #[arg(short, long, default_value = "16")]
    clients: u64,

    /// Progress report interval in seconds
    #[arg(short, long, default_value = "1")]
    report_interval: u64,
}

const ROOM_TYPES: [i32; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
const SERVER_IDS: [i32; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

fn random_heartbeat() -> serde_json::Value {
    serde_json::json!({
        "user_id": 1_000_000 + rand::random_range(0..500),
        "room_id": 1000 + rand::random_range(0..30),
        "room_type": ROOM_TYPES[rand::random_range(0..ROOM_TYPES.len())],
        "server_id": SERVER_IDS[rand::random_range(0..SERVER_IDS.len())],
        "created_at": chrono::Utc::now().timestamp_millis(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let url = format!("{}/api/write", args.server.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let sent = Arc::new(AtomicU64::new(0));
    let rejected = Arc::new(AtomicU64::new(0));
    let start = Instant::now();

    println!(
        "loadtest: {} events, {} clients -> {}",
        args.events, args.clients, url
    );

    let reporter = tokio::spawn({
        let sent = Arc::clone(&sent);
        let rejected = Arc::clone(&rejected);
        let interval = Duration::from_secs(args.report_interval.max(1));
        let total = args.events;
        async move {
            let mut last_sent = 0u64;
            loop {
                tokio::time::sleep(interval).await;
                let now_sent = sent.load(Ordering::Relaxed);
                let rate = (now_sent - last_sent) / interval.as_secs();
                println!(
                    "  {}/{} sent, {} rejected, {} req/s",
                    now_sent,
                    total,
                    rejected.load(Ordering::Relaxed),
                    rate
                );
                last_sent = now_sent;
                if now_sent >= total {
                    break;
                }
            }
        }
    });

    let per_client = args.events / args.clients.max(1);
    let mut workers = JoinSet::new();
    for _ in 0..args.clients.max(1) {
        let client = client.clone();
        let url = url.clone();
        let sent = Arc::clone(&sent);
        let rejected = Arc::clone(&rejected);
        workers.spawn(async move {
            for _ in 0..per_client {
                let response = client.post(&url).json(&random_heartbeat()).send().await;
                match response {
                    Ok(r) if r.status().is_success() => {
                        sent.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(_) | Err(_) => {
                        // backpressure or transport error; the server is
                        // allowed to shed load
                        rejected.fetch_add(1, Ordering::Relaxed);
                        sent.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });
    }
    while workers.join_next().await.is_some() {}
    reporter.abort();

    let elapsed = start.elapsed();
    let accepted = sent.load(Ordering::Relaxed) - rejected.load(Ordering::Relaxed);
    println!(
        "done: {} accepted, {} rejected in {:.1}s ({:.0} req/s)",
        accepted,
        rejected.load(Ordering::Relaxed),
        elapsed.as_secs_f64(),
        sent.load(Ordering::Relaxed) as f64 / elapsed.as_secs_f64()
    );
    Ok(())
}
