//! # Example: production_floor
//!
//! Drives a small factory floor end to end.
//!
//! Shows how to:
//! - Register lines and reject duplicates/empty names
//! - Start every idle line and watch status/progress through observers
//! - Stop all active lines mid-run, then restart the ones that finished
//! - Shut down within the configured grace period
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► add_line("Line A" .. "Line E")
//!   ├─► start_all()              → 5 runs, each at its own pace
//!   ├─► sleep 3s
//!   ├─► stop_all_active()        → runs stop at their next step boundary
//!   ├─► wait_idle()
//!   ├─► start_all()              → every line restarts (latest run replaces the old one)
//!   └─► wait_idle() → shutdown()
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example production_floor
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use linevisor::{Config, Factory, LogObserver, Observer};
use tracing_subscriber::EnvFilter;

/// Prints a compact progress bar per line.
struct Console;

#[async_trait]
impl Observer for Console {
    async fn on_status_changed(&self, line: &str, message: &str) {
        println!("{line}: {message}");
    }

    async fn on_progress_changed(&self, line: &str, percent: f64) {
        let filled = (percent / 10.0).round() as usize;
        println!("{line}: [{}{}] {percent:>5.1}%", "#".repeat(filled), ".".repeat(10 - filled));
    }

    async fn on_active_count_delta(&self, _delta: i32) {}

    fn name(&self) -> &'static str {
        "Console"
    }
}

/// "Line A" → "Line B", wrapping after "Z".
fn next_name(name: &str) -> String {
    let (prefix, last) = match name.char_indices().last() {
        Some((idx, c)) => (&name[..idx], Some(c)),
        None => (name, None),
    };
    let next = match last {
        Some(c) if c.is_ascii_uppercase() && c < 'Z' => (c as u8 + 1) as char,
        _ => 'A',
    };
    format!("{prefix}{next}")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config {
        time_unit: Duration::from_millis(400),
        grace: Duration::from_secs(5),
        ..Config::default()
    };
    let observers: Vec<Arc<dyn Observer>> =
        vec![Arc::new(Console), Arc::new(LogObserver::new())];
    let factory = Factory::builder(cfg).with_observers(observers).build();

    let mut name = "Line A".to_string();
    for _ in 0..5 {
        factory.add_line(&name).await?;
        name = next_name(&name);
    }
    if let Err(err) = factory.add_line("Line A").await {
        println!("rejected: {err} ({})", err.as_label());
    }
    if let Err(err) = factory.add_line("   ").await {
        println!("rejected: {err} ({})", err.as_label());
    }

    println!("started {} lines", factory.start_all().await);
    tokio::time::sleep(Duration::from_secs(3)).await;
    println!("active lines: {}", factory.active_count());

    println!("stop signalled to {} lines", factory.stop_all_active().await);
    factory.wait_idle().await;

    println!("restarted {} lines", factory.start_all().await);
    factory.wait_idle().await;

    factory.shutdown().await?;
    for line in factory.lines().await {
        println!(
            "{:<8} {:<10} step {:>2} {:>5.1}%",
            line.name,
            line.status.as_label(),
            line.current_step,
            line.progress
        );
    }
    Ok(())
}
