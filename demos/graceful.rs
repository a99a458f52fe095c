//! # Example: graceful
//!
//! A service loop with four resources that shuts down on Ctrl+C.
//!
//! Demonstrates how to:
//! - Subscribe to `SIGINT` and register resources with and without deadlines.
//! - Observe the shutdown through [`LogWriter`] and a report callback.
//! - Stop the main loop from inside a close operation.
//!
//! ## Flow
//! ```text
//! Ctrl+C ──► Monitor
//!   ├─► "main loop"  (releases the loop, Ok)
//!   ├─► "app3"       (Err: flush failed)
//!   ├─► "app2"       (Ok after 100ms)
//!   ├─► "app1"       (needs 1s, deadline 500ms → timeout)
//!   ├─► callback(&report)
//!   └─► wait() == true
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=termvisor=debug cargo run --example graceful --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use termvisor::{CloseError, Config, LogWriter, Signal, Subscribe, Terminator};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Route tracing records to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("termvisor=info")),
        )
        .init();

    // 2. Subscribe to Ctrl+C only, with the log writer attached
    let cfg = Config::with_signals([Signal::Interrupt]);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let term = Terminator::builder(cfg).with_subscribers(subs).build()?;

    // 3. Register resources; they close last-registered first
    term.add_with_timeout(
        "app1",
        |_ctx: CancellationToken| async {
            println!("[app1] closing");
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        },
        Duration::from_millis(500),
    )?;

    term.add("app2", |_ctx: CancellationToken| async {
        println!("[app2] closing");
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(())
    })?;

    term.add("app3", |_ctx: CancellationToken| async {
        println!("[app3] closing");
        tokio::time::sleep(Duration::from_millis(200)).await;
        Err(CloseError::failed("flush failed"))
    })?;

    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    term.add("main loop", move |_ctx: CancellationToken| async move {
        let _ = stop_tx.send(());
        Ok(())
    })?;

    // 4. Print the report once every resource has an outcome
    term.set_callback(|report| {
        println!("terminated by {}", report.signal);
        for o in &report.outcomes {
            match &o.error {
                Some(e) => println!("  {:<10} {} ({e})", o.name, o.status),
                None => println!("  {:<10} {}", o.name, o.status),
            }
        }
        println!("  failures: {}", report.failed_or_timeout_count);
    })?;

    println!("running; press Ctrl+C to stop");
    loop {
        tokio::select! {
            _ = &mut stop_rx => {
                println!("main loop released");
                break;
            }
            _ = tokio::time::sleep(Duration::from_secs(1)) => println!("working"),
        }
    }

    // 5. Give the remaining resources time to close
    if !term.wait(Duration::from_secs(5)).await {
        eprintln!("shutdown did not complete in time");
    }
    Ok(())
}
