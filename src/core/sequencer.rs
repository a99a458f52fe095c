//! # Close every registered resource, last registered first.
//!
//! Each close operation runs on its own spawned task with its own
//! [`CancellationToken`], so its deadline is enforced independently of the
//! operation's pace. The loop still waits for each outcome before moving on:
//! resources are closed strictly one at a time.
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   ResourceClosing → closer.close() → Ok(())      → ResourceClosed
//!
//! Failure:
//!   ResourceClosing → closer.close() → Err(e)      → ResourceFailed
//!   ResourceClosing → closer.close() → panic       → ResourceFailed (panicked)
//!
//! Deadline:
//!   ResourceClosing → deadline elapsed → cancel ctx → DeadlineHit
//!                                                   → ResourceFailed (timeout)
//!                     (task detached; its eventual result is discarded)
//!   ResourceClosing → Ok/Err after the deadline      → DeadlineHit
//!                                                   → ResourceFailed (timeout)
//!
//! After the last resource:
//!   SequenceCompleted
//! ```
//!
//! ## Rules
//! - Every resource is attempted exactly once; failures never abort the loop
//! - No retries
//! - A timed-out operation is **not** aborted; it may keep running unobserved

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::CloseError;
use crate::events::{Bus, Event, EventKind};
use crate::report::{Outcome, TerminationReport};
use crate::resources::ResourceSpec;
use crate::signals::Signal;
use crate::subscribers::panic_message;

/// Closes `resources` in reverse order and assembles the report.
pub(crate) async fn close_all(
    signal: &Signal,
    resources: Vec<ResourceSpec>,
    bus: &Bus,
) -> TerminationReport {
    let started = Instant::now();
    let mut report = TerminationReport::new(signal.clone(), resources.len());

    for (idx, spec) in resources.into_iter().rev().enumerate() {
        let outcome = close_one(spec, signal, idx + 1, bus).await;
        report.record(outcome);
    }

    bus.publish(
        Event::new(EventKind::SequenceCompleted)
            .with_signal(signal.clone())
            .with_position(report.failed_or_timeout_count)
            .with_elapsed(started.elapsed()),
    );
    report
}

/// Runs one close operation under its deadline and records the outcome.
async fn close_one(spec: ResourceSpec, signal: &Signal, position: usize, bus: &Bus) -> Outcome {
    let (name, deadline, closer) = spec.into_parts();
    let label: Arc<str> = Arc::from(name.as_ref());

    let mut closing = Event::new(EventKind::ResourceClosing)
        .with_resource(label.clone())
        .with_signal(signal.clone())
        .with_position(position);
    if let Some(d) = deadline {
        closing = closing.with_deadline(d);
    }
    bus.publish(closing);

    let ctx = CancellationToken::new();
    let started = Instant::now();
    let mut join = tokio::spawn(closer.close(ctx.clone()));

    let res = match deadline {
        Some(dur) => match time::timeout(dur, &mut join).await {
            // finishing after the deadline is a timeout even if the timer never fired
            Ok(joined) if started.elapsed() < dur => flatten(joined),
            _ => {
                ctx.cancel();
                publish_deadline(bus, &label, signal, position, dur);
                Err(CloseError::Timeout { timeout: dur })
            }
        },
        None => flatten(join.await),
    };
    let elapsed = started.elapsed();

    match &res {
        Ok(()) => bus.publish(
            Event::new(EventKind::ResourceClosed)
                .with_resource(label)
                .with_signal(signal.clone())
                .with_position(position)
                .with_elapsed(elapsed),
        ),
        Err(e) => bus.publish(
            Event::new(EventKind::ResourceFailed)
                .with_resource(label)
                .with_signal(signal.clone())
                .with_position(position)
                .with_reason(e.to_string())
                .with_elapsed(elapsed),
        ),
    }

    Outcome::from_result(name, res, elapsed)
}

/// Maps a joined close task onto a close result.
fn flatten(joined: Result<Result<(), CloseError>, JoinError>) -> Result<(), CloseError> {
    match joined {
        Ok(res) => res,
        Err(je) if je.is_panic() => Err(CloseError::Panicked {
            info: panic_message(&*je.into_panic()),
        }),
        // runtime shutting down underneath us
        Err(_) => Err(CloseError::Canceled),
    }
}

/// Publishes `DeadlineHit` (always followed by `ResourceFailed`).
fn publish_deadline(bus: &Bus, name: &Arc<str>, signal: &Signal, position: usize, dur: Duration) {
    bus.publish(
        Event::new(EventKind::DeadlineHit)
            .with_resource(name.clone())
            .with_signal(signal.clone())
            .with_position(position)
            .with_deadline(dur),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::report::CloseStatus;

    fn noop(name: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> ResourceSpec {
        ResourceSpec::from_fn(name, move |_ctx: CancellationToken| async move {
            log.lock().unwrap().push(name);
            Ok(())
        })
    }

    #[tokio::test]
    async fn closes_in_reverse_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let specs = vec![
            noop("first", log.clone()),
            noop("second", log.clone()),
            noop("third", log.clone()),
        ];

        let report = close_all(&Signal::Interrupt, specs, &Bus::new(64)).await;

        assert_eq!(*log.lock().unwrap(), ["third", "second", "first"]);
        assert_eq!(
            report.names().collect::<Vec<_>>(),
            ["third", "second", "first"]
        );
        assert!(report.is_clean());
    }

    async fn explode() -> Result<(), CloseError> {
        panic!("closer exploded")
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_sequence() {
        let specs = vec![
            ResourceSpec::from_fn("ok", |_ctx: CancellationToken| async { Ok(()) }),
            ResourceSpec::from_fn("bad", |_ctx: CancellationToken| async {
                Err(CloseError::failed("disk full"))
            }),
            ResourceSpec::from_fn("boom", |_ctx: CancellationToken| explode()),
        ];

        let report = close_all(&Signal::Terminate, specs, &Bus::new(64)).await;

        assert_eq!(report.failed_or_timeout_count, 2);
        assert_eq!(
            report.outcomes[0].error,
            Some(CloseError::Panicked {
                info: "closer exploded".into()
            })
        );
        assert_eq!(report.outcomes[1].error, Some(CloseError::failed("disk full")));
        assert_eq!(report.outcomes[2].status, CloseStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_records_timeout_and_cancels_context() {
        let saw_cancel = Arc::new(AtomicBool::new(false));
        let flag = saw_cancel.clone();
        let spec = ResourceSpec::from_fn("slow", move |ctx: CancellationToken| async move {
            ctx.cancelled().await;
            flag.store(true, Ordering::SeqCst);
            // keeps running past the deadline; result must be ignored
            time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .with_deadline(Duration::from_millis(500));

        let report = close_all(&Signal::Interrupt, vec![spec], &Bus::new(64)).await;

        let outcome = &report.outcomes[0];
        assert_eq!(outcome.status, CloseStatus::Failed);
        assert!(outcome.is_timeout());
        assert_eq!(report.failed_or_timeout_count, 1);

        for _ in 0..16 {
            if saw_cancel.load(Ordering::SeqCst) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(saw_cancel.load(Ordering::SeqCst));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn blocking_close_past_deadline_is_a_timeout() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let spec = ResourceSpec::from_fn("stuck", |_ctx: CancellationToken| async {
            std::thread::sleep(Duration::from_millis(300));
            Ok(())
        })
        .with_deadline(Duration::from_millis(100));

        let report = close_all(&Signal::Interrupt, vec![spec], &bus).await;

        let outcome = &report.outcomes[0];
        assert_eq!(outcome.status, CloseStatus::Failed);
        assert_eq!(
            outcome.error,
            Some(CloseError::Timeout {
                timeout: Duration::from_millis(100)
            })
        );
        assert!(outcome.elapsed >= Duration::from_millis(300));
        assert_eq!(report.failed_or_timeout_count, 1);

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert!(kinds.contains(&EventKind::DeadlineHit));
    }

    #[tokio::test(start_paused = true)]
    async fn completion_before_deadline_wins() {
        let spec = ResourceSpec::from_fn("quick", |_ctx: CancellationToken| async {
            time::sleep(Duration::from_millis(100)).await;
            Err(CloseError::failed("refused"))
        })
        .with_deadline(Duration::from_secs(1));

        let report = close_all(&Signal::Interrupt, vec![spec], &Bus::new(64)).await;
        assert_eq!(report.outcomes[0].error, Some(CloseError::failed("refused")));
    }

    #[tokio::test(start_paused = true)]
    async fn no_deadline_runs_to_completion() {
        let spec = ResourceSpec::from_fn("patient", |_ctx: CancellationToken| async {
            time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        });

        let report = close_all(&Signal::Interrupt, vec![spec], &Bus::new(64)).await;
        assert!(report.outcomes[0].is_success());
        assert!(report.outcomes[0].elapsed >= Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn events_follow_close_flow() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let specs = vec![
            ResourceSpec::from_fn("a", |_ctx: CancellationToken| async { Ok(()) }),
            ResourceSpec::from_fn("b", |_ctx: CancellationToken| async {
                Err(CloseError::Canceled)
            }),
        ];

        let _ = close_all(&Signal::Quit, specs, &bus).await;

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push((ev.kind, ev.resource.map(|r| r.to_string())));
        }
        assert_eq!(
            kinds,
            vec![
                (EventKind::ResourceClosing, Some("b".to_string())),
                (EventKind::ResourceFailed, Some("b".to_string())),
                (EventKind::ResourceClosing, Some("a".to_string())),
                (EventKind::ResourceClosed, Some("a".to_string())),
                (EventKind::SequenceCompleted, None),
            ]
        );
    }
}
