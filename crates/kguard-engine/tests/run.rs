//! Run orchestration: concurrency between checks, cancellation, termination.

use kguard_domain::{DataRepository, StaticDataRepository};
use kguard_engine::{CancelToken, Check, CheckError, Registry, Run, RunError};
use kguard_test_util::{self as fixtures, Gate};
use kguard_types::{EvidenceRecord, EvidenceStatus, TargetKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const STANDARD: &str = "CIS_Kubernetes_v1_5";

fn empty_data() -> Arc<dyn DataRepository> {
    Arc::new(StaticDataRepository::new())
}

/// A check that records "before", tells the test it is parked, waits on
/// `gate`, then records "after".
fn blocking_check(id: &str, gate: Gate, entered: mpsc::Sender<()>) -> Check {
    let entered = Mutex::new(entered);
    Check::new(id, TargetKind::Cluster, move |ctx| {
        ctx.note("before")?;
        if let Ok(tx) = entered.lock() {
            let _ = tx.send(());
        }
        gate.wait();
        ctx.note("after")
    })
}

#[test]
fn run_without_checks_returns_ok_immediately() {
    fixtures::init_tracing();
    let run = Run::new(Vec::new());
    let outcome = run.run(
        &CancelToken::new(),
        STANDARD,
        fixtures::domain(&["n1"], &[]),
        empty_data(),
    );
    assert_eq!(outcome, Ok(()));
    assert!(run.results().is_empty());
    assert_eq!(run.wait(), Ok(()));
}

#[test]
fn checks_run_concurrently_and_keep_separate_trees() {
    fixtures::init_tracing();
    let gate = Gate::new();
    let (tx, rx) = mpsc::channel();

    let blocked = blocking_check("blocked", gate.clone(), tx);
    let quick = Check::new("quick", TargetKind::Node, |ctx| {
        ctx.for_each_node(|n| n.pass("node ok"))
    });
    let run = Run::new([Arc::new(blocked), Arc::new(quick)]);
    let domain = fixtures::domain(&["n1", "n2"], &[]);

    thread::scope(|s| {
        let handle = s.spawn(|| run.run(&CancelToken::new(), STANDARD, domain.clone(), empty_data()));

        rx.recv_timeout(Duration::from_secs(10))
            .expect("blocked check should start");

        // The quick check can finish while the other is parked.
        let quick = run.result("quick").expect("quick results");
        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while quick.counts().pass < 2 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(quick.counts().pass, 2);

        // The parked check has recorded exactly what precedes the gate.
        let blocked = run.result("blocked").expect("blocked results");
        assert_eq!(
            blocked.evidence(),
            vec![EvidenceRecord::new(EvidenceStatus::Note, "before")]
        );

        gate.open();
        assert_eq!(handle.join().expect("run thread"), Ok(()));
    });

    let results = run.results();
    let blocked = &results["blocked"];
    assert_eq!(
        blocked.evidence(),
        vec![
            EvidenceRecord::new(EvidenceStatus::Note, "before"),
            EvidenceRecord::new(EvidenceStatus::Note, "after"),
        ]
    );
    assert!(blocked.children().is_empty());

    let quick = &results["quick"];
    assert!(quick.evidence().is_empty());
    assert_eq!(quick.children().len(), 2);
    for (_, child) in quick.children() {
        assert_eq!(
            child.evidence(),
            vec![EvidenceRecord::new(EvidenceStatus::Pass, "node ok")]
        );
    }
}

#[test]
fn terminate_unwinds_blocked_check_on_next_access() {
    fixtures::init_tracing();
    let gate = Gate::new();
    let (tx, rx) = mpsc::channel();
    let run = Run::new([Arc::new(blocking_check("blocked", gate.clone(), tx))]);

    let outcome = thread::scope(|s| {
        let handle = s.spawn(|| {
            run.run(
                &CancelToken::new(),
                STANDARD,
                fixtures::domain(&[], &[]),
                empty_data(),
            )
        });
        rx.recv_timeout(Duration::from_secs(10))
            .expect("blocked check should start");

        assert!(run.terminate("operator requested stop"));
        assert!(!run.terminate("second caller loses"));
        gate.open();
        handle.join().expect("run thread")
    });

    let err = outcome.expect_err("terminated run returns an error");
    assert!(matches!(err, RunError::Terminated { .. }));
    assert!(err.to_string().contains("operator requested stop"));
    // Every later wait observes the identical error.
    assert_eq!(run.wait(), Err(err.clone()));
    assert_eq!(run.wait(), Err(err));

    let blocked = run.result("blocked").expect("results");
    assert_eq!(
        blocked.evidence(),
        vec![EvidenceRecord::new(EvidenceStatus::Note, "before")]
    );
    assert!(
        blocked
            .error()
            .expect("cancellation is recorded on the unwound scope")
            .is_cancellation()
    );
}

#[test]
fn cancelled_token_before_start_yields_no_evidence() {
    fixtures::init_tracing();
    let bodies_past_first_access = Arc::new(AtomicUsize::new(0));
    let counter = bodies_past_first_access.clone();
    let check = Check::new("never", TargetKind::Node, move |ctx| {
        ctx.for_each_node(|n| n.pass("unreachable"))?;
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let token = CancelToken::new();
    token.cancel("maintenance window");

    let run = Run::new([Arc::new(check)]);
    let outcome = run.run(&token, STANDARD, fixtures::domain(&["n1"], &[]), empty_data());

    assert_eq!(
        outcome,
        Err(RunError::Cancelled {
            reason: "maintenance window".to_string()
        })
    );
    let results = run.result("never").expect("results");
    assert_eq!(results.counts().evidence_total(), 0);
    assert!(results.children().is_empty());
    assert!(matches!(results.error(), Some(CheckError::Cancelled(_))));
    assert_eq!(bodies_past_first_access.load(Ordering::SeqCst), 0);
}

#[test]
fn token_cancellation_mid_run_is_returned_from_run() {
    fixtures::init_tracing();
    let gate = Gate::new();
    let (tx, rx) = mpsc::channel();
    let run = Run::new([Arc::new(blocking_check("blocked", gate.clone(), tx))]);
    let token = CancelToken::new();

    let outcome = thread::scope(|s| {
        let handle = s.spawn(|| run.run(&token, STANDARD, fixtures::domain(&[], &[]), empty_data()));
        rx.recv_timeout(Duration::from_secs(10))
            .expect("blocked check should start");
        token.cancel("deadline exceeded");
        // Cancellation is visible to waiters before the check unwinds.
        assert!(run.wait().is_err());
        gate.open();
        handle.join().expect("run thread")
    });

    assert_eq!(
        outcome,
        Err(RunError::Cancelled {
            reason: "deadline exceeded".to_string()
        })
    );
}

#[test]
fn check_past_its_last_access_finishes_after_cancellation() {
    fixtures::init_tracing();
    let gate = Gate::new();
    let (tx, rx) = mpsc::channel();
    let finished = Arc::new(AtomicUsize::new(0));
    let done = finished.clone();
    let tx = Mutex::new(tx);
    let check = Check::new("tail", TargetKind::Cluster, {
        let gate = gate.clone();
        move |ctx| {
            ctx.pass("recorded before cancellation")?;
            if let Ok(tx) = tx.lock() {
                let _ = tx.send(());
            }
            gate.wait();
            // No further context access: cooperative cancellation cannot stop this.
            done.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    });
    let run = Run::new([Arc::new(check)]);

    let outcome = thread::scope(|s| {
        let handle = s.spawn(|| {
            run.run(
                &CancelToken::new(),
                STANDARD,
                fixtures::domain(&[], &[]),
                empty_data(),
            )
        });
        rx.recv_timeout(Duration::from_secs(10)).expect("started");
        run.terminate("stop");
        gate.open();
        handle.join().expect("run thread")
    });

    assert!(outcome.is_err());
    assert_eq!(finished.load(Ordering::SeqCst), 1);
    let results = run.result("tail").expect("results");
    assert_eq!(results.evidence().len(), 1);
    assert!(results.error().is_none());
}

#[test]
fn terminate_after_completion_changes_nothing() {
    fixtures::init_tracing();
    let check = Check::new("done", TargetKind::Cluster, |ctx| ctx.pass("ok"));
    let run = Run::new([Arc::new(check)]);
    let outcome = run.run(
        &CancelToken::new(),
        STANDARD,
        fixtures::domain(&[], &[]),
        empty_data(),
    );
    assert_eq!(outcome, Ok(()));
    assert!(!run.terminate("too late"));
    assert_eq!(run.wait(), Ok(()));
    assert!(run.result("done").expect("results").error().is_none());
}

#[test]
fn a_run_executes_at_most_once() {
    fixtures::init_tracing();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let check = Check::new("once", TargetKind::Cluster, move |ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        ctx.pass("ran")
    });
    let run = Run::new([Arc::new(check)]);
    let domain = fixtures::domain(&[], &[]);

    assert_eq!(
        run.run(&CancelToken::new(), STANDARD, domain.clone(), empty_data()),
        Ok(())
    );
    assert_eq!(
        run.run(&CancelToken::new(), STANDARD, domain, empty_data()),
        Ok(())
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(run.result("once").expect("results").evidence().len(), 1);
}

#[test]
fn registry_feeds_a_run() {
    fixtures::init_tracing();
    let registry = Registry::new();
    registry
        .register(Check::new("cluster.note", TargetKind::Cluster, |ctx| {
            ctx.note("cluster scanned")
        }))
        .expect("register");
    registry
        .register(
            Check::new("node.pass", TargetKind::Node, |ctx| {
                ctx.for_each_node(|n| n.pass("ok"))
            })
            .with_interpretation("Every node passes."),
        )
        .expect("register");

    let run = Run::new(registry.all());
    let outcome = run.run(
        &CancelToken::new(),
        STANDARD,
        fixtures::domain(&["n1"], &[]),
        empty_data(),
    );
    assert_eq!(outcome, Ok(()));

    let checks = run.checks();
    assert_eq!(checks.keys().cloned().collect::<Vec<_>>(), registry.ids());
    assert_eq!(checks["node.pass"].interpretation_text(), "Every node passes.");
    assert_eq!(run.results()["node.pass"].counts().pass, 1);
    assert_eq!(run.results()["cluster.note"].counts().note, 1);
}

#[test]
fn duplicate_checks_in_a_run_are_deduplicated() {
    let check = Arc::new(Check::new("dup", TargetKind::Cluster, |ctx| ctx.pass("ok")));
    let run = Run::new([check.clone(), check]);
    assert_eq!(run.len(), 1);
    run.run(
        &CancelToken::new(),
        STANDARD,
        fixtures::domain(&[], &[]),
        empty_data(),
    )
    .expect("run");
    assert_eq!(run.result("dup").expect("results").evidence().len(), 1);
}
