//! Drives the full loop against the in-memory runtime with scripted probes
//! and a recording backend.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use pinger::client::fake::{FakeContainer, FakeRuntime};
use pinger::conf::PingerConfig;
use pinger::job::{CycleError, Pinger};
use pinger::probe::{ProbeResult, Prober};
use pinger::report::{Delivery, PingReport, ReportError, Reporter};

const NET: &str = "my_network";

/// Answers from a fixed table; unknown addresses time out.
#[derive(Default)]
struct ScriptedProber {
    answers: HashMap<String, ProbeResult>,
    hang: bool,
    probed: Mutex<Vec<String>>,
}

impl ScriptedProber {
    fn answering(pairs: &[(&str, u64)]) -> Self {
        Self {
            answers: pairs.iter()
                .map(|(ip, ms)| (ip.to_string(), ProbeResult::succeeded(*ms)))
                .collect(),
            ..Default::default()
        }
    }

    fn hanging() -> Self {
        Self { hang: true, ..Default::default() }
    }
}

impl Prober for ScriptedProber {
    fn probe<'a>(&'a self, address: &'a str) -> Pin<Box<dyn Future<Output = ProbeResult> + Send + 'a>> {
        Box::pin(async move {
            self.probed.lock().await.push(address.to_string());
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.answers.get(address).copied().unwrap_or_else(ProbeResult::failed)
        })
    }
}

/// Upserts into a map the way the registry does.
#[derive(Default)]
struct RecordingBackend {
    records: Mutex<HashMap<String, PingReport>>,
    calls: Mutex<Vec<String>>,
    down: HashSet<String>,
}

impl Reporter for RecordingBackend {
    fn deliver<'a>(
        &'a self,
        ip: &'a str,
        report: &'a PingReport,
    ) -> Pin<Box<dyn Future<Output = Result<Delivery, ReportError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.lock().await.push(ip.to_string());
            if self.down.contains(ip) {
                return Err(ReportError::Transport("connection refused".to_string()));
            }
            let created = self.records.lock().await.insert(ip.to_string(), report.clone()).is_none();
            Ok(Delivery::Delivered { created })
        })
    }
}

fn config() -> PingerConfig {
    PingerConfig {
        network: NET.to_string(),
        interval_secs: 1,
        ..Default::default()
    }
}

fn pinger(
    runtime: &Arc<FakeRuntime>,
    prober: &Arc<ScriptedProber>,
    backend: &Arc<RecordingBackend>,
    config: PingerConfig,
) -> Pinger {
    Pinger::new(runtime.clone(), prober.clone(), backend.clone(), config)
}

#[tokio::test]
async fn test_fresh_host_converges_and_reports() {
    let runtime = Arc::new(FakeRuntime::new());
    for id in ["aaa", "bbb", "ccc"] {
        runtime.add_container(FakeContainer::running(id, "nginx")).await;
    }
    // The fake hands out 172.28.0.2.. on restart, in restart order.
    let prober = Arc::new(ScriptedProber::answering(&[
        ("172.28.0.2", 3),
        ("172.28.0.3", 4),
        ("172.28.0.4", 5),
    ]));
    let backend = Arc::new(RecordingBackend::default());
    let p = pinger(&runtime, &prober, &backend, config());
    let cancel = CancellationToken::new();

    let first = p.run_cycle(&cancel).await.unwrap();
    assert!(first.reconcile.network_created);
    assert_eq!(first.reconcile.activated_count(), 3);
    assert_eq!(first.discovered, 3);
    assert_eq!(first.probed, 3);
    assert_eq!(first.delivered, 3);
    assert_eq!(first.created, 3);

    let second = p.run_cycle(&cancel).await.unwrap();
    assert!(second.reconcile.is_converged());
    assert_eq!(second.delivered, 3);
    assert_eq!(second.created, 0, "second report for an address must update, not create");

    assert_eq!(runtime.attach_calls().await.len(), 3);
    assert_eq!(runtime.restart_calls().await.len(), 3);
    assert_eq!(backend.records.lock().await.len(), 3);
}

#[tokio::test]
async fn test_timed_out_probe_is_not_reported() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.add_container(FakeContainer::running("aaa", "nginx").on_network(NET, "10.0.0.5")).await;
    runtime.add_container(FakeContainer::running("bbb", "redis").on_network(NET, "10.0.0.9")).await;
    let prober = Arc::new(ScriptedProber::answering(&[("10.0.0.9", 12)]));
    let backend = Arc::new(RecordingBackend::default());
    let p = pinger(&runtime, &prober, &backend, config());

    let summary = p.run_cycle(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.probed, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(*backend.calls.lock().await, vec!["10.0.0.9".to_string()]);
    let records = backend.records.lock().await;
    assert_eq!(records["10.0.0.9"].ping_time, 12);
    assert!(records["10.0.0.9"].is_successful);
    assert!(!records.contains_key("10.0.0.5"));
}

#[tokio::test]
async fn test_container_without_address_is_not_probed() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.add_network(NET).await;
    runtime.add_container(FakeContainer::running("aaa", "nginx")).await;
    let prober = Arc::new(ScriptedProber::default());
    let backend = Arc::new(RecordingBackend::default());
    let config = PingerConfig { restart_on_attach: false, ..config() };
    let p = pinger(&runtime, &prober, &backend, config);

    let summary = p.run_cycle(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.reconcile.attach_count(), 1);
    assert_eq!(summary.discovered, 1);
    assert_eq!(summary.probed, 0);
    assert!(prober.probed.lock().await.is_empty());
}

#[tokio::test]
async fn test_delivery_failure_does_not_stop_the_cycle() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.add_container(FakeContainer::running("aaa", "nginx").on_network(NET, "10.0.0.2")).await;
    runtime.add_container(FakeContainer::running("bbb", "redis").on_network(NET, "10.0.0.3")).await;
    let prober = Arc::new(ScriptedProber::answering(&[("10.0.0.2", 1), ("10.0.0.3", 1)]));
    let backend = Arc::new(RecordingBackend {
        down: HashSet::from(["10.0.0.2".to_string()]),
        ..Default::default()
    });
    let p = pinger(&runtime, &prober, &backend, config());

    let summary = p.run_cycle(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.report_failures, 1);
    assert_eq!(summary.delivered, 1);
    assert!(backend.records.lock().await.contains_key("10.0.0.3"));
    assert_eq!(p.metrics().snapshot().reports_failed, 1);
}

#[tokio::test]
async fn test_unreachable_runtime_aborts_the_cycle() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.set_unreachable(true).await;
    let prober = Arc::new(ScriptedProber::default());
    let backend = Arc::new(RecordingBackend::default());
    let p = pinger(&runtime, &prober, &backend, config());

    let err = p.run_cycle(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, CycleError::Runtime(ref e) if e.is_unreachable()));
    assert!(backend.calls.lock().await.is_empty());
}

#[tokio::test]
async fn test_transient_listing_error_does_not_abort_the_cycle() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.add_container(FakeContainer::running("aaa", "nginx").on_network(NET, "10.0.0.2")).await;
    // Only the reconcile pass sees the 500; the collector's listing succeeds.
    runtime.fail_list(1).await;
    let prober = Arc::new(ScriptedProber::answering(&[("10.0.0.2", 2)]));
    let backend = Arc::new(RecordingBackend::default());
    let p = pinger(&runtime, &prober, &backend, config());

    let summary = p.run_cycle(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.reconcile, Default::default());
    assert_eq!(summary.discovered, 1);
    assert_eq!(summary.delivered, 1);
    assert!(backend.records.lock().await.contains_key("10.0.0.2"));
    assert_eq!(p.metrics().snapshot().fatal_cycles, 0);
}

#[tokio::test]
async fn test_listing_errors_in_every_step_leave_nothing_to_report() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.add_container(FakeContainer::running("aaa", "nginx").on_network(NET, "10.0.0.2")).await;
    runtime.fail_list(2).await;
    let prober = Arc::new(ScriptedProber::answering(&[("10.0.0.2", 2)]));
    let backend = Arc::new(RecordingBackend::default());
    let p = pinger(&runtime, &prober, &backend, config());

    let summary = p.run_cycle(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.discovered, 0);
    assert_eq!(summary.probed, 0);
    assert!(backend.calls.lock().await.is_empty());
}

#[tokio::test]
async fn test_failed_network_create_does_not_abort_the_cycle() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.add_container(FakeContainer::running("aaa", "nginx")).await;
    runtime.fail_create_network(500).await;
    let prober = Arc::new(ScriptedProber::default());
    let backend = Arc::new(RecordingBackend::default());
    let p = pinger(&runtime, &prober, &backend, config());

    let summary = p.run_cycle(&CancellationToken::new()).await.unwrap();

    assert!(!summary.reconcile.network_created);
    assert_eq!(summary.discovered, 0);
    assert!(runtime.attach_calls().await.is_empty());
}

#[tokio::test]
async fn test_network_inspect_error_aborts_the_cycle() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.add_container(FakeContainer::running("aaa", "nginx").on_network(NET, "10.0.0.2")).await;
    runtime.fail_network_inspect("permission denied").await;
    let prober = Arc::new(ScriptedProber::answering(&[("10.0.0.2", 2)]));
    let backend = Arc::new(RecordingBackend::default());
    let p = pinger(&runtime, &prober, &backend, config());

    let err = p.run_cycle(&CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, CycleError::Runtime(ref e) if !e.is_unreachable()));
    assert!(prober.probed.lock().await.is_empty());
}

#[tokio::test]
async fn test_parallel_probing_reports_every_address() {
    let runtime = Arc::new(FakeRuntime::new());
    let mut answers = Vec::new();
    for n in 2..10 {
        let ip = format!("10.0.0.{}", n);
        runtime.add_container(FakeContainer::running(&format!("c{}", n), "nginx").on_network(NET, &ip)).await;
        answers.push(ip);
    }
    let pairs: Vec<(&str, u64)> = answers.iter().map(|ip| (ip.as_str(), 1)).collect();
    let prober = Arc::new(ScriptedProber::answering(&pairs));
    let backend = Arc::new(RecordingBackend::default());
    let mut config = config();
    config.probe.concurrency = 4;
    let p = pinger(&runtime, &prober, &backend, config);

    let summary = p.run_cycle(&CancellationToken::new()).await.unwrap();

    assert_eq!(summary.probed, 8);
    assert_eq!(summary.delivered, 8);
    assert_eq!(backend.records.lock().await.len(), 8);
}

#[tokio::test]
async fn test_cancel_interrupts_a_hung_probe() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.add_container(FakeContainer::running("aaa", "nginx").on_network(NET, "10.0.0.5")).await;
    let prober = Arc::new(ScriptedProber::hanging());
    let backend = Arc::new(RecordingBackend::default());
    let p = pinger(&runtime, &prober, &backend, config());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), p.run_cycle(&cancel))
        .await
        .expect("cycle should return once cancelled");
    assert!(matches!(result, Err(CycleError::Cancelled)));
    assert!(backend.calls.lock().await.is_empty());
}

#[tokio::test]
async fn test_run_stops_on_cancel() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.add_container(FakeContainer::running("aaa", "nginx").on_network(NET, "10.0.0.2")).await;
    let prober = Arc::new(ScriptedProber::answering(&[("10.0.0.2", 1)]));
    let backend = Arc::new(RecordingBackend::default());
    let config = PingerConfig { interval_secs: 3600, ..config() };
    let p = Arc::new(pinger(&runtime, &prober, &backend, config));
    let cancel = CancellationToken::new();

    let handle = {
        let p = p.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { p.run(cancel).await })
    };

    // Wait for the first cycle, then stop the loop while it sleeps.
    tokio::time::timeout(Duration::from_secs(5), async {
        while p.metrics().snapshot().cycles == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("first cycle should complete");
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop should stop promptly")
        .unwrap();
    assert_eq!(p.metrics().snapshot().cycles, 1);
    assert_eq!(backend.records.lock().await.len(), 1);
}

#[tokio::test]
async fn test_run_survives_fatal_cycles() {
    let runtime = Arc::new(FakeRuntime::new());
    runtime.set_unreachable(true).await;
    let prober = Arc::new(ScriptedProber::default());
    let backend = Arc::new(RecordingBackend::default());
    let p = Arc::new(pinger(&runtime, &prober, &backend, config()));
    let cancel = CancellationToken::new();

    let handle = {
        let p = p.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { p.run(cancel).await })
    };

    tokio::time::timeout(Duration::from_secs(5), async {
        while p.metrics().snapshot().fatal_cycles == 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("a fatal cycle should be recorded");

    // The daemon comes back; the next cycle succeeds and clears the streak.
    runtime.set_unreachable(false).await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while p.metrics().snapshot().consecutive_fatal != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("loop should recover after the interval");

    cancel.cancel();
    handle.await.unwrap();
    assert!(p.metrics().snapshot().cycles >= 2);
}
