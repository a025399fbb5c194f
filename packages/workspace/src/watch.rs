use crate::events::EventQueue;
use crate::locator::DocumentLocator;
use crate::orchestrator::{CycleOutcome, Orchestrator, PropagationReport};
use crate::storage::Storage;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Drive propagation cycles from watcher events until `shutdown` resolves
/// or the event source closes.
///
/// Cycles run one at a time on the blocking pool. A failed cycle is logged
/// and the loop keeps going.
pub async fn run_watch_loop<S, L, F>(
    orchestrator: Arc<Orchestrator<S, L>>,
    mut events: EventQueue,
    shutdown: F,
) where
    S: Storage + 'static,
    L: DocumentLocator + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        let batch = tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested, stopping watch loop");
                break;
            }
            batch = events.next_batch() => match batch {
                Some(batch) => batch,
                None => {
                    debug!("event source closed");
                    break;
                }
            },
        };

        for event in batch {
            if !orchestrator.accepts(&event.path, event.is_dir) {
                continue;
            }
            run_cycle(orchestrator.clone(), event.path).await;
        }
    }
}

async fn run_cycle<S, L>(orchestrator: Arc<Orchestrator<S, L>>, master: PathBuf)
where
    S: Storage + 'static,
    L: DocumentLocator + 'static,
{
    let task_master = master.clone();
    let result = tokio::task::spawn_blocking(move || orchestrator.propagate(&task_master)).await;

    match result {
        Ok(Ok(report)) => log_report(&report),
        Ok(Err(err)) => error!(master = %master.display(), error = %err, "propagation failed"),
        Err(err) => error!(master = %master.display(), error = %err, "propagation task panicked"),
    }
}

fn log_report(report: &PropagationReport) {
    match report.outcome {
        CycleOutcome::Propagated => {
            for failure in &report.failures {
                warn!(
                    child = %failure.path.display(),
                    error = %failure.error,
                    "child not updated"
                );
            }
        }
        CycleOutcome::BaselineEstablished => {}
        CycleOutcome::Unchanged | CycleOutcome::NoStructuralChanges => {
            debug!(
                master = %report.master.display(),
                outcome = ?report.outcome,
                "nothing to propagate"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::OrchestratorConfig;
    use crate::storage::MemoryStorage;
    use crate::watcher::WatchEvent;
    use std::io;
    use std::path::Path;
    use std::time::Duration;
    use tokio::sync::{mpsc, oneshot};

    struct FixedLocator(Vec<PathBuf>);

    impl DocumentLocator for FixedLocator {
        fn find_children(&self, _master: &Path) -> io::Result<Vec<PathBuf>> {
            Ok(self.0.clone())
        }
    }

    fn setup() -> Arc<Orchestrator<MemoryStorage, FixedLocator>> {
        let orch = Orchestrator::new(
            MemoryStorage::new(),
            FixedLocator(vec![PathBuf::from("/r/a/resume.html")]),
            OrchestratorConfig::default(),
        );
        let storage = orch.snapshots().storage();
        storage.insert("/r/resume_old.html", "<body><p>X</p></body>");
        storage.insert("/r/resume.html", "<body><p>Y</p></body>");
        storage.insert("/r/a/resume.html", "<body><p>X</p></body>");
        Arc::new(orch)
    }

    #[tokio::test]
    async fn test_loop_propagates_then_stops_on_closed_source() {
        let orch = setup();
        let (tx, rx) = mpsc::channel(8);

        tx.send(WatchEvent::file("/r/resume_old.html")).await.unwrap();
        tx.send(WatchEvent::file("/r/resume.html")).await.unwrap();
        drop(tx);

        run_watch_loop(
            orch.clone(),
            EventQueue::new(rx, Duration::ZERO),
            std::future::pending(),
        )
        .await;

        let storage = orch.snapshots().storage();
        assert_eq!(
            storage.get(Path::new("/r/a/resume.html")).as_deref(),
            Some("<body><p>Y</p></body>")
        );
        assert_eq!(
            storage.get(Path::new("/r/resume_old.html")).as_deref(),
            Some("<body><p>Y</p></body>")
        );
    }

    #[tokio::test]
    async fn test_loop_survives_failed_cycle_and_honours_shutdown() {
        let orch = setup();
        let (tx, rx) = mpsc::channel(8);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(run_watch_loop(
            orch.clone(),
            EventQueue::new(rx, Duration::ZERO),
            async move {
                let _ = stop_rx.await;
            },
        ));

        // No such document: the cycle fails and the loop carries on
        tx.send(WatchEvent::file("/r/missing/resume.html")).await.unwrap();
        tx.send(WatchEvent::file("/r/resume.html")).await.unwrap();

        let storage_orch = orch.clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            loop {
                let child = storage_orch
                    .snapshots()
                    .storage()
                    .get(Path::new("/r/a/resume.html"));
                if child.as_deref() == Some("<body><p>Y</p></body>") {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("child was never updated");

        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("loop did not stop")
            .unwrap();
    }
}
