use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use releasedag::dag::ScheduledTask;
use releasedag::engine::RuntimeEvent;
use releasedag::errors::Result;
use releasedag::exec::ExecutorBackend;

/// A fake executor that:
/// - records which tasks were "run"
/// - never calls the tasks' actions
/// - reports `TaskStarted` + `TaskCompleted` for each scheduled task from a
///   spawned task, failing the ones listed in `failing`.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<String>>>,
    failing: BTreeSet<String>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            failing: BTreeSet::new(),
        }
    }

    pub fn failing<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing.extend(names.into_iter().map(Into::into));
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let names: Vec<String> = tasks.into_iter().map(|t| t.name).collect();
        self.executed.lock().unwrap().extend(names.iter().cloned());

        let tx = self.runtime_tx.clone();
        let failing = self.failing.clone();

        // Report from a separate task so a large batch cannot fill the
        // runtime's channel while the runtime is still awaiting this call.
        tokio::spawn(async move {
            for name in names {
                if tx
                    .send(RuntimeEvent::TaskStarted { task: name.clone() })
                    .await
                    .is_err()
                {
                    return;
                }

                let result = if failing.contains(&name) {
                    Err(anyhow::anyhow!("fake failure of {name}"))
                } else {
                    Ok(())
                };

                if tx
                    .send(RuntimeEvent::TaskCompleted { task: name, result })
                    .await
                    .is_err()
                {
                    return;
                }
            }
        });

        Box::pin(async { Ok(()) })
    }
}
