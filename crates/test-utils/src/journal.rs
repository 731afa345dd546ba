//! Recording units of work for runner tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use releasedag::dag::Task;
use releasedag::exec::{Action, ActionFuture, TaskContext};

/// One observation made by a journal action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Started(String),
    Finished(String),
}

#[derive(Debug, Default)]
struct JournalState {
    entries: Vec<Entry>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Shared log of when each unit of work started and finished.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    state: Arc<Mutex<JournalState>>,
}

/// How a journal action behaves once started.
#[derive(Debug, Clone, Copy, Default)]
pub struct Behaviour {
    pub delay: Duration,
    pub fail: bool,
    pub panic: bool,
}

impl Behaviour {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn slow(ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(ms),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn panicking() -> Self {
        Self {
            panic: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// An action recording into this journal under `name`.
    pub fn action(&self, name: &str, behaviour: Behaviour) -> Arc<dyn Action> {
        Arc::new(JournalAction {
            name: name.to_string(),
            behaviour,
            journal: self.clone(),
        })
    }

    /// A task named `name` with a journal action.
    pub fn task(&self, name: &str, behaviour: Behaviour) -> Task {
        Task::new(name, self.action(name, behaviour))
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.state.lock().unwrap().entries.clone()
    }

    /// Names in the order their units of work started.
    pub fn started(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                Entry::Started(name) => Some(name),
                Entry::Finished(_) => None,
            })
            .collect()
    }

    /// Names in the order their units of work finished.
    pub fn finished(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|e| match e {
                Entry::Finished(name) => Some(name),
                Entry::Started(_) => None,
            })
            .collect()
    }

    pub fn times_started(&self, name: &str) -> usize {
        self.started().iter().filter(|n| *n == name).count()
    }

    pub fn position(&self, entry: &Entry) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    /// Whether `first` finished before `second` started.
    pub fn finished_before_started(&self, first: &str, second: &str) -> bool {
        match (
            self.position(&Entry::Finished(first.to_string())),
            self.position(&Entry::Started(second.to_string())),
        ) {
            (Some(done), Some(start)) => done < start,
            _ => false,
        }
    }

    /// Highest number of journal actions that were running at once.
    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }

    fn record_start(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.entries.push(Entry::Started(name.to_string()));
        state.in_flight += 1;
        state.max_in_flight = state.max_in_flight.max(state.in_flight);
    }

    fn record_finish(&self, name: &str) {
        let mut state = self.state.lock().unwrap();
        state.entries.push(Entry::Finished(name.to_string()));
        state.in_flight -= 1;
    }
}

#[derive(Debug)]
struct JournalAction {
    name: String,
    behaviour: Behaviour,
    journal: Journal,
}

impl Action for JournalAction {
    fn execute<'a>(&'a self, _ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            self.journal.record_start(&self.name);
            if !self.behaviour.delay.is_zero() {
                tokio::time::sleep(self.behaviour.delay).await;
            }
            self.journal.record_finish(&self.name);

            if self.behaviour.panic {
                panic!("journal action {} panicked", self.name);
            }
            if self.behaviour.fail {
                anyhow::bail!("journal action {} failed", self.name);
            }
            Ok(())
        })
    }
}
