// tests/runner.rs

use std::num::NonZeroUsize;
use std::sync::Arc;

use releasedag::dag::{Pipeline, Task, TaskRegistry};
use releasedag::engine::{RunOptions, Runner};
use releasedag::errors::ReleasedagError;
use releasedag::exec::TaskContext;
use releasedag_test_utils::journal::{Behaviour, Journal};
use releasedag_test_utils::{init_tracing, with_timeout};

fn runner(tasks: Vec<Task>) -> Runner {
    runner_with(tasks, vec![])
}

fn runner_with(tasks: Vec<Task>, pipelines: Vec<Pipeline>) -> Runner {
    init_tracing();
    let mut builder = TaskRegistry::builder();
    for task in tasks {
        builder.register(task).unwrap();
    }
    for pipeline in pipelines {
        builder.register_pipeline(pipeline).unwrap();
    }
    Runner::new(Arc::new(builder.build().unwrap()), TaskContext::default())
}

#[tokio::test]
async fn prerequisites_finish_before_dependent_starts() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("clean", Behaviour::slow(30)),
        journal.task("lint", Behaviour::slow(10)),
        journal.task("build", Behaviour::ok()).after("clean").after("lint"),
    ]);

    let report = with_timeout(runner.run("build")).await.unwrap();

    assert!(journal.finished_before_started("clean", "build"));
    assert!(journal.finished_before_started("lint", "build"));
    assert_eq!(journal.started().last().map(String::as_str), Some("build"));
    assert_eq!(report.started.len(), 3);
    assert_eq!(report.completed.last().map(String::as_str), Some("build"));
}

#[tokio::test]
async fn independent_prerequisites_run_concurrently() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("clean", Behaviour::slow(50)),
        journal.task("lint", Behaviour::slow(50)),
        Task::aggregate("build").after("clean").after("lint"),
    ]);

    with_timeout(runner.run("build")).await.unwrap();
    assert_eq!(journal.max_in_flight(), 2);
}

#[tokio::test]
async fn shared_prerequisite_runs_once() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("install", Behaviour::slow(10)),
        journal.task("lint", Behaviour::ok()).after("install"),
        journal.task("test", Behaviour::ok()).after("install"),
        journal.task("all", Behaviour::ok()).after("lint").after("test"),
    ]);

    with_timeout(runner.run("all")).await.unwrap();
    assert_eq!(journal.times_started("install"), 1);
    assert_eq!(journal.started().len(), 4);
}

#[tokio::test]
async fn each_invocation_runs_tasks_again() {
    let journal = Journal::new();
    let runner = runner(vec![journal.task("lint", Behaviour::ok())]);

    with_timeout(runner.run("lint")).await.unwrap();
    with_timeout(runner.run("lint")).await.unwrap();
    assert_eq!(journal.times_started("lint"), 2);
}

#[tokio::test]
async fn failing_prerequisite_stops_dependent() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("clean", Behaviour::slow(30)),
        journal.task("lint", Behaviour::failing()),
        journal.task("build", Behaviour::ok()).after("clean").after("lint"),
    ]);

    let err = with_timeout(runner.run("build")).await.unwrap_err();

    match &err {
        ReleasedagError::TaskFailed { task, cause } => {
            assert_eq!(task, "lint");
            assert!(cause.to_string().contains("journal action lint failed"));
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
    assert_eq!(err.failed_task(), Some("lint"));
    assert_eq!(journal.times_started("build"), 0);
    // The sibling already in flight was allowed to finish.
    assert_eq!(journal.finished().iter().filter(|n| *n == "clean").count(), 1);
}

#[tokio::test]
async fn nothing_new_starts_after_a_failure() {
    let journal = Journal::new();
    let jobs = NonZeroUsize::new(1);
    let runner = runner(vec![
        journal.task("a", Behaviour::failing()),
        journal.task("b", Behaviour::ok()),
        journal.task("c", Behaviour::ok()),
        Task::aggregate("all").after("a").after("b").after("c"),
    ])
    .with_options(RunOptions { strict: true, jobs });

    let err = with_timeout(runner.run("all")).await.unwrap_err();
    assert_eq!(err.failed_task(), Some("a"));
    // With one slot, `a` (first in name order) runs alone and nothing follows.
    assert_eq!(journal.started(), ["a"]);
}

#[tokio::test]
async fn panicking_unit_of_work_is_a_failure() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("boom", Behaviour::panicking()),
        journal.task("after", Behaviour::ok()).after("boom"),
    ]);

    let err = with_timeout(runner.run("after")).await.unwrap_err();
    match err {
        ReleasedagError::TaskFailed { task, cause } => {
            assert_eq!(task, "boom");
            assert!(cause.to_string().contains("panicked"));
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
    assert_eq!(journal.times_started("after"), 0);
}

#[tokio::test]
async fn unknown_task_runs_nothing() {
    let journal = Journal::new();
    let runner = runner(vec![journal.task("lint", Behaviour::ok())]);

    let err = runner.run("deploy").await.unwrap_err();
    assert!(matches!(err, ReleasedagError::UnknownTask(ref name) if name == "deploy"));
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn cycle_runs_nothing() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("leaf", Behaviour::ok()),
        journal.task("a", Behaviour::ok()).after("leaf").after("b"),
        journal.task("b", Behaviour::ok()).after("a"),
    ]);

    let err = runner.run("a").await.unwrap_err();
    assert!(matches!(err, ReleasedagError::CyclicDependency(_)));
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn sequence_waits_for_whole_group() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("a", Behaviour::slow(40)),
        journal.task("b", Behaviour::slow(10)),
        journal.task("c", Behaviour::ok()),
    ]);

    with_timeout(runner.run_sequence([vec!["a", "b"], vec!["c"]]))
        .await
        .unwrap();

    assert!(journal.finished_before_started("a", "c"));
    assert!(journal.finished_before_started("b", "c"));
}

#[tokio::test]
async fn sequence_failure_short_circuits_later_groups() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("a", Behaviour::failing().with_delay(5)),
        journal.task("b", Behaviour::slow(40)),
        journal.task("c", Behaviour::ok()),
    ]);

    let err = with_timeout(runner.run_sequence([vec!["a", "b"], vec!["c"]]))
        .await
        .unwrap_err();

    assert_eq!(err.failed_task(), Some("a"));
    assert_eq!(journal.times_started("c"), 0);
    // `b` was already running and got to finish.
    assert!(journal.finished().contains(&"b".to_string()));
}

#[tokio::test]
async fn sequence_does_not_repeat_tasks() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("install", Behaviour::ok()),
        journal.task("lint", Behaviour::ok()).after("install"),
        journal.task("test", Behaviour::ok()).after("install"),
    ]);

    let report = with_timeout(runner.run_sequence(["lint", "test", "lint"]))
        .await
        .unwrap();

    assert_eq!(journal.times_started("install"), 1);
    assert_eq!(journal.times_started("lint"), 1);
    assert_eq!(report.started.len(), 3);
    assert!(report.ran("test"));
}

#[tokio::test]
async fn pipeline_runs_its_steps_in_order() {
    let journal = Journal::new();
    let runner = runner_with(
        vec![
            journal.task("clean", Behaviour::slow(20)),
            journal.task("lint", Behaviour::ok()),
            journal.task("test", Behaviour::ok()),
        ],
        vec![Pipeline::new("build", vec![vec!["clean", "lint"], vec!["test"]])],
    );

    with_timeout(runner.run("build")).await.unwrap();
    assert!(journal.finished_before_started("clean", "test"));
    assert!(journal.finished_before_started("lint", "test"));
}

#[tokio::test]
async fn jobs_limit_caps_concurrency() {
    let journal = Journal::new();
    let tasks: Vec<Task> = (0..6)
        .map(|i| journal.task(&format!("t{i}"), Behaviour::slow(15)))
        .collect();
    let mut all = Task::aggregate("all");
    for i in 0..6 {
        all = all.after(format!("t{i}"));
    }
    let mut tasks = tasks;
    tasks.push(all);

    let runner = runner(tasks).with_options(RunOptions {
        strict: true,
        jobs: NonZeroUsize::new(2),
    });

    with_timeout(runner.run("all")).await.unwrap();
    assert_eq!(journal.started().len(), 6);
    assert!(journal.max_in_flight() <= 2);
}

#[tokio::test]
async fn lenient_failure_fails_strict_run() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("lint", Behaviour::failing()).lenient(true),
        journal.task("build", Behaviour::ok()).after("lint"),
    ]);

    let err = with_timeout(runner.run("build")).await.unwrap_err();
    assert_eq!(err.failed_task(), Some("lint"));
    assert_eq!(journal.times_started("build"), 0);
}

#[tokio::test]
async fn lenient_failure_is_downgraded_when_not_strict() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("lint", Behaviour::failing()).lenient(true),
        journal.task("build", Behaviour::ok()).after("lint"),
    ])
    .with_options(RunOptions {
        strict: false,
        jobs: None,
    });

    let report = with_timeout(runner.run("build")).await.unwrap();
    assert_eq!(report.downgraded, ["lint"]);
    assert_eq!(journal.times_started("build"), 1);
}

#[tokio::test]
async fn non_lenient_failure_still_fails_when_not_strict() {
    let journal = Journal::new();
    let runner = runner(vec![
        journal.task("test", Behaviour::failing()),
        journal.task("build", Behaviour::ok()).after("test"),
    ])
    .with_options(RunOptions {
        strict: false,
        jobs: None,
    });

    let err = with_timeout(runner.run("build")).await.unwrap_err();
    assert_eq!(err.failed_task(), Some("test"));
}
