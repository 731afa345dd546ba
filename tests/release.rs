// tests/release.rs

use std::sync::Arc;

use releasedag::actions::ReleaseAction;
use releasedag::actions::release::commit_message;
use releasedag::config::ReleaseConfig;
use releasedag::errors::ReleasedagError;
use releasedag::exec::{Action, TaskContext};
use releasedag::fs::mock::MockFileSystem;
use releasedag::vcs::{GitCli, Vcs};
use releasedag_test_utils::fake_vcs::{FakeVcs, VcsCall};

fn release_config() -> ReleaseConfig {
    ReleaseConfig {
        add: vec![
            "dist".to_string(),
            "CHANGELOG.md".to_string(),
            "package.json".to_string(),
        ],
        ..ReleaseConfig::default()
    }
}

fn project(version: &str) -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file(
        "package.json",
        format!("{{\"name\": \"mm-logger\", \"version\": \"{version}\"}}"),
    );
    fs
}

#[tokio::test]
async fn release_commits_and_pushes() {
    let vcs = FakeVcs::dirty();
    let action = ReleaseAction::new(
        release_config(),
        Arc::new(project("1.3.0")),
        Arc::new(vcs.clone()),
    );

    action
        .execute(&TaskContext::new("").for_task("release"))
        .await
        .unwrap();

    assert_eq!(
        vcs.calls(),
        vec![
            VcsCall::Status,
            VcsCall::Add(release_config().add),
            VcsCall::Commit("chore(release): v1.3.0".to_string()),
            VcsCall::Push {
                remote: "origin".to_string(),
                branch: "master".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn clean_tree_aborts_release() {
    let vcs = FakeVcs::clean();
    let action = ReleaseAction::new(
        release_config(),
        Arc::new(project("1.3.0")),
        Arc::new(vcs.clone()),
    );

    let err = action.execute(&TaskContext::new("")).await.unwrap_err();
    match err.downcast_ref::<ReleasedagError>() {
        Some(ReleasedagError::InvalidInput(msg)) => {
            assert!(msg.contains("no changes detected"));
            assert!(msg.contains("aborting release"));
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert_eq!(vcs.calls(), vec![VcsCall::Status]);
}

#[tokio::test]
async fn invalid_version_aborts_before_touching_git() {
    let vcs = FakeVcs::dirty();
    let action = ReleaseAction::new(
        release_config(),
        Arc::new(project("latest")),
        Arc::new(vcs.clone()),
    );

    let err = action.execute(&TaskContext::new("")).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReleasedagError>(),
        Some(ReleasedagError::InvalidInput(_))
    ));
    assert!(vcs.calls().is_empty());
}

#[tokio::test]
async fn git_failure_stops_the_sequence() {
    let vcs = FakeVcs::dirty().failing_on("commit");
    let action = ReleaseAction::new(
        release_config(),
        Arc::new(project("1.3.0")),
        Arc::new(vcs.clone()),
    );

    let err = action.execute(&TaskContext::new("")).await.unwrap_err();
    assert!(err.to_string().contains("fake git commit failed"));

    let calls = vcs.calls();
    assert_eq!(calls.len(), 3);
    assert!(!calls.iter().any(|c| matches!(c, VcsCall::Push { .. })));
}

#[tokio::test]
async fn missing_git_binary_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let git = GitCli::with_program(dir.path().join("no-such-git"));

    let err = git.status_porcelain(dir.path()).await.unwrap_err();
    assert!(err.to_string().contains("failed to run"), "{err}");
}

#[test]
fn commit_message_format() {
    assert_eq!(commit_message("2.0.1"), "chore(release): v2.0.1");
}
