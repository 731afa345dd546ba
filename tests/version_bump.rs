// tests/version_bump.rs

use std::path::Path;
use std::sync::Arc;

use releasedag::actions::bump::detect_indent;
use releasedag::actions::{BumpAction, Version};
use releasedag::errors::ReleasedagError;
use releasedag::exec::{Action, TaskContext};
use releasedag::fs::mock::MockFileSystem;
use releasedag::types::BumpKind;

#[test]
fn parses_and_displays_versions() {
    let v: Version = "1.4.2".parse().unwrap();
    assert_eq!(v, Version::new(1, 4, 2));
    assert_eq!(v.to_string(), "1.4.2");

    let v: Version = "2.0.0-rc.1+build.7".parse().unwrap();
    assert_eq!(v.pre.as_deref(), Some("rc.1"));
    assert_eq!(v.build.as_deref(), Some("build.7"));
    assert_eq!(v.to_string(), "2.0.0-rc.1+build.7");

    let v: Version = "v0.3.0".parse().unwrap();
    assert_eq!(v.to_string(), "0.3.0");
}

#[test]
fn rejects_invalid_versions() {
    for bad in ["", "1", "1.2", "01.2.3", "1.2.3.4", "one.two.three", "1.2.3-"] {
        match bad.parse::<Version>() {
            Err(ReleasedagError::InvalidInput(msg)) => assert!(msg.contains("invalid version")),
            other => panic!("expected InvalidInput for {bad:?}, got {other:?}"),
        }
    }
}

#[test]
fn bumps_each_class() {
    let v = Version::new(1, 4, 2);
    assert_eq!(v.bump(BumpKind::Major).unwrap().to_string(), "2.0.0");
    assert_eq!(v.bump(BumpKind::Minor).unwrap().to_string(), "1.5.0");
    assert_eq!(v.bump(BumpKind::Patch).unwrap().to_string(), "1.4.3");
}

#[test]
fn bump_drops_prerelease_and_build_metadata() {
    let pre: Version = "1.2.0-beta.2".parse().unwrap();
    assert_eq!(pre.bump(BumpKind::Minor).unwrap().to_string(), "1.2.0");
    assert_eq!(pre.bump(BumpKind::Patch).unwrap().to_string(), "1.2.0");
    assert_eq!(pre.bump(BumpKind::Major).unwrap().to_string(), "2.0.0");

    let built: Version = "1.2.3+sha.abc".parse().unwrap();
    assert_eq!(built.bump(BumpKind::Patch).unwrap().to_string(), "1.2.4");
}

fn manifest(version: &str) -> String {
    format!(
        "{{\n  \"name\": \"mm-logger\",\n  \"version\": \"{version}\",\n  \"main\": \"dist/logger.js\"\n}}\n"
    )
}

#[tokio::test]
async fn bump_rewrites_every_manifest_preserving_key_order() {
    let fs = MockFileSystem::new();
    fs.add_file("proj/package.json", manifest("0.1.9"));
    fs.add_file("proj/bower.json", manifest("0.1.9"));

    let action = BumpAction::new(
        vec!["package.json".to_string(), "bower.json".to_string()],
        Arc::new(fs.clone()),
    );
    let ctx = TaskContext::new("proj")
        .with_bump(Some(BumpKind::Minor))
        .for_task("bump");

    action.execute(&ctx).await.unwrap();

    for file in ["proj/package.json", "proj/bower.json"] {
        assert_eq!(fs.contents(Path::new(file)).unwrap(), manifest("0.2.0"));
    }
}

#[tokio::test]
async fn bump_without_type_is_invalid_input() {
    let fs = MockFileSystem::new();
    fs.add_file("package.json", manifest("1.0.0"));

    let action = BumpAction::new(vec!["package.json".to_string()], Arc::new(fs.clone()));
    let ctx = TaskContext::new("").for_task("bump");

    let err = action.execute(&ctx).await.unwrap_err();
    match err.downcast_ref::<ReleasedagError>() {
        Some(ReleasedagError::InvalidInput(msg)) => {
            assert!(msg.contains("--type"));
            assert!(msg.contains("major|minor|patch"));
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert_eq!(fs.contents("package.json").unwrap(), manifest("1.0.0"));
}

#[tokio::test]
async fn invalid_version_leaves_all_manifests_untouched() {
    let fs = MockFileSystem::new();
    fs.add_file("package.json", manifest("1.0.0"));
    fs.add_file("bower.json", manifest("banana"));

    let action = BumpAction::new(
        vec!["package.json".to_string(), "bower.json".to_string()],
        Arc::new(fs.clone()),
    );
    let ctx = TaskContext::new("").with_bump(Some(BumpKind::Patch));

    let err = action.execute(&ctx).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReleasedagError>(),
        Some(ReleasedagError::InvalidInput(_))
    ));
    assert_eq!(fs.contents("package.json").unwrap(), manifest("1.0.0"));
}

#[test]
fn bump_overflow_is_invalid_input() {
    let v: Version = "18446744073709551615.0.0".parse().unwrap();
    match v.bump(BumpKind::Major) {
        Err(ReleasedagError::InvalidInput(msg)) => assert!(msg.contains("overflow"), "{msg}"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }

    let v = Version::new(1, 2, u64::MAX);
    assert!(v.bump(BumpKind::Patch).is_err());
    assert_eq!(v.bump(BumpKind::Minor).unwrap().to_string(), "1.3.0");
}

#[tokio::test]
async fn overflowing_manifest_fails_without_writing() {
    let fs = MockFileSystem::new();
    fs.add_file("package.json", manifest("18446744073709551615.0.0"));

    let action = BumpAction::new(vec!["package.json".to_string()], Arc::new(fs.clone()));
    let ctx = TaskContext::new("").with_bump(Some(BumpKind::Major));

    let err = action.execute(&ctx).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReleasedagError>(),
        Some(ReleasedagError::InvalidInput(_))
    ));
    assert_eq!(fs.contents("package.json").unwrap(), manifest("18446744073709551615.0.0"));
}

#[tokio::test]
async fn bump_keeps_the_manifest_indentation() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "package.json",
        "{\n    \"name\": \"mm-logger\",\n    \"version\": \"1.0.0\"\n}\n",
    );
    fs.add_file("bower.json", "{\n\t\"name\": \"mm-logger\",\n\t\"version\": \"1.0.0\"\n}");

    let action = BumpAction::new(
        vec!["package.json".to_string(), "bower.json".to_string()],
        Arc::new(fs.clone()),
    );
    let ctx = TaskContext::new("").with_bump(Some(BumpKind::Patch));
    action.execute(&ctx).await.unwrap();

    assert_eq!(
        fs.contents("package.json").unwrap(),
        "{\n    \"name\": \"mm-logger\",\n    \"version\": \"1.0.1\"\n}\n"
    );
    assert_eq!(
        fs.contents("bower.json").unwrap(),
        "{\n\t\"name\": \"mm-logger\",\n\t\"version\": \"1.0.1\"\n}"
    );
}

#[test]
fn indent_detection() {
    assert_eq!(detect_indent("{\n    \"a\": 1\n}"), "    ");
    assert_eq!(detect_indent("{\n\n\t\"a\": 1\n}"), "\t");
    assert_eq!(detect_indent("{}"), "  ");
}
