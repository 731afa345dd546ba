// tests/config_loading.rs

use std::io::Write;

use releasedag::config::{StepConfig, load_and_validate, parse_str};
use releasedag::errors::ReleasedagError;
use releasedag_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
[config]
default = "build"
jobs = 2

[task.clean]
description = "Delete 'dist' directory"
clean = ["dist", ".tmp"]

[task.lint]
cmd = "jshint src"
lenient = true

[task.install]
cmd = "npm install"

[task.test]
after = ["install"]
cmd = "karma start --single-run"

[task.compress]
after = ["clean"]
cmd = "uglifyjs src/logger.js -o dist/logger.min.js"

[task.copy]
after = ["clean"]
cmd = "cp src/logger.js dist/"

[task.bump]
after = ["lint"]
bump = ["package.json", "bower.json"]

[task.release]
release = { add = ["dist", "CHANGELOG.md", "package.json"] }

[task.serve]
after = ["install"]
cmd = "python3 -m http.server 9000"
long_lived = true
ready_on_stdout = "Serving HTTP"
open = "http://localhost:9000"

[pipeline.build]
description = "Build dist files"
steps = [["clean", "lint", "install"], "test", ["compress", "copy"]]

[[watch]]
paths = ["src/**/*.js"]
exclude = ["src/**/*.min.js"]
run = ["lint", "test"]
"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn full_config_loads() {
    let file = write_config(FULL_CONFIG);
    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.settings().default.as_deref(), Some("build"));
    assert_eq!(cfg.settings().jobs_limit().map(|j| j.get()), Some(2));
    assert_eq!(cfg.tasks().len(), 9);
    assert!(cfg.tasks()["lint"].lenient);
    assert_eq!(cfg.tasks()["test"].after, ["install"]);
    assert_eq!(cfg.tasks()["serve"].open.as_deref(), Some("http://localhost:9000"));

    let release = cfg.tasks()["release"].release.as_ref().unwrap();
    assert_eq!(release.manifest, "package.json");
    assert_eq!(release.remote, "origin");
    assert_eq!(release.branch, "master");

    let pipeline = &cfg.pipelines()["build"];
    assert_eq!(pipeline.steps.len(), 3);
    assert_eq!(pipeline.steps[1], StepConfig::One("test".to_string()));
    assert_eq!(pipeline.steps[2].members(), ["compress", "copy"]);

    assert_eq!(cfg.watch_rules().len(), 1);
    assert_eq!(cfg.watch_rules()[0].run, ["lint", "test"]);
}

#[test]
fn jobs_zero_means_unlimited() {
    let raw = parse_str("[task.a]\ncmd = \"true\"\n").unwrap();
    assert_eq!(raw.config.jobs, 0);
    assert!(raw.config.jobs_limit().is_none());
}

#[test]
fn cycle_returns_structured_error() {
    let file = write_config(
        r#"
[task.A]
cmd = "echo A"
after = ["B"]

[task.B]
cmd = "echo B"
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(ReleasedagError::CyclicDependency(path)) => {
            assert_eq!(path.first(), path.last());
            assert!(path.contains(&"A".to_string()));
            assert!(path.contains(&"B".to_string()));
        }
        other => panic!("Expected CyclicDependency, got: {other:?}"),
    }
}

#[test]
fn unknown_dependency_is_rejected() {
    let result = ConfigFileBuilder::new()
        .with_task("A", TaskConfigBuilder::new("echo A").after("NonExistent").build())
        .try_build();

    match result {
        Err(ReleasedagError::UnknownPrerequisite { task, prerequisite }) => {
            assert_eq!(task, "A");
            assert_eq!(prerequisite, "NonExistent");
        }
        other => panic!("Expected UnknownPrerequisite, got: {other:?}"),
    }
}

#[test]
fn self_dependency_is_rejected() {
    let result = ConfigFileBuilder::new()
        .with_task("A", TaskConfigBuilder::new("echo A").after("A").build())
        .try_build();

    assert!(matches!(result, Err(ReleasedagError::ConfigError(msg)) if msg.contains("itself")));
}

#[test]
fn empty_config_is_rejected() {
    let result = ConfigFileBuilder::new().try_build();
    assert!(matches!(result, Err(ReleasedagError::ConfigError(_))));
}

#[test]
fn more_than_one_action_is_rejected() {
    let mut task = TaskConfigBuilder::new("echo hi").build();
    task.clean = Some(vec!["dist".to_string()]);

    let result = ConfigFileBuilder::new().with_task("A", task).try_build();
    assert!(matches!(result, Err(ReleasedagError::ConfigError(msg)) if msg.contains("more than one")));
}

#[test]
fn ready_on_stdout_requires_long_lived_and_valid_regex() {
    let result = ConfigFileBuilder::new()
        .with_task("serve", TaskConfigBuilder::new("serve").ready_on_stdout("up").build())
        .try_build();
    assert!(matches!(result, Err(ReleasedagError::ConfigError(msg)) if msg.contains("long_lived")));

    let result = ConfigFileBuilder::new()
        .with_task(
            "serve",
            TaskConfigBuilder::new("serve")
                .long_lived(true)
                .ready_on_stdout("(unclosed")
                .build(),
        )
        .try_build();
    assert!(matches!(result, Err(ReleasedagError::ConfigError(msg)) if msg.contains("regex")));
}

#[test]
fn open_url_requires_long_lived_and_a_value() {
    let result = ConfigFileBuilder::new()
        .with_task(
            "serve",
            TaskConfigBuilder::new("serve").open("http://localhost:9000").build(),
        )
        .try_build();
    assert!(matches!(result, Err(ReleasedagError::ConfigError(msg)) if msg.contains("`open`")));

    let result = ConfigFileBuilder::new()
        .with_task(
            "serve",
            TaskConfigBuilder::new("serve").long_lived(true).open("  ").build(),
        )
        .try_build();
    assert!(matches!(result, Err(ReleasedagError::ConfigError(msg)) if msg.contains("empty")));

    let cfg = ConfigFileBuilder::new()
        .with_task(
            "serve",
            TaskConfigBuilder::new("serve")
                .long_lived(true)
                .open("http://localhost:9000")
                .build(),
        )
        .build();
    assert!(cfg.tasks()["serve"].open.is_some());
}

#[test]
fn pipeline_cannot_shadow_task() {
    let result = ConfigFileBuilder::new()
        .with_task("build", TaskConfigBuilder::aggregate().build())
        .with_pipeline("build", &[&["build"]])
        .try_build();

    assert!(matches!(result, Err(ReleasedagError::DuplicateTask(name)) if name == "build"));
}

#[test]
fn pipeline_steps_must_name_tasks() {
    let result = ConfigFileBuilder::new()
        .with_task("lint", TaskConfigBuilder::new("jshint").build())
        .with_pipeline("ci", &[&["lint"], &["deploy"]])
        .try_build();

    assert!(matches!(result, Err(ReleasedagError::ConfigError(msg)) if msg.contains("deploy")));
}

#[test]
fn watch_rules_are_checked() {
    let result = ConfigFileBuilder::new()
        .with_task("lint", TaskConfigBuilder::new("jshint").build())
        .with_watch(&["src/**/*.js"], &[], &["test"])
        .try_build();
    assert!(matches!(result, Err(ReleasedagError::ConfigError(msg)) if msg.contains("unknown task 'test'")));

    let result = ConfigFileBuilder::new()
        .with_task("lint", TaskConfigBuilder::new("jshint").build())
        .with_watch(&["src/[.js"], &[], &["lint"])
        .try_build();
    assert!(matches!(result, Err(ReleasedagError::ConfigError(msg)) if msg.contains("invalid glob")));
}

#[test]
fn default_must_exist() {
    let result = ConfigFileBuilder::new()
        .with_task("lint", TaskConfigBuilder::new("jshint").build())
        .with_default("build")
        .try_build();
    assert!(matches!(result, Err(ReleasedagError::ConfigError(msg)) if msg.contains("default")));

    let cfg = ConfigFileBuilder::new()
        .with_task("lint", TaskConfigBuilder::new("jshint").build())
        .with_pipeline("ci", &[&["lint"]])
        .with_default("ci")
        .build();
    assert_eq!(cfg.settings().default.as_deref(), Some("ci"));
}

#[test]
fn invalid_toml_is_reported() {
    let file = write_config("[task.a\ncmd = 1");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ReleasedagError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_and_validate(dir.path().join("Releasedag.toml"));
    assert!(matches!(result, Err(ReleasedagError::IoError(_))));
}
