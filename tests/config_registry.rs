// tests/config_registry.rs

use std::sync::Arc;

use releasedag::actions::{Services, registry_from_config};
use releasedag::dag::ExecutionRequest;
use releasedag::engine::Runner;
use releasedag::exec::TaskContext;
use releasedag::fs::mock::MockFileSystem;
use releasedag::{print_plan, print_task_list};
use releasedag_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
use releasedag_test_utils::fake_vcs::FakeVcs;

fn services() -> Services {
    Services::new(Arc::new(MockFileSystem::new()), Arc::new(FakeVcs::dirty()))
}

fn sample_config() -> releasedag::config::ConfigFile {
    ConfigFileBuilder::new()
        .with_task(
            "clean",
            TaskConfigBuilder::clean(&["dist"])
                .description("Delete 'dist' directory")
                .build(),
        )
        .with_task("lint", TaskConfigBuilder::new("jshint src").lenient(true).build())
        .with_task(
            "build",
            TaskConfigBuilder::aggregate()
                .after("clean")
                .after("lint")
                .build(),
        )
        .with_pipeline("ci", &[&["clean", "lint"], &["build"]])
        .build()
}

#[test]
fn registry_mirrors_config() {
    let registry = registry_from_config(&sample_config(), &services()).unwrap();

    assert_eq!(registry.len(), 3);
    let build = registry.get("build").unwrap();
    assert_eq!(build.prerequisites(), ["clean", "lint"]);
    assert!(registry.get("lint").unwrap().is_lenient());
    assert_eq!(
        registry.get("clean").unwrap().description(),
        Some("Delete 'dist' directory")
    );
    assert_eq!(registry.pipeline("ci").unwrap().steps().len(), 2);
}

#[test]
fn task_list_shows_descriptions_prerequisites_and_pipelines() {
    let registry = registry_from_config(&sample_config(), &services()).unwrap();

    let mut out = Vec::new();
    print_task_list(&mut out, &registry).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("clean - Delete 'dist' directory"));
    assert!(text.contains("after: clean, lint"));
    assert!(text.contains("Pipelines:"));
    assert!(text.contains("steps: [clean, lint] -> [build]"));
}

#[test]
fn dry_run_prints_stages_and_levels() {
    let registry = registry_from_config(&sample_config(), &services()).unwrap();
    let runner = Runner::new(Arc::new(registry), TaskContext::default());
    let plan = runner.plan(&ExecutionRequest::task("build")).unwrap();

    let mut out = Vec::new();
    print_plan(&mut out, "build", &plan).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("stage 1 [build]:"));
    assert!(text.contains("level 0: clean, lint"));
    assert!(text.contains("level 1: build"));
    assert!(text.contains("3 task(s) would run"));
}
