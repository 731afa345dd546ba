// src/actions/bump.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use crate::actions::version::Version;
use crate::errors::ReleasedagError;
use crate::exec::{Action, ActionFuture, TaskContext};
use crate::fs::FileSystem;
use crate::types::BumpKind;

/// Rewrites the `version` field of JSON manifests according to `--type`.
#[derive(Debug, Clone)]
pub struct BumpAction {
    manifests: Vec<String>,
    fs: Arc<dyn FileSystem>,
}

impl BumpAction {
    pub fn new(manifests: Vec<String>, fs: Arc<dyn FileSystem>) -> Self {
        Self { manifests, fs }
    }

    async fn run(&self, ctx: &TaskContext) -> Result<()> {
        let kind = ctx.bump.ok_or_else(missing_bump_type)?;

        // Read and validate every manifest before writing any of them.
        let mut updates: Vec<(PathBuf, String)> = Vec::with_capacity(self.manifests.len());
        for manifest in &self.manifests {
            let path = ctx.resolve(manifest);
            let text = self.fs.read_to_string(&path)?;
            let mut doc: Value = serde_json::from_str(&text)
                .with_context(|| format!("parsing manifest {}", path.display()))?;

            let current = read_version(&doc, manifest)?;
            let next = current.bump(kind)?;
            info!(task = %ctx.task, manifest = %manifest, from = %current, to = %next, "bumping version");

            if let Some(obj) = doc.as_object_mut() {
                obj.insert("version".to_string(), Value::String(next.to_string()));
            }
            let rendered = render_manifest(&doc, &text)
                .with_context(|| format!("serializing manifest {}", path.display()))?;
            updates.push((path, rendered));
        }

        for (path, text) in updates {
            self.fs.write(&path, text.as_bytes())?;
        }

        Ok(())
    }
}

impl Action for BumpAction {
    fn execute<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(self.run(ctx))
    }
}

/// Serialize `doc` with the indentation and trailing newline of `original`.
fn render_manifest(doc: &Value, original: &str) -> Result<String> {
    let indent = detect_indent(original);
    let mut buf = Vec::with_capacity(original.len());
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    doc.serialize(&mut ser)?;

    let mut text = String::from_utf8(buf)?;
    if original.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// Leading whitespace of the first indented line, or two spaces.
pub fn detect_indent(text: &str) -> &str {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let body = line.trim_start_matches([' ', '\t']);
            &line[..line.len() - body.len()]
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or("  ")
}

fn missing_bump_type() -> anyhow::Error {
    let expected: Vec<&str> = [BumpKind::Major, BumpKind::Minor, BumpKind::Patch]
        .iter()
        .map(BumpKind::as_str)
        .collect();
    ReleasedagError::InvalidInput(format!(
        "required bump type is missing; usage: releasedag <task> --type ({})",
        expected.join("|")
    ))
    .into()
}

/// The manifest's `version` as a [`Version`].
pub fn read_version(doc: &Value, manifest: &str) -> Result<Version> {
    let raw = doc
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ReleasedagError::InvalidInput(format!("{manifest} has no string `version` field"))
        })?;
    Ok(raw.parse::<Version>()?)
}
