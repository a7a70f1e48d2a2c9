//! Plain-text card for `forumai inspect`.

use std::fmt::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use forumai_ai::{ModelState, ModelSummary};
use forumai_core::ArtifactPaths;

const LABEL_WIDTH: usize = 12;

/// Render the model status card: artifact files, then either the model
/// summary or the load failure cause.
pub fn render_model(paths: &ArtifactPaths, state: &ModelState) -> String {
    let mut out = String::new();
    field(&mut out, "status", state.status().as_str());
    field(&mut out, "vectorizer", &describe_file(&paths.vectorizer));
    field(&mut out, "classifier", &describe_file(&paths.classifier));

    match state {
        ModelState::Ready(model) => render_summary(&mut out, &model.summary()),
        ModelState::Failed { cause } => field(&mut out, "cause", cause),
    }
    out
}

fn render_summary(out: &mut String, summary: &ModelSummary) {
    field(out, "kind", summary.classifier_kind);
    field(out, "features", &summary.dim.to_string());
    field(out, "labels", &summary.labels.len().to_string());
    for (i, label) in summary.labels.iter().enumerate() {
        let _ = writeln!(out, "  {:>w$}  {label}", i, w = LABEL_WIDTH - 2);
    }
}

fn field(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "{name:<LABEL_WIDTH$}{value}");
}

/// Path plus size and modification time, or `(missing)`.
fn describe_file(path: &Path) -> String {
    match std::fs::metadata(path) {
        Ok(meta) => {
            let modified = meta
                .modified()
                .map(|t| DateTime::<Utc>::from(t).format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|_| "unknown".to_string());
            format!("{} ({} bytes, {modified})", path.display(), meta.len())
        }
        Err(_) => format!("{} (missing)", path.display()),
    }
}
