// ============================================================
// Layer 6 - Experiment Tracking Sinks
// ============================================================
// Implementations of the TrackingSink trait from Layer 3.
//
//   FsTrackingSink  writes runs to a directory tree, one folder
//                   per run, in an MLflow-like layout
//   NullSink        accepts and discards everything
//                   (`--no-tracking`)
//
// FsTrackingSink layout:
//
//   <tracking_dir>/<experiment>/<run_id>/
//       meta.json                 name, parent, status, times
//       params/<key>              raw parameter value
//       metrics/<key>             "<unix_millis> <value> <step>" lines
//       artifacts/<path>/model.json
//
// Run ids are a UTC timestamp plus a per-process counter, so two
// runs started in the same millisecond still get distinct ids.
//
// Reference: MLflow FileStore layout

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::domain::traits::{RunId, RunStatus, TrackingSink};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RunMeta {
    run_id:        String,
    name:          String,
    parent_run_id: Option<String>,
    status:        String,
    start_time:    DateTime<Utc>,
    end_time:      Option<DateTime<Utc>>,
}

pub struct FsTrackingSink {
    root:    PathBuf,
    counter: AtomicU64,
}

impl FsTrackingSink {
    /// Sink writing to `<dir>/<experiment>/`.
    pub fn new(dir: impl AsRef<Path>, experiment: &str) -> Result<Self> {
        check_segment(experiment).context("Invalid experiment name")?;
        let root = dir.as_ref().join(experiment);
        fs::create_dir_all(&root)
            .with_context(|| format!("Cannot create tracking directory '{}'", root.display()))?;
        tracing::debug!("Tracking runs under '{}'", root.display());
        Ok(Self { root, counter: AtomicU64::new(0) })
    }

    fn run_dir(&self, run: &RunId) -> Result<PathBuf> {
        check_segment(&run.0)?;
        let dir = self.root.join(&run.0);
        if !dir.is_dir() {
            bail!("Unknown run '{}'", run);
        }
        Ok(dir)
    }

    fn write_meta(&self, dir: &Path, meta: &RunMeta) -> Result<()> {
        let path = dir.join("meta.json");
        fs::write(&path, serde_json::to_string_pretty(meta)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))
    }
}

impl TrackingSink for FsTrackingSink {
    fn start_run(&self, name: &str, parent: Option<&RunId>) -> Result<RunId> {
        if let Some(parent) = parent {
            self.run_dir(parent).context("Parent run does not exist")?;
        }

        let n   = self.counter.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let id  = RunId(format!("{}-{:04}", now.format("%Y%m%dT%H%M%S%3fZ"), n));
        let dir = self.root.join(&id.0);

        for sub in ["params", "metrics", "artifacts"] {
            fs::create_dir_all(dir.join(sub))
                .with_context(|| format!("Cannot create run directory '{}'", dir.display()))?;
        }
        self.write_meta(
            &dir,
            &RunMeta {
                run_id:        id.0.clone(),
                name:          name.to_string(),
                parent_run_id: parent.map(|p| p.0.clone()),
                status:        "RUNNING".to_string(),
                start_time:    now,
                end_time:      None,
            },
        )?;

        tracing::debug!("Started run {} ('{}')", id, name);
        Ok(id)
    }

    fn log_param(&self, run: &RunId, key: &str, value: &str) -> Result<()> {
        check_segment(key)?;
        let path = self.run_dir(run)?.join("params").join(key);
        fs::write(&path, value).with_context(|| format!("Cannot write '{}'", path.display()))
    }

    fn log_metric(&self, run: &RunId, key: &str, value: f64) -> Result<()> {
        check_segment(key)?;
        let path = self.run_dir(run)?.join("metrics").join(key);
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Cannot open '{}'", path.display()))?;
        writeln!(f, "{} {} 0", Utc::now().timestamp_millis(), value)?;
        Ok(())
    }

    fn log_artifact(&self, run: &RunId, path: &str, payload: &serde_json::Value) -> Result<()> {
        let mut dir = self.run_dir(run)?.join("artifacts");
        for segment in path.split('/') {
            check_segment(segment).with_context(|| format!("Invalid artifact path '{path}'"))?;
            dir.push(segment);
        }
        fs::create_dir_all(&dir)?;

        let file = dir.join("model.json");
        fs::write(&file, serde_json::to_string(payload)?)
            .with_context(|| format!("Cannot write '{}'", file.display()))?;
        tracing::debug!("Logged artifact '{}' for run {}", path, run);
        Ok(())
    }

    fn end_run(&self, run: &RunId, status: RunStatus) -> Result<()> {
        let dir  = self.run_dir(run)?;
        let path = dir.join("meta.json");
        let mut meta: RunMeta = serde_json::from_str(
            &fs::read_to_string(&path).with_context(|| format!("Cannot read '{}'", path.display()))?,
        )?;
        meta.status   = status.as_str().to_string();
        meta.end_time = Some(Utc::now());
        self.write_meta(&dir, &meta)
    }
}

/// One path component: not empty, not `.` or `..`, no separators.
fn check_segment(segment: &str) -> Result<()> {
    if segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\'])
        || Path::new(segment).is_absolute()
    {
        return Err(anyhow!("'{segment}' is not a valid path segment"));
    }
    Ok(())
}

// ─── NullSink ─────────────────────────────────────────────────────────────────
/// Discards everything.
pub struct NullSink;

impl TrackingSink for NullSink {
    fn start_run(&self, _name: &str, _parent: Option<&RunId>) -> Result<RunId> {
        Ok(RunId("untracked".to_string()))
    }

    fn log_param(&self, _run: &RunId, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn log_metric(&self, _run: &RunId, _key: &str, _value: f64) -> Result<()> {
        Ok(())
    }

    fn log_artifact(&self, _run: &RunId, _path: &str, _payload: &serde_json::Value) -> Result<()> {
        Ok(())
    }

    fn end_run(&self, _run: &RunId, _status: RunStatus) -> Result<()> {
        Ok(())
    }
}
