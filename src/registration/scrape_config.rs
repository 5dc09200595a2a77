//! Scrape configuration mutation.
//!
//! Only the substructure needed to append a target is interpreted:
//!
//! ```yaml
//! scrape_configs:
//!   - job_name: prometheus
//!     static_configs:
//!       - targets: ["10.0.0.1:8000"]
//! ```
//!
//! Everything else is carried through as an opaque YAML value so unrelated
//! jobs, labels and global settings survive the round trip.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

const SCRAPE_CONFIGS_KEY: &str = "scrape_configs";
const JOB_NAME_KEY: &str = "job_name";
const STATIC_CONFIGS_KEY: &str = "static_configs";
const TARGETS_KEY: &str = "targets";

/// Errors raised while registering a target.
#[derive(Debug, Error)]
pub enum ScrapeConfigError {
    /// File missing, unreadable or not valid YAML.
    #[error("scrape config {} is unreadable: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    /// Document parsed but lacks the expected structure.
    #[error("scrape config is malformed: {0}")]
    MalformedSchema(String),

    /// No job with the requested name.
    #[error("scrape job `{0}` not found")]
    JobNotFound(String),

    /// Serialization or disk write failed.
    #[error("failed to write scrape config {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The blocking task running the mutation panicked or was cancelled.
    #[error("scrape config task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ScrapeConfigError {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeConfigError::Unreadable { .. } => "unreadable",
            ScrapeConfigError::MalformedSchema(_) => "malformed",
            ScrapeConfigError::JobNotFound(_) => "job_not_found",
            ScrapeConfigError::WriteFailed { .. } => "write_failed",
            ScrapeConfigError::Task(_) => "task_failed",
        }
    }
}

/// What a successful registration did to the target list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetChange {
    Added,
    AlreadyPresent,
}

impl TargetChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetChange::Added => "added",
            TargetChange::AlreadyPresent => "already_present",
        }
    }
}

/// Ensure `target` is listed in the first target group of `job_name` in
/// the file at `path`.
///
/// The file is rewritten only when the target was added. On any error the
/// file is left untouched.
pub fn register_target(
    path: &Path,
    job_name: &str,
    target: &str,
) -> Result<TargetChange, ScrapeConfigError> {
    let mut document = load_document(path)?;
    let change = ensure_target(&mut document, job_name, target)?;

    if change == TargetChange::Added {
        write_document(path, &document)?;
    }
    Ok(change)
}

/// Read and parse the scrape config at `path`.
pub fn load_document(path: &Path) -> Result<Value, ScrapeConfigError> {
    let unreadable = |reason: String| ScrapeConfigError::Unreadable {
        path: path.to_path_buf(),
        reason,
    };
    let bytes = fs::read(path).map_err(|e| unreadable(e.to_string()))?;
    serde_yaml::from_slice(&bytes).map_err(|e| unreadable(e.to_string()))
}

/// In-memory version of [`register_target`].
pub fn ensure_target(
    document: &mut Value,
    job_name: &str,
    target: &str,
) -> Result<TargetChange, ScrapeConfigError> {
    let job = find_job_mut(document, job_name)?;

    let groups = list_field(job, STATIC_CONFIGS_KEY, job_name)?;
    if groups.is_empty() {
        let mut group = Mapping::new();
        group.insert(Value::from(TARGETS_KEY), Value::Sequence(Vec::new()));
        groups.push(Value::Mapping(group));
    }

    let group = groups[0].as_mapping_mut().ok_or_else(|| {
        ScrapeConfigError::MalformedSchema(format!(
            "first static config of job `{}` is not a mapping",
            job_name
        ))
    })?;
    let targets = list_field(group, TARGETS_KEY, job_name)?;

    if targets.iter().any(|t| t.as_str() == Some(target)) {
        return Ok(TargetChange::AlreadyPresent);
    }
    targets.push(Value::from(target));
    Ok(TargetChange::Added)
}

/// Targets of the first target group of `job_name`, without mutating.
pub fn job_targets(document: &Value, job_name: &str) -> Result<Vec<String>, ScrapeConfigError> {
    let job = scrape_configs(document)?
        .iter()
        .filter_map(Value::as_mapping)
        .find(|job| job.get(JOB_NAME_KEY).and_then(Value::as_str) == Some(job_name))
        .ok_or_else(|| ScrapeConfigError::JobNotFound(job_name.to_string()))?;

    let targets = job
        .get(STATIC_CONFIGS_KEY)
        .and_then(Value::as_sequence)
        .and_then(|groups| groups.first())
        .and_then(|group| group.get(TARGETS_KEY))
        .and_then(Value::as_sequence)
        .map(|targets| {
            targets
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Ok(targets)
}

fn scrape_configs(document: &Value) -> Result<&Vec<Value>, ScrapeConfigError> {
    document
        .get(SCRAPE_CONFIGS_KEY)
        .and_then(Value::as_sequence)
        .ok_or_else(missing_scrape_configs)
}

fn find_job_mut<'a>(
    document: &'a mut Value,
    job_name: &str,
) -> Result<&'a mut Mapping, ScrapeConfigError> {
    document
        .as_mapping_mut()
        .and_then(|root| root.get_mut(SCRAPE_CONFIGS_KEY))
        .and_then(Value::as_sequence_mut)
        .ok_or_else(missing_scrape_configs)?
        .iter_mut()
        .filter_map(Value::as_mapping_mut)
        .find(|job| job.get(JOB_NAME_KEY).and_then(Value::as_str) == Some(job_name))
        .ok_or_else(|| ScrapeConfigError::JobNotFound(job_name.to_string()))
}

fn missing_scrape_configs() -> ScrapeConfigError {
    ScrapeConfigError::MalformedSchema(format!("missing `{}` list", SCRAPE_CONFIGS_KEY))
}

/// Sequence stored under `key`, created when absent or null.
fn list_field<'a>(
    map: &'a mut Mapping,
    key: &str,
    job_name: &str,
) -> Result<&'a mut Vec<Value>, ScrapeConfigError> {
    if matches!(map.get(key), None | Some(Value::Null)) {
        map.insert(Value::from(key), Value::Sequence(Vec::new()));
    }
    map.get_mut(key).and_then(Value::as_sequence_mut).ok_or_else(|| {
        ScrapeConfigError::MalformedSchema(format!(
            "`{}` of job `{}` is not a list",
            key, job_name
        ))
    })
}

/// Write-temp-then-rename so readers never observe a partial file.
fn write_document(path: &Path, document: &Value) -> Result<(), ScrapeConfigError> {
    let write_failed = |source: io::Error| ScrapeConfigError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let yaml = serde_yaml::to_string(document).map_err(|e| write_failed(io::Error::other(e)))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(yaml.as_bytes()).map_err(write_failed)?;
    tmp.as_file().sync_all().map_err(write_failed)?;

    // Temp files are created owner-only; the collector may run as another user.
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), metadata.permissions()).map_err(write_failed)?;
    }

    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
