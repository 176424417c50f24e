//! Document comparison pipelines.
//!
//! `compare_documents` runs the whole single-pair flow: parse both files,
//! compute the distance and alignment, build the report, and construct the
//! transformed tree. `compare_with_dataset` repeats it for one input
//! against every XML document in a directory; a failing pair is recorded
//! and the rest of the batch continues.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::distance::{Algorithm, DistanceEngine};
use crate::error::{Error, Result};
use crate::patch;
use crate::report::ComparisonReport;
use crate::tree::Tree;
use crate::xml;

/// Everything produced by one document pair comparison.
#[derive(Debug)]
pub struct DocumentComparison {
    /// Path of the source document.
    pub source_path: PathBuf,
    /// Path of the target document.
    pub target_path: PathBuf,
    /// The structured comparison result.
    pub report: ComparisonReport,
    /// The target-as-transformed tree, ready for serialization.
    pub transformed: Tree,
    /// Wall-clock time of the distance computation and traceback.
    pub elapsed: Duration,
}

/// Compares two XML documents on disk.
pub fn compare_documents(
    source_path: &Path,
    target_path: &Path,
    algorithm: Algorithm,
) -> Result<DocumentComparison> {
    debug!(source = %source_path.display(), target = %target_path.display(), %algorithm, "comparing documents");

    let source = xml::parse_file(source_path)?;
    let target = xml::parse_file(target_path)?;

    let started = Instant::now();
    let comparison = DistanceEngine::new(algorithm).compare(&source, &target);
    let elapsed = started.elapsed();

    let transformed = patch::apply(&source, &target, &comparison.operations)?;
    let report = ComparisonReport::build(algorithm, &source, &target, &comparison);

    info!(
        source = %source_path.display(),
        target = %target_path.display(),
        distance = report.distance,
        similarity = report.similarity,
        operations = report.operations.len(),
        "comparison complete"
    );

    Ok(DocumentComparison {
        source_path: source_path.to_path_buf(),
        target_path: target_path.to_path_buf(),
        report,
        transformed,
        elapsed,
    })
}

/// A dataset member that could not be compared.
#[derive(Debug)]
pub struct DatasetFailure {
    /// Path of the failing document.
    pub path: PathBuf,
    /// Why the pair was skipped.
    pub error: Error,
}

/// Results of a one-vs-many comparison run.
#[derive(Debug)]
pub struct DatasetRun {
    /// Successful comparisons, sorted by edit-script size ascending.
    pub results: Vec<DocumentComparison>,
    /// Members that failed, reported alongside the successes.
    pub failures: Vec<DatasetFailure>,
}

/// Compares `input` against every `.xml` file in `dataset_dir`.
///
/// The input document itself is skipped. Directory entries are visited in
/// sorted filename order, so runs are deterministic; one failing pair does
/// not abort the batch.
pub fn compare_with_dataset(
    input: &Path,
    dataset_dir: &Path,
    algorithm: Algorithm,
) -> Result<DatasetRun> {
    let input_canonical = input.canonicalize().unwrap_or_else(|_| input.to_path_buf());

    let mut members: Vec<PathBuf> = std::fs::read_dir(dataset_dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "xml"))
        .collect();
    members.sort();

    let mut results = Vec::new();
    let mut failures = Vec::new();
    for member in members {
        let member_canonical = member.canonicalize().unwrap_or_else(|_| member.clone());
        if member_canonical == input_canonical {
            continue;
        }
        match compare_documents(input, &member, algorithm) {
            Ok(result) => results.push(result),
            Err(error) => {
                warn!(member = %member.display(), %error, "skipping dataset member");
                failures.push(DatasetFailure {
                    path: member,
                    error,
                });
            }
        }
    }

    results.sort_by(|a, b| {
        a.report
            .edit_script_size()
            .cmp(&b.report.edit_script_size())
            .then_with(|| a.target_path.cmp(&b.target_path))
    });

    Ok(DatasetRun { results, failures })
}
