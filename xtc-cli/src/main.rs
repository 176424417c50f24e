//! XML Tree Comparison Tool CLI
//!
//! Compares XML documents as ordered labeled trees, writing a JSON metrics
//! file, per-pair diff reports, and the transformed document for each pair.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use xml_ted::{
    compare_documents, compare_with_dataset, print_to_string_pretty, Algorithm,
    DocumentComparison,
};

/// XML Tree Comparison Tool
#[derive(Parser)]
#[command(name = "xtc")]
#[command(version)]
#[command(about = "XML tree comparison tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Comparison algorithm selector.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    /// Compare tree shape and tag names only
    Structural,
    /// Also compare attributes and text content
    ContentAware,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(arg: AlgorithmArg) -> Algorithm {
        match arg {
            AlgorithmArg::Structural => Algorithm::Structural,
            AlgorithmArg::ContentAware => Algorithm::ContentAware,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two XML documents
    #[command(visible_alias = "s")]
    Single {
        /// First (source) document
        input1: String,
        /// Second (target) document
        input2: String,

        /// Comparison algorithm
        #[arg(short, long, value_enum, default_value_t = AlgorithmArg::Structural)]
        algorithm: AlgorithmArg,

        /// Output directory for results
        #[arg(short, long)]
        output: String,
    },

    /// Compare one document against every XML file in a directory
    #[command(visible_alias = "d")]
    Dataset {
        /// Input document
        input: String,
        /// Directory of XML documents to compare against
        dataset: String,

        /// Comparison algorithm
        #[arg(short, long, value_enum, default_value_t = AlgorithmArg::Structural)]
        algorithm: AlgorithmArg,

        /// Output directory for results
        #[arg(short, long)]
        output: String,
    },
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Single {
            input1,
            input2,
            algorithm,
            output,
        } => run_single(&input1, &input2, algorithm.into(), &output),
        Commands::Dataset {
            input,
            dataset,
            algorithm,
            output,
        } => run_dataset(&input, &dataset, algorithm.into(), &output),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

/// Output directory layout: analysis files and transformed documents.
struct OutputDirs {
    analysis: PathBuf,
    documents: PathBuf,
}

impl OutputDirs {
    fn create(output: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let root = PathBuf::from(output);
        let analysis = root.join("analysis");
        let documents = root.join("documents");
        fs::create_dir_all(&analysis)?;
        fs::create_dir_all(&documents)?;
        Ok(OutputDirs {
            analysis,
            documents,
        })
    }
}

/// Runs a single two-document comparison.
fn run_single(
    input1: &str,
    input2: &str,
    algorithm: Algorithm,
    output: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let dirs = OutputDirs::create(output)?;
    let result = compare_documents(Path::new(input1), Path::new(input2), algorithm)?;
    let entry = write_pair_outputs(&result, &dirs)?;
    write_metrics(&dirs, &[entry])?;

    println!("\nComparison Summary:");
    println!("Algorithm used: {}", algorithm);
    println!("Distance: {}", result.report.distance);
    println!("Similarity: {:.4}", result.report.similarity);
    println!("Edit script size: {}", result.report.edit_script_size());
    println!("Processing time: {:.3} seconds", result.elapsed.as_secs_f64());
    println!("\nResults saved to: {}", output);

    Ok(())
}

/// Runs a one-vs-many dataset comparison.
fn run_dataset(
    input: &str,
    dataset: &str,
    algorithm: Algorithm,
    output: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let dirs = OutputDirs::create(output)?;
    let run = compare_with_dataset(Path::new(input), Path::new(dataset), algorithm)?;

    let mut entries = Vec::with_capacity(run.results.len() + run.failures.len());
    for result in &run.results {
        entries.push(write_pair_outputs(result, &dirs)?);
    }
    for failure in &run.failures {
        entries.push(serde_json::json!({
            "document1": input,
            "document2": failure.path.display().to_string(),
            "error": failure.error.to_string(),
        }));
    }
    write_metrics(&dirs, &entries)?;

    println!("\nComparison Summary:");
    println!("Algorithm used: {}", algorithm);
    println!("Number of comparisons: {}", run.results.len());
    if !run.failures.is_empty() {
        println!("Failed comparisons: {}", run.failures.len());
    }
    for result in &run.results {
        println!(
            "\nComparison: {} vs {}",
            file_name(&result.source_path),
            file_name(&result.target_path)
        );
        println!("Edit script size: {}", result.report.edit_script_size());
        println!("Similarity: {:.4}", result.report.similarity);
        println!("Processing time: {:.3} seconds", result.elapsed.as_secs_f64());
    }
    println!("\nResults saved to: {}", output);

    Ok(())
}

/// Writes the diff report and transformed document for one pair, returning
/// its metrics entry.
fn write_pair_outputs(
    result: &DocumentComparison,
    dirs: &OutputDirs,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let stem1 = file_stem(&result.source_path);
    let stem2 = file_stem(&result.target_path);

    let diff_path = dirs.analysis.join(format!("diff_{}_{}.txt", stem1, stem2));
    let mut diff_text = result.report.diff_lines().join("\n");
    diff_text.push('\n');
    fs::write(&diff_path, diff_text)?;

    let document_path = dirs.documents.join(format!("output_{}_{}.xml", stem1, stem2));
    fs::write(&document_path, print_to_string_pretty(&result.transformed)?)?;

    let mut entry = serde_json::to_value(&result.report)?;
    let Some(object) = entry.as_object_mut() else {
        return Err("report must serialize to a JSON object".into());
    };
    object.insert(
        "document1".to_string(),
        result.source_path.display().to_string().into(),
    );
    object.insert(
        "document2".to_string(),
        result.target_path.display().to_string().into(),
    );
    object.insert(
        "processing_time".to_string(),
        result.elapsed.as_secs_f64().into(),
    );
    object.insert(
        "edit_script_size".to_string(),
        result.report.edit_script_size().into(),
    );
    object.insert(
        "diff_report".to_string(),
        diff_path.display().to_string().into(),
    );
    object.insert(
        "output_document".to_string(),
        document_path.display().to_string().into(),
    );
    Ok(entry)
}

/// Writes the collected metrics entries as a JSON array.
fn write_metrics(
    dirs: &OutputDirs,
    entries: &[serde_json::Value],
) -> Result<(), Box<dyn std::error::Error>> {
    let path = dirs.analysis.join("comparison_metrics.json");
    let writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(writer, entries)?;
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
