use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};

use allergen_io::{DatasetReader, ExperimentName, FeatureRecord, LabeledRecord, ResultWriter};
use allergen_model::{PipelineConfig, TrainingOutcome, Verdict};
use allergen_rf::{EvaluationReport, ForestConfig, MaxFeatures, SplitCriterion};

#[derive(Parser)]
#[command(name = "allergen")]
#[command(about = "Food-allergy risk classification with a random forest")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the split shuffle and the forest
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel tree training (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Training parameters shared by both subcommands.
#[derive(Args, Debug, Clone)]
struct TrainingArgs {
    /// Number of trees in the forest
    #[arg(long, default_value_t = ForestConfig::DEFAULT_TREES)]
    trees: usize,

    /// Fraction of records held out for evaluation, in (0, 1)
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,

    /// Maximum tree depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Features considered per split: "sqrt", "log2", or "all"
    #[arg(long, default_value = "sqrt")]
    max_features: String,

    /// Split impurity: "gini" or "entropy"
    #[arg(long, default_value = "gini")]
    criterion: String,
}

/// One record given on the command line.
#[derive(Args, Debug, Clone)]
struct RecordArgs {
    /// Age in years (5-80)
    #[arg(long, required_unless_present = "records", conflicts_with = "records")]
    age: Option<u32>,

    /// Male, Female, or Other
    #[arg(long, required_unless_present = "records", conflicts_with = "records")]
    gender: Option<String>,

    /// Yes or No
    #[arg(long, required_unless_present = "records", conflicts_with = "records")]
    family_history: Option<String>,

    /// None, Mild, Moderate, or Severe
    #[arg(long, required_unless_present = "records", conflicts_with = "records")]
    previous_reaction: Option<String>,

    /// Skin rash, Swelling, Nausea, Breathing issues, or No symptoms
    #[arg(long, required_unless_present = "records", conflicts_with = "records")]
    symptoms: Option<String>,

    /// Dairy, Nuts, Seafood, Gluten, or Eggs
    #[arg(long, required_unless_present = "records", conflicts_with = "records")]
    food_type: Option<String>,

    /// Times the food is eaten per month
    #[arg(long, required_unless_present = "records", conflicts_with = "records")]
    food_frequency: Option<u32>,

    /// Asthma, Eczema, or None
    #[arg(long, required_unless_present = "records", conflicts_with = "records")]
    medical_conditions: Option<String>,

    /// Serum IgE level (finite, >= 0)
    #[arg(long, required_unless_present = "records", conflicts_with = "records")]
    ige_levels: Option<f64>,

    /// Severity score (0-10)
    #[arg(long, required_unless_present = "records", conflicts_with = "records")]
    severity_score: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Train on a labeled dataset and report held-out accuracy, precision, and recall
    Evaluate {
        /// Path to the labeled CSV dataset
        #[arg(long)]
        data: PathBuf,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: ExperimentName,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        training: TrainingArgs,
    },

    /// Train on a labeled dataset, then classify new records
    Predict {
        /// Path to the labeled CSV dataset used for training
        #[arg(long)]
        data: PathBuf,

        /// CSV of unlabeled records to classify (instead of record flags)
        #[arg(long)]
        records: Option<PathBuf>,

        #[command(flatten)]
        record: RecordArgs,

        /// Experiment name; when set, verdicts are also written to a JSON file
        #[arg(long)]
        experiment: Option<ExperimentName>,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        training: TrainingArgs,
    },
}

// --- JSON output structs ---

#[derive(Serialize)]
struct EvaluateSummary<'a> {
    n_records: usize,
    n_train: usize,
    n_test: usize,
    n_test_rejected: usize,
    n_trees: usize,
    seed: u64,
    report: &'a EvaluationReport,
}

#[derive(Serialize)]
struct EvaluateOutput<'a> {
    experiment: &'a str,
    artifact: PathBuf,
    #[serde(flatten)]
    summary: EvaluateSummary<'a>,
}

#[derive(Serialize)]
struct PredictionEntry {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    allergic_share: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct PredictSummary {
    n_train: usize,
    held_out_accuracy: f64,
    n_rejected: usize,
    predictions: Vec<PredictionEntry>,
}

fn parse_max_features(s: &str) -> Result<MaxFeatures> {
    match s {
        "sqrt" => Ok(MaxFeatures::Sqrt),
        "log2" => Ok(MaxFeatures::Log2),
        "all" => Ok(MaxFeatures::All),
        other => anyhow::bail!("unknown max features: {other} (expected sqrt, log2, or all)"),
    }
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        other => anyhow::bail!("unknown criterion: {other} (expected gini or entropy)"),
    }
}

fn required<T>(value: Option<T>, flag: &str) -> Result<T> {
    value.with_context(|| format!("--{flag} is required when --records is not given"))
}

impl RecordArgs {
    fn into_record(self) -> Result<FeatureRecord> {
        Ok(FeatureRecord {
            age: required(self.age, "age")?,
            gender: required(self.gender, "gender")?,
            family_history: required(self.family_history, "family-history")?,
            previous_reaction: required(self.previous_reaction, "previous-reaction")?,
            symptoms: required(self.symptoms, "symptoms")?,
            food_type: required(self.food_type, "food-type")?,
            food_frequency: required(self.food_frequency, "food-frequency")?,
            medical_conditions: required(self.medical_conditions, "medical-conditions")?,
            ige_levels: required(self.ige_levels, "ige-levels")?,
            severity_score: required(self.severity_score, "severity-score")?,
        })
    }
}

fn build_pipeline_config(training: &TrainingArgs, seed: u64) -> Result<PipelineConfig> {
    let forest = ForestConfig::new(training.trees)?
        .with_max_depth(training.max_depth)
        .with_max_features(parse_max_features(&training.max_features)?)
        .with_criterion(parse_criterion(&training.criterion)?);
    Ok(PipelineConfig::new(training.test_fraction)?
        .with_forest(forest)
        .with_seed(seed))
}

fn train(data: &Path, training: &TrainingArgs, seed: u64) -> Result<(usize, TrainingOutcome)> {
    let records: Vec<LabeledRecord> = DatasetReader::new(data)
        .read_labeled()
        .context("failed to read labeled dataset")?;
    let config = build_pipeline_config(training, seed)?;
    let outcome = config.train(&records).context("training failed")?;
    debug!("confusion matrix\n{}", outcome.report.confusion_matrix);
    Ok((records.len(), outcome))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Evaluate {
            data,
            experiment,
            output_dir,
            training,
        } => {
            let (n_records, outcome) = train(&data, &training, cli.seed)?;

            let summary = EvaluateSummary {
                n_records,
                n_train: outcome.n_train,
                n_test: outcome.n_test,
                n_test_rejected: outcome.n_test_rejected,
                n_trees: outcome.pipeline.forest().n_trees(),
                seed: cli.seed,
                report: &outcome.report,
            };
            let writer = ResultWriter::new(&output_dir, experiment.clone())?;
            let artifact = writer.write_evaluate(&summary)?;

            let output = EvaluateOutput {
                experiment: experiment.as_str(),
                artifact,
                summary,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Predict {
            data,
            records,
            record,
            experiment,
            output_dir,
            training,
        } => {
            let queries = match records {
                Some(path) => DatasetReader::new(&path)
                    .read_unlabeled()
                    .context("failed to read records to classify")?,
                None => vec![record.into_record()?],
            };

            let (_, outcome) = train(&data, &training, cli.seed)?;
            let pipeline = &outcome.pipeline;

            let mut predictions = Vec::with_capacity(queries.len());
            for (index, query) in queries.iter().enumerate() {
                let entry = match pipeline.assess(query) {
                    Ok(assessment) => PredictionEntry {
                        index,
                        verdict: Some(assessment.verdict),
                        allergic_share: Some(assessment.allergic_share),
                        error: None,
                    },
                    Err(e) if e.is_record_error() => {
                        warn!(index, error = %e, "record rejected");
                        PredictionEntry {
                            index,
                            verdict: None,
                            allergic_share: None,
                            error: Some(e.to_string()),
                        }
                    }
                    Err(e) => return Err(e).context("prediction failed"),
                };
                predictions.push(entry);
            }

            let n_rejected = predictions.iter().filter(|p| p.error.is_some()).count();
            info!(
                n_records = predictions.len(),
                n_rejected,
                "predictions complete"
            );
            let summary = PredictSummary {
                n_train: outcome.n_train,
                held_out_accuracy: outcome.report.accuracy,
                n_rejected,
                predictions,
            };

            if let Some(experiment) = experiment {
                let writer = ResultWriter::new(&output_dir, experiment)?;
                writer.write_predict(&summary)?;
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
