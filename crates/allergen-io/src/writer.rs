//! JSON result writer for evaluation and prediction outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::ExperimentName;
use crate::IoError;

/// Writes evaluation and prediction artifacts as pretty-printed JSON.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_evaluate.json` and
/// `{experiment}_predict.json`. The writer accepts any serializable body, so
/// it has no dependency on the model crates.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

/// Envelope stamping every artifact with its experiment name.
#[derive(Serialize)]
struct Artifact<'a, T: Serialize> {
    experiment: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write an evaluation summary to `{experiment}_evaluate.json`.
    ///
    /// `body` must serialize as a JSON object; its fields are written next to
    /// the `experiment` key.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all)]
    pub fn write_evaluate<T: Serialize>(&self, body: &T) -> Result<PathBuf, IoError> {
        self.write_artifact("evaluate", body)
    }

    /// Write prediction verdicts to `{experiment}_predict.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`] on failure.
    #[instrument(skip_all)]
    pub fn write_predict<T: Serialize>(&self, body: &T) -> Result<PathBuf, IoError> {
        self.write_artifact("predict", body)
    }

    fn write_artifact<T: Serialize>(&self, kind: &str, body: &T) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_{kind}.json", self.experiment.as_str()));
        let artifact = Artifact {
            experiment: self.experiment.as_str(),
            body,
        };
        let json = serde_json::to_string_pretty(&artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), "{kind} result written");
        Ok(path)
    }

    /// Return the directory artifacts are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
