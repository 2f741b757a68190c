//! Scanning many phantoms with one setup.

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::scanning::{ScanOutput, ScanningObject};
use crate::types::Volume;

/// What to do when scanning one phantom fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Record the failure and carry on with the next phantom
    #[default]
    Skip,
    /// Stop at the first failure and return it
    Abort,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

impl BatchReport {
    pub fn total(&self) -> usize { self.succeeded.len() + self.failed.len() }
}

pub struct Batch {
    pub on_error: OnError,
    pub show_progress: bool,
}

impl Batch {

    pub fn new(on_error: OnError) -> Self { Self { on_error, show_progress: true } }

    pub fn quiet(self) -> Self { Self { show_progress: false, ..self } }

    /// Scan every phantom in `phantoms` and hand each result to `sink`.
    ///
    /// Failures to load a phantom, to scan it, or to store the result are
    /// all subject to `on_error`.
    pub fn run<E, I, F>(&self, engine: &E, scan: &ScanningObject, phantoms: I, mut sink: F) -> Result<BatchReport>
    where
        E: Engine + ?Sized,
        I: IntoIterator<Item = (String, Result<Volume>)>,
        I::IntoIter: ExactSizeIterator,
        F: FnMut(&str, ScanOutput) -> Result<()>,
    {
        let phantoms = phantoms.into_iter();
        let progress = if self.show_progress { ProgressBar::new(phantoms.len() as u64) }
                       else                  { ProgressBar::hidden() };
        progress.set_style(ProgressStyle::with_template("[{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")
                           .unwrap_or_else(|_| ProgressStyle::default_bar()));

        let mut report = BatchReport::default();
        for (name, phantom) in phantoms {
            progress.set_message(name.clone());
            let outcome = phantom
                .and_then(|phantom| scan.run(engine, phantom.view()))
                .and_then(|output| sink(&name, output));
            match outcome {
                Ok(()) => report.succeeded.push(name),
                Err(e) => match self.on_error {
                    OnError::Skip  => {
                        warn!("skipping {name}: {e}");
                        report.failed.push((name, e));
                    }
                    OnError::Abort => {
                        error!("aborting batch at {name}: {e}");
                        progress.abandon();
                        return Err(e)
                    }
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();
        info!("batch done: {} succeeded, {} failed", report.succeeded.len(), report.failed.len());
        Ok(report)
    }
}
