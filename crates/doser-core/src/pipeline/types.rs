use std::path::PathBuf;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Reading,
    Calibrating,
    BuildingBackground,
    Binarizing,
    Measuring,
    Writing,
    Conditioning,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading frames"),
            Self::Calibrating => write!(f, "Calibrating geometry"),
            Self::BuildingBackground => write!(f, "Building background"),
            Self::Binarizing => write!(f, "Binarizing frames"),
            Self::Measuring => write!(f, "Measuring diameters"),
            Self::Writing => write!(f, "Writing output"),
            Self::Conditioning => write!(f, "Conditioning series"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items
    /// in this stage (frames, videos, files), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// Work items within the current stage have completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// Progress reporter that ignores everything.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Outcome of one unit of batch work (a video pair or a folder).
#[derive(Clone, Debug, PartialEq)]
pub enum UnitStatus {
    Done,
    /// Output already present and the policy is to keep it.
    Skipped,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnitOutcome {
    pub name: String,
    pub output: Option<PathBuf>,
    pub status: UnitStatus,
}

/// Per-unit results of a batch run. A failed unit never stops its siblings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    pub units: Vec<UnitOutcome>,
}

impl BatchReport {
    pub fn done(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Done))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.units.iter().filter_map(|u| match &u.status {
            UnitStatus::Failed(reason) => Some((u.name.as_str(), reason.as_str())),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&UnitStatus) -> bool) -> usize {
        self.units.iter().filter(|u| pred(&u.status)).count()
    }
}
