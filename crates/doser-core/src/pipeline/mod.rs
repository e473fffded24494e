pub mod batch;
pub mod config;
pub mod extract;
pub mod types;

pub use batch::{
    binaries_to_csvs, csv_to_annotated, csvs_to_annotated, output_name_tags, resolve_fps,
    videos_to_binaries, videos_to_csvs,
};
pub use config::{OutputConfig, PipelineConfig};
pub use extract::{
    binaries_to_csv, binaries_to_series, build_pair_model, extract_pair, extract_samples,
    measure_frame, FrameSink, PairExtraction, PairModel,
};
pub use types::{BatchReport, NoOpReporter, PipelineStage, ProgressReporter, UnitOutcome, UnitStatus};
