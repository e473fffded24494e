use serde::{Deserialize, Serialize};

use super::tags::{NameFormat, REMOVE_TAG, VTYPE_TAG};

/// How video folder names encode experiment metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Tags of a folder name, joined by `fname_split`. Recognized tags:
    /// `sampleinfo`, any tag containing `fps` or `run`, `vtype` (video type)
    /// and `remove` (dropped from output names).
    #[serde(default = "default_fname_format")]
    pub fname_format: String,
    /// Sub-tags of the `sampleinfo` tag, joined by `sample_split`.
    #[serde(default = "default_sampleinfo_format")]
    pub sampleinfo_format: String,
    #[serde(default = "default_fname_split")]
    pub fname_split: String,
    #[serde(default = "default_sample_split")]
    pub sample_split: String,
    /// `vtype` value of experiment videos. Empty when experiment folder
    /// names carry no `vtype` token at all.
    #[serde(default = "default_experiment_tag")]
    pub experiment_tag: String,
    /// `vtype` value of background videos.
    #[serde(default = "default_background_tag")]
    pub background_tag: String,
    /// Use a single background video for every experiment.
    #[serde(default)]
    pub one_background: bool,
}

fn default_fname_format() -> String {
    "date_sampleinfo_fps_run_vtype".into()
}
fn default_sampleinfo_format() -> String {
    "mw-backbone".into()
}
fn default_fname_split() -> String {
    "_".into()
}
fn default_sample_split() -> String {
    "-".into()
}
fn default_experiment_tag() -> String {
    "exp".into()
}
fn default_background_tag() -> String {
    "bg".into()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            fname_format: default_fname_format(),
            sampleinfo_format: default_sampleinfo_format(),
            fname_split: default_fname_split(),
            sample_split: default_sample_split(),
            experiment_tag: default_experiment_tag(),
            background_tag: default_background_tag(),
            one_background: false,
        }
    }
}

impl NamingConfig {
    /// Formats and separators for reading full folder names.
    pub fn name_format(&self) -> NameFormat<'_> {
        NameFormat {
            fname_format: &self.fname_format,
            sampleinfo_format: &self.sampleinfo_format,
            fname_split: &self.fname_split,
            sample_split: &self.sample_split,
        }
    }

    /// Format of output names: the full format without `vtype` and
    /// `remove` tags.
    pub fn output_format(&self) -> String {
        self.fname_format
            .split(self.fname_split.as_str())
            .filter(|t| !t.eq_ignore_ascii_case(VTYPE_TAG) && !t.eq_ignore_ascii_case(REMOVE_TAG))
            .collect::<Vec<_>>()
            .join(&self.fname_split)
    }
}
