use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;

use super::config::NamingConfig;
use super::tags::{identify_tag, REMOVE_TAG, VTYPE_TAG};

/// One experiment video matched with the background recorded for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoPair {
    /// Output name: the experiment name without `vtype` and `remove` tokens.
    pub name: String,
    pub experiment: PathBuf,
    pub background: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VideoKind {
    Experiment,
    Background,
}

/// Classify a name and strip it down to its output name, or `None` when it
/// matches neither video kind.
fn classify(name: &str, config: &NamingConfig) -> Option<(VideoKind, String)> {
    let split = config.fname_split.as_str();
    let tokens: Vec<&str> = name.split(split).collect();
    let full_len = config.fname_format.split(split).count();
    let vtype = identify_tag(&config.fname_format, VTYPE_TAG, split);
    let short_len = full_len - vtype.len();

    if tokens.len() == full_len && !vtype.is_empty() {
        let value = tokens[vtype[0]];
        let kind = if value == config.background_tag {
            VideoKind::Background
        } else if !config.experiment_tag.is_empty() && value == config.experiment_tag {
            VideoKind::Experiment
        } else {
            return None;
        };
        let remove = identify_tag(&config.fname_format, REMOVE_TAG, split);
        let base = keep_tokens(&tokens, |i| !vtype.contains(&i) && !remove.contains(&i));
        return Some((kind, base.join(split)));
    }

    if config.experiment_tag.is_empty() && tokens.len() == short_len {
        let without_vtype: Vec<&str> = config
            .fname_format
            .split(split)
            .filter(|t| !t.eq_ignore_ascii_case(VTYPE_TAG))
            .collect();
        let remove = identify_tag(&without_vtype.join(split), REMOVE_TAG, split);
        let base = keep_tokens(&tokens, |i| !remove.contains(&i));
        return Some((VideoKind::Experiment, base.join(split)));
    }

    None
}

fn keep_tokens<'a>(tokens: &[&'a str], keep: impl Fn(usize) -> bool) -> Vec<&'a str> {
    tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| keep(*i))
        .map(|(_, t)| *t)
        .collect()
}

/// Match experiments to backgrounds by output name.
///
/// `names` need not be sorted; results follow sorted experiment order.
/// Returns `(output name, experiment name, background name)` triples.
pub fn pair_names(names: &[String], config: &NamingConfig) -> Vec<(String, String, String)> {
    let mut sorted: Vec<&String> = names.iter().collect();
    sorted.sort();

    let mut experiments = Vec::new();
    let mut backgrounds: BTreeMap<String, Vec<&String>> = BTreeMap::new();
    let mut all_backgrounds = Vec::new();
    for name in sorted {
        match classify(name, config) {
            Some((VideoKind::Experiment, base)) => experiments.push((base, name)),
            Some((VideoKind::Background, base)) => {
                backgrounds.entry(base).or_default().push(name);
                all_backgrounds.push(name);
            }
            None => debug!(name = name.as_str(), "Not a video name, ignored"),
        }
    }

    if config.one_background && all_backgrounds.len() > 1 {
        warn!(
            count = all_backgrounds.len(),
            chosen = all_backgrounds[0].as_str(),
            "Several backgrounds with one_background set, using the first"
        );
    }

    let mut pairs = Vec::new();
    for (base, experiment) in experiments {
        let background = if config.one_background {
            all_backgrounds.first().copied()
        } else {
            match backgrounds.get(&base).map(Vec::as_slice) {
                Some([only]) => Some(*only),
                Some(candidates @ [first, ..]) => {
                    warn!(
                        experiment = experiment.as_str(),
                        candidates = candidates.len(),
                        chosen = first.as_str(),
                        "Several matching backgrounds, using the first"
                    );
                    Some(*first)
                }
                _ => None,
            }
        };
        match background {
            Some(bg) => pairs.push((base, experiment.clone(), bg.clone())),
            None => warn!(
                experiment = experiment.as_str(),
                "No matching background, skipping"
            ),
        }
    }
    pairs
}

/// Name a video entry is known by: folder name, or file stem for `.ser`.
fn entry_name(path: &Path) -> Option<String> {
    if path.is_dir() {
        return path.file_name().map(|n| n.to_string_lossy().into_owned());
    }
    let is_ser = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ser"));
    if is_ser {
        path.file_stem().map(|n| n.to_string_lossy().into_owned())
    } else {
        None
    }
}

/// Scan `videos_root` for video folders and `.ser` files and pair them.
pub fn select_video_pairs(videos_root: &Path, config: &NamingConfig) -> Result<Vec<VideoPair>> {
    let mut entries: BTreeMap<String, PathBuf> = BTreeMap::new();
    for entry in std::fs::read_dir(videos_root)? {
        let path = entry?.path();
        if let Some(name) = entry_name(&path) {
            entries.entry(name).or_insert(path);
        }
    }

    let names: Vec<String> = entries.keys().cloned().collect();
    let pairs = pair_names(&names, config)
        .into_iter()
        .filter_map(|(name, exp, bg)| {
            Some(VideoPair {
                name,
                experiment: entries.get(&exp)?.clone(),
                background: entries.get(&bg)?.clone(),
            })
        })
        .collect::<Vec<_>>();
    debug!(count = pairs.len(), root = %videos_root.display(), "Selected video pairs");
    Ok(pairs)
}
