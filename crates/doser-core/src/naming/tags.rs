//! Metadata tags encoded in folder names.
//!
//! A name such as `20210929_6M-PEO_fps-25k_1` is read against a format such
//! as `date_sampleinfo_fps_run`: tokens and tags are paired by position
//! after splitting both on the same separator.

use std::fmt;

use tracing::warn;

use crate::error::{DoserError, Result};

/// Format tag marking the video type (experiment or background).
pub const VTYPE_TAG: &str = "vtype";
/// Format tag whose tokens are dropped from output names.
pub const REMOVE_TAG: &str = "remove";
/// Key holding the whole `sampleinfo` token.
pub const SAMPLE_KEY: &str = "sample";

#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) => write!(f, "{t}"),
        }
    }
}

/// Tags parsed from one name, in format order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilenameTags {
    entries: Vec<(String, TagValue)>,
}

impl FilenameTags {
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn fps(&self) -> Option<f64> {
        match self.get("fps") {
            Some(TagValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: &str, value: TagValue) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}

/// Separators and formats used to read names.
#[derive(Clone, Copy, Debug)]
pub struct NameFormat<'a> {
    pub fname_format: &'a str,
    pub sampleinfo_format: &'a str,
    pub fname_split: &'a str,
    pub sample_split: &'a str,
}

fn digits(value: &str) -> Option<f64> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<f64>().ok()
}

/// Parse the tags of `name`.
///
/// Tags containing `fps` keep only the digits of their token, times 1000
/// when the token contains `k`; tags containing `run` keep the digits. The
/// `sampleinfo` tag is stored whole under `sample` and split into the
/// sub-tags of `sampleinfo_format`. Any other tag stores its raw token.
pub fn parse_fname(name: &str, format: &NameFormat<'_>) -> Result<FilenameTags> {
    let fail = |reason: String| DoserError::FilenameFormat {
        name: name.to_string(),
        format: format.fname_format.to_string(),
        reason,
    };

    let tokens: Vec<&str> = name.split(format.fname_split).collect();
    let tags: Vec<&str> = format.fname_format.split(format.fname_split).collect();
    if tokens.len() < tags.len() {
        return Err(fail(format!(
            "{} tokens for {} tags",
            tokens.len(),
            tags.len()
        )));
    }

    let mut parsed = FilenameTags::default();
    for (tag, value) in tags.iter().zip(&tokens) {
        let lower = tag.to_lowercase();
        if lower.contains("fps") {
            let base = digits(value).ok_or_else(|| fail(format!("no digits in fps {value:?}")))?;
            let fps = if value.contains('k') { base * 1000.0 } else { base };
            parsed.insert("fps", TagValue::Number(fps));
        } else if lower.contains("run") {
            let run = digits(value).ok_or_else(|| fail(format!("no digits in run {value:?}")))?;
            parsed.insert("run", TagValue::Number(run));
        } else if lower.contains("sampleinfo") {
            parsed.insert(SAMPLE_KEY, TagValue::Text(value.to_string()));
            let parts: Vec<&str> = value.split(format.sample_split).collect();
            let sub_tags: Vec<&str> = format.sampleinfo_format.split(format.sample_split).collect();
            if parts.len() < sub_tags.len() {
                return Err(fail(format!(
                    "sample info {value:?} does not match {:?}",
                    format.sampleinfo_format
                )));
            }
            for (sub_tag, part) in sub_tags.iter().zip(parts) {
                parsed.insert(sub_tag, TagValue::Text(part.to_string()));
            }
        } else {
            parsed.insert(tag, TagValue::Text(value.to_string()));
        }
    }
    Ok(parsed)
}

/// Positions of `tag` in `fname_format`, compared case-insensitively.
pub fn identify_tag(fname_format: &str, tag: &str, fname_split: &str) -> Vec<usize> {
    fname_format
        .split(fname_split)
        .enumerate()
        .filter(|(_, t)| t.eq_ignore_ascii_case(tag))
        .map(|(i, _)| i)
        .collect()
}

pub fn has_tag(fname_format: &str, tag: &str, fname_split: &str) -> bool {
    !identify_tag(fname_format, tag, fname_split).is_empty()
}

/// Drop every token of `name` at a position of `tag`.
pub fn remove_tag(name: &str, fname_format: &str, tag: &str, fname_split: &str) -> String {
    let indices = identify_tag(fname_format, tag, fname_split);
    if indices.is_empty() {
        warn!(tag, fname_format, "Tag not present in the format");
    }
    name.split(fname_split)
        .enumerate()
        .filter(|(i, _)| !indices.contains(i))
        .map(|(_, token)| token)
        .collect::<Vec<_>>()
        .join(fname_split)
}

/// Tokens of `name` at the positions of `tag`.
pub fn get_tag(name: &str, fname_format: &str, tag: &str, fname_split: &str) -> Vec<String> {
    let tokens: Vec<&str> = name.split(fname_split).collect();
    identify_tag(fname_format, tag, fname_split)
        .into_iter()
        .filter_map(|i| tokens.get(i).map(|t| t.to_string()))
        .collect()
}

/// Replace the tokens at the positions of `tag` with `value`.
pub fn replace_tag(
    name: &str,
    fname_format: &str,
    tag: &str,
    value: &str,
    fname_split: &str,
) -> String {
    let indices = identify_tag(fname_format, tag, fname_split);
    name.split(fname_split)
        .enumerate()
        .map(|(i, token)| if indices.contains(&i) { value } else { token })
        .collect::<Vec<_>>()
        .join(fname_split)
}

/// Insert `value` at each position of `tag`, shifting later tokens right.
pub fn insert_tag(
    name: &str,
    fname_format: &str,
    tag: &str,
    value: &str,
    fname_split: &str,
) -> String {
    let mut tokens: Vec<&str> = name.split(fname_split).collect();
    for index in identify_tag(fname_format, tag, fname_split) {
        tokens.insert(index.min(tokens.len()), value);
    }
    tokens.join(fname_split)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_is_case_insensitive() {
        assert_eq!(identify_tag("date_VTYPE_run_vtype", "vtype", "_"), vec![1, 3]);
        assert!(!has_tag("date_run", "vtype", "_"));
    }

    #[test]
    fn test_insert_then_remove() {
        let format = "date_run_vtype";
        let inserted = insert_tag("20210929_1", format, "vtype", "bg", "_");
        assert_eq!(inserted, "20210929_1_bg");
        assert_eq!(remove_tag(&inserted, format, "vtype", "_"), "20210929_1");
    }
}
