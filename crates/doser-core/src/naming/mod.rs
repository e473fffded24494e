pub mod config;
pub mod pairing;
pub mod tags;

pub use config::NamingConfig;
pub use pairing::{pair_names, select_video_pairs, VideoPair};
pub use tags::{
    get_tag, has_tag, identify_tag, insert_tag, parse_fname, remove_tag, replace_tag,
    FilenameTags, NameFormat, TagValue,
};
