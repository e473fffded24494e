pub mod conditioner;
pub mod config;
pub mod runs;
pub mod table;

pub use conditioner::{
    add_critical_time, add_strain_rate, closest_index_for_value, condition, truncate_data,
    CriticalPoint,
};
pub use config::{SignalConfig, Truncation};
pub use table::{Column, DiameterSample, TimeSeries};
