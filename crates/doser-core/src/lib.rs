pub mod calibration;
pub mod consts;
pub mod detection;
pub mod error;
pub mod frame;
pub mod io;
pub mod naming;
pub mod pipeline;
pub mod signal;
