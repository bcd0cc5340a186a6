pub mod config;
pub mod replay;
pub mod scan;
pub mod synth;
