//! Address sources: CIDR expansion and target files

pub mod file_input;
pub mod target_parser;

pub use file_input::{targets_from_file, FileInputHandler, FileInputStats};
pub use target_parser::{targets_from_range, TargetParser};
