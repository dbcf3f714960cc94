//! Logging utilities for output and progress tracking

pub mod console;
pub mod log;
pub mod progress;

pub use console::{format_pairs_table, print_pairs};
pub use log::{log_operation_complete, log_operation_start};
pub use progress::{create_main_progress_bar, finish_progress_bar, progress_bar_if};
