//! Utility modules for input/output and logging

pub mod io;
pub mod logging;

pub use io::load_table;
