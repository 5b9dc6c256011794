use std::path::Path;

use log::LevelFilter;
use study_logging::LogDestination;

/// File logging always; `verbose` mirrors debug output to stderr.
pub fn initialize(log_file: &Path, verbose: bool) {
    let (destination, level) = if verbose {
        (LogDestination::Both, LevelFilter::Debug)
    } else {
        (LogDestination::File, LevelFilter::Info)
    };
    study_logging::initialize(destination, level, log_file);
}
