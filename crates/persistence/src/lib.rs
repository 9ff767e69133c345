pub mod config;
pub mod error;
pub mod expectation_file_watcher;
pub mod file_reader;
pub mod file_watcher;

pub use config::PersistenceConfig;
pub use error::PersistenceError;
pub use expectation_file_watcher::ExpectationFileWatcher;
pub use file_watcher::FileWatcher;
