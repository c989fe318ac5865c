#![forbid(unsafe_code)]

pub mod repository;
pub mod results_file;

pub use repository::{
    InMemoryResultsRepository, ResultsRepository, SessionResults, Storage, StorageError,
    WriteOutcome,
};
pub use results_file::CsvResultsRepository;
