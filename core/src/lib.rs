pub mod api;
pub mod cli;
pub mod error;
pub mod extraction;
pub mod render;
pub mod series;
pub mod types;

#[cfg(test)]
mod testing;

pub use api::{convert, summarize, write_series, ConvertOptions, SeriesSummary};
pub use cli::report::TextReport;
pub use error::{CinecatError, Result};
pub use series::{read_dir, read_file, Series};
pub use types::*;
