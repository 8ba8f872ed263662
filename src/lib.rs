pub mod cli;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use cli::{Cli, Commands};
pub use models::{Chunk, Config, SearchResult};
pub use services::{DocumentIndex, IngestReport};
