pub mod cricbuzz;
pub mod error;

// Re-export commonly used types
pub use cricbuzz::{CricbuzzClient, CricbuzzConfig};
pub use error::FetchError;
