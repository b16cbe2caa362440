pub mod logging;
pub mod output;
pub mod progress;
pub mod types;
pub mod utils;

pub use logging::*;
pub use output::ValidationOutputPaths;
pub use progress::{create_count_progress_bar, create_spinner};
pub use types::*;
pub use utils::*;
