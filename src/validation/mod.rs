pub mod controller;
pub mod funnel;
pub mod inaccessible;
pub mod state;

pub use controller::*;
pub use funnel::FunnelCounts;
pub use inaccessible::{inaccessible_keys, load_inaccessible};
pub use state::ValidationState;
