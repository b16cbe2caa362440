pub mod manipulation;
pub mod normalize;

pub use manipulation::*;
pub use normalize::*;
