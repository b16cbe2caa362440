pub mod citations;
pub mod keywords;
pub mod match_title;
pub mod pipeline;
pub mod select;
pub mod validate;

pub use citations::run_citations;
pub use keywords::run_keywords;
pub use match_title::run_match;
pub use pipeline::run_pipeline;
pub use select::run_select;
pub use validate::run_validate;
