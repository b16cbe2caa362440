pub mod cli;
pub mod commands;
pub mod common;
pub mod extract;
pub mod keywords;
pub mod matching;
pub mod records;
pub mod selection;
pub mod text;
pub mod validation;
