pub mod insertion;
pub mod problem;
mod utils;

pub mod json;
