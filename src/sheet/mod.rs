pub mod matrix;
pub mod merge;
