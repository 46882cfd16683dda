pub mod generation;
pub mod logic;
pub mod types;
