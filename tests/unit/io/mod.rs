pub mod cli;
pub mod export;
pub mod volume;
