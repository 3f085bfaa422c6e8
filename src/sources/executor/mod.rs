pub mod chain;
pub mod steps;
