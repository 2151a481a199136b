pub mod cli;
pub mod narrator;
pub mod report;
