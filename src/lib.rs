// src/lib.rs — Library root for rulemine

pub mod cli;
pub mod infra;
pub mod patterns;
