pub mod assembler;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod deprecation;
pub mod document;
pub mod index;
pub mod merger;
pub mod metrics;
pub mod navigation;
pub mod orchestrator;
pub mod parameters;
pub mod path;
pub mod responses;
pub mod schema;
pub mod type_dictionary;
pub mod visitor;
pub mod walk;

#[cfg(test)]
mod tests;
