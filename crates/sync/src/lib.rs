pub mod client;
pub mod error;
pub mod facilities;
pub mod models;
pub mod orchestrator;
pub mod participants;

#[cfg(test)]
mod testutil;
