//! HTTP client for the GAME API and the planner trait it implements

pub mod client;
pub mod planner;

pub use client::GameClient;
pub use planner::Planner;
