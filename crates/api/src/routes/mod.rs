//! Route Handlers

pub mod doses;
pub mod features;
pub mod predictions;
