//! Shared test helpers

pub mod fakes;
