//! Helpers for reading fixed-layout binary records.

pub mod cur;
pub mod view;
#[macro_use]
pub mod fields;
