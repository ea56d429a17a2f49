//! Integration tests - components working together through a data source
//!
//! Tests that touch the process-wide namespace table are marked `#[serial]`.

mod common;
mod config_tests;
mod mapper_tests;
mod normalize_global_tests;
mod transactional_tests;
