//! Unit tests - exercise single components through the public API
//!
//! Nothing here touches the global namespace table; every normalization
//! passes its own table.

mod dialect_tests;
mod normalizer_tests;
mod proxy_list_tests;
mod transaction_tests;
