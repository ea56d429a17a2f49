//! Lazy entity references and the container that holds them.

pub mod errors;
pub mod list;
pub mod materializer;
pub mod resolver;

pub use errors::ProxyError;
pub use list::{Element, ProxyAwareList, Slot};
pub use materializer::{persist, DescribeMaterializer, FromGraph, Materializer, ToGraph};
pub use resolver::Proxy;
