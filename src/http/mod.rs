//! HTTP interface: router, middleware and endpoint handlers

pub mod modules;
pub mod router;
