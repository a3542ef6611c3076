//! Gateway integration tests
//!
//! Routing, bearer extraction and server lifecycle over a real listener.

mod lifecycle;
mod routing;
