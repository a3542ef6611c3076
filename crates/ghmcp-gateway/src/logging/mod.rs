//! Request logging infrastructure
//!
//! Short trace ids correlate the entry and exit lines of one request, and are
//! the only request identifier that appears in authentication warnings.

mod trace_context;

pub use trace_context::{generate_trace_id, RequestSpan, TraceContext};
