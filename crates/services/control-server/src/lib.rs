//! HTTP control plane for the external stream worker.
//!
//! Translates JSON requests into [`streamgate_core`] lifecycle calls and maps
//! the results to HTTP responses. All process state lives in the core crate;
//! this layer is routing, serialization, and status mapping.

pub mod api;
