//! Actix middleware shared by every route.
//!
//! [`Trace`] assigns each request a trace identifier, echoes it in the
//! `trace-id` response header, and scopes it for error bodies and
//! notification deliveries spawned by the handler.

pub mod trace;

pub use trace::Trace;
