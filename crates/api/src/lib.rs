//! Administrative HTTP surface for producers of message tasks.
//!
//! Authentication is the job of whatever fronts this service; every route
//! here assumes an already-authorised caller.

pub mod routes;
pub mod state;
