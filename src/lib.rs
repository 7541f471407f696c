//! Client-side interaction engine for a freeform notes canvas.
//!
//! The pure half (note model, hit testing, gesture state machine) lives in
//! the `canvas` crate. This crate adds everything that talks to the backend:
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Active canvas, pointer input, note operations, notices |
//! | [`store`] | Local note collection with stale-response guards |
//! | [`sync`] | Geometry commits and confirmed field edits |
//! | [`remote`] | `RemoteStore` trait and its HTTP implementation |
//! | [`config`] | Environment-driven client configuration |

pub mod config;
pub mod remote;
pub mod session;
pub mod store;
pub mod sync;
