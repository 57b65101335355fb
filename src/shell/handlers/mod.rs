//! Dispatch of decoded client requests.
//!
//! The transport hands every decoded request to the function matching its
//! interface, together with the id of the resource it arrived on. Two extra
//! entry points cover resource lifecycle the wire protocol does not spell
//! out as requests: [`bind_wm_base`] for a client binding the shell global
//! and [`client_disconnected`] for connections that went away without the
//! orderly destructor requests.
//!
//! None of these functions report errors to the caller; protocol
//! violations are posted on the offending resource through the
//! [`ShellTransport`](crate::protocol::ShellTransport) sink and leave the
//! shell state untouched.

mod positioner;
mod surface;
mod wm_base;

pub use positioner::positioner_request;
pub use surface::{popup_request, surface_request, toplevel_request};
pub use wm_base::{bind_wm_base, client_disconnected, wm_base_request};
