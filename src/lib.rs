#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! **Server-side state machines for the `xdg_shell` protocol**
//!
//! This crate implements the compositor-facing half of the stable
//! `xdg_shell` protocol: shell surfaces and their one-shot roles, the
//! serial-numbered configure/acknowledge handshake, double-buffered window
//! geometry and size bounds, popup positioners with constraint-adjusted
//! placement, and the ping liveness machinery.
//!
//! The wire transport is not part of this crate. Requests arrive as the
//! typed enums of [`protocol`], bound to opaque client and resource ids;
//! events leave through the [`protocol::ShellTransport`] sink the
//! transport implements. Compositor policy, like sizing windows, placing
//! popups or reacting to move and maximize requests, stays with the
//! compositor, which receives it as calls on
//! [`shell::XdgShellHandler`].
//!
//! Three pieces fit together:
//!
//! - [`shell`] holds the protocol state machines and their dispatch
//!   functions; see its module documentation for the setup walkthrough.
//! - [`window`] is the compositor-side bookkeeping of mapped shell
//!   surfaces: the queue of in-flight configures, coalesced geometry
//!   requests, and the attachment points for decoration-style side
//!   protocols.
//! - [`utils`] carries the shared [`Serial`](utils::Serial) and geometry
//!   types.
//!
//! Everything runs on one [`calloop`] event loop; the shell's timers are
//! sources on the loop the compositor already dispatches.

pub mod protocol;
pub mod shell;
pub mod utils;
pub mod window;
