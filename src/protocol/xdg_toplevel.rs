//! The `xdg_toplevel` role, a regular desktop window.

use super::{OutputId, SeatId, ToplevelId};
use crate::utils::Edges;

/// Requests a client can issue on an `xdg_toplevel` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Set or unset the parent toplevel
    SetParent {
        /// The parent toplevel, `None` removes the relationship
        parent: Option<ToplevelId>,
    },
    /// Set a short title for the window
    SetTitle {
        /// UTF-8 window title
        title: String,
    },
    /// Set an identifier for the general class of the application
    SetAppId {
        /// Application id, e.g. the D-Bus service name
        app_id: String,
    },
    /// Ask the compositor to show its window menu
    ShowWindowMenu {
        /// Seat the triggering input event belongs to
        seat: SeatId,
        /// Serial of the triggering input event
        serial: u32,
        /// Horizontal position, surface-local
        x: i32,
        /// Vertical position, surface-local
        y: i32,
    },
    /// Start an interactive move
    Move {
        /// Seat the triggering input event belongs to
        seat: SeatId,
        /// Serial of the triggering input event
        serial: u32,
    },
    /// Start an interactive resize
    Resize {
        /// Seat the triggering input event belongs to
        seat: SeatId,
        /// Serial of the triggering input event
        serial: u32,
        /// Raw edge code of the border being dragged
        edges: u32,
    },
    /// Set the maximum size the client will accept
    SetMaxSize {
        /// Width, at least 0; 0 means unconstrained
        width: i32,
        /// Height, at least 0; 0 means unconstrained
        height: i32,
    },
    /// Set the minimum size the client will accept
    SetMinSize {
        /// Width, at least 0; 0 means unconstrained
        width: i32,
        /// Height, at least 0; 0 means unconstrained
        height: i32,
    },
    /// Ask to be maximized
    SetMaximized,
    /// Ask to stop being maximized
    UnsetMaximized,
    /// Ask to be made fullscreen
    SetFullscreen {
        /// Preferred output, compositor's choice when `None`
        output: Option<OutputId>,
    },
    /// Ask to stop being fullscreen
    UnsetFullscreen,
    /// Ask to be minimized
    SetMinimized,
    /// Destroy the role object, unmapping the surface
    Destroy,
}

/// Events the server sends on an `xdg_toplevel` object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Suggest a new configuration for the window
    Configure {
        /// Suggested width, 0 if the client should decide
        width: i32,
        /// Suggested height, 0 if the client should decide
        height: i32,
        /// States describing the suggested configuration, packed into a
        /// `u32` array on the wire
        states: Vec<State>,
    },
    /// Ask the client to close its window
    Close,
}

/// Toplevel states carried in configure events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum State {
    /// The surface is maximized
    Maximized = 1,
    /// The surface is fullscreen
    Fullscreen = 2,
    /// The surface is being resized
    Resizing = 3,
    /// The surface is now activated
    Activated = 4,
}

/// Decode the `resize` request's edge code into the set of dragged edges.
pub fn resize_edges(raw: u32) -> Edges {
    let mut edges = Edges::empty();
    if raw & 1 != 0 {
        edges |= Edges::TOP;
    }
    if raw & 2 != 0 {
        edges |= Edges::BOTTOM;
    }
    if raw & 4 != 0 {
        edges |= Edges::LEFT;
    }
    if raw & 8 != 0 {
        edges |= Edges::RIGHT;
    }
    edges
}
