//! The `xdg_surface` object, base interface of desktop-style surfaces.

use super::{PopupId, PositionerId, ToplevelId, XdgSurfaceId};
use crate::utils::Serial;

/// Requests a client can issue on an `xdg_surface` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Assign the toplevel role to the wrapped surface
    GetToplevel {
        /// Id for the new `xdg_toplevel` resource
        id: ToplevelId,
    },
    /// Assign the popup role to the wrapped surface
    GetPopup {
        /// Id for the new `xdg_popup` resource
        id: PopupId,
        /// Parent `xdg_surface`; a missing parent must be supplied through
        /// another protocol before the first commit, which is unsupported
        /// here
        parent: Option<XdgSurfaceId>,
        /// Positioner describing the placement of the popup
        positioner: PositionerId,
    },
    /// Set the region of the surface that is the actual window
    SetWindowGeometry {
        /// Horizontal position of the geometry rectangle
        x: i32,
        /// Vertical position of the geometry rectangle
        y: i32,
        /// Width, must be at least 1
        width: i32,
        /// Height, must be at least 1
        height: i32,
    },
    /// Acknowledge a configure event
    AckConfigure {
        /// Serial of the acknowledged configure; all earlier configures are
        /// admitted along with it
        serial: u32,
    },
    /// Destroy the `xdg_surface`
    Destroy,
}

/// Events the server sends on an `xdg_surface` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Marks the end of a configure sequence started by a role configure
    Configure {
        /// Serial the client should pass back in `ack_configure`
        serial: Serial,
    },
}

/// Protocol error codes defined by `xdg_surface`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Error {
    /// The surface was not fully constructed yet
    NotConstructed = 1,
    /// The surface already has a role object
    AlreadyConstructed = 2,
    /// The surface had a buffer attached before the first configure was
    /// acknowledged
    UnconfiguredBuffer = 3,
}
