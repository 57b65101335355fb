//! The `xdg_wm_base` global, entry point of the shell protocol.

use super::{PositionerId, SurfaceId, XdgSurfaceId};
use crate::utils::Serial;

/// Requests a client can issue on an `xdg_wm_base` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Create a new positioner object
    CreatePositioner {
        /// Id for the new `xdg_positioner` resource
        id: PositionerId,
    },
    /// Wrap a surface of the generic surface subsystem into an `xdg_surface`
    GetXdgSurface {
        /// Id for the new `xdg_surface` resource
        id: XdgSurfaceId,
        /// The surface to be wrapped
        surface: SurfaceId,
    },
    /// Answer a ping event
    Pong {
        /// Serial of the ping being answered
        serial: u32,
    },
    /// Destroy the binding
    Destroy,
}

/// Events the server sends on an `xdg_wm_base` binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Liveness probe; the client must answer with a pong carrying the same serial
    Ping {
        /// Serial identifying this probe
        serial: Serial,
    },
}

/// Protocol error codes defined by `xdg_wm_base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Error {
    /// Given surface has another role
    Role = 0,
    /// The binding was destroyed before its children
    DefunctSurfaces = 1,
    /// The client tried to map or destroy a non-topmost popup
    NotTheTopmostPopup = 2,
    /// The client specified an invalid popup parent surface
    InvalidPopupParent = 3,
    /// The client provided an invalid surface state
    InvalidSurfaceState = 4,
    /// The client provided an invalid positioner
    InvalidPositioner = 5,
}
