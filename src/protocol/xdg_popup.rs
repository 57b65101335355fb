//! The `xdg_popup` role, a short-lived transient surface.

use super::SeatId;

/// Requests a client can issue on an `xdg_popup` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Request an explicit grab for this popup
    Grab {
        /// Seat the triggering input event belongs to
        seat: SeatId,
        /// Serial of the triggering input event
        serial: u32,
    },
    /// Destroy the role object, dismissing the popup
    Destroy,
}

/// Events the server sends on an `xdg_popup` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Suggest position and size relative to the parent window geometry
    Configure {
        /// Horizontal position relative to the parent window geometry
        x: i32,
        /// Vertical position relative to the parent window geometry
        y: i32,
        /// Suggested width
        width: i32,
        /// Suggested height
        height: i32,
    },
    /// The popup was dismissed by the compositor
    PopupDone,
}
