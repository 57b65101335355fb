//! The `xdg_positioner` object, a value describing popup placement.

use crate::utils::Edges;

/// Requests a client can issue on an `xdg_positioner` object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Set the size of the surface to be positioned
    SetSize {
        /// Width, must be at least 1
        width: i32,
        /// Height, must be at least 1
        height: i32,
    },
    /// Set the anchor rectangle within the parent surface
    SetAnchorRect {
        /// Horizontal position relative to the parent window geometry
        x: i32,
        /// Vertical position relative to the parent window geometry
        y: i32,
        /// Width, must be at least 1
        width: i32,
        /// Height, must be at least 1
        height: i32,
    },
    /// Set the anchor of the anchor rectangle
    SetAnchor {
        /// Raw anchor code, one of [`Anchor`]
        anchor: u32,
    },
    /// Set the gravity of the surface relative to the anchor point
    SetGravity {
        /// Raw gravity code, one of [`Gravity`]
        gravity: u32,
    },
    /// Set how the surface may be adjusted when constrained
    SetConstraintAdjustment {
        /// Bit mask of [`ConstraintAdjustment`] values
        constraint_adjustment: u32,
    },
    /// Set the surface position offset relative to the anchor point
    SetOffset {
        /// Horizontal offset, any signed value
        x: i32,
        /// Vertical offset, any signed value
        y: i32,
    },
    /// Destroy the positioner object
    Destroy,
}

/// Protocol error codes defined by `xdg_positioner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Error {
    /// Invalid input provided
    InvalidInput = 0,
}

/// Anchor point codes of the anchor rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Anchor {
    /// The center of the anchor rectangle
    None = 0,
    /// The center of the top edge
    Top = 1,
    /// The center of the bottom edge
    Bottom = 2,
    /// The center of the left edge
    Left = 3,
    /// The center of the right edge
    Right = 4,
    /// The top left corner
    TopLeft = 5,
    /// The bottom left corner
    BottomLeft = 6,
    /// The top right corner
    TopRight = 7,
    /// The bottom right corner
    BottomRight = 8,
}

impl Anchor {
    /// Decode a raw wire value, `None` for codes past `bottom_right`.
    pub fn from_raw(raw: u32) -> Option<Anchor> {
        Some(match raw {
            0 => Anchor::None,
            1 => Anchor::Top,
            2 => Anchor::Bottom,
            3 => Anchor::Left,
            4 => Anchor::Right,
            5 => Anchor::TopLeft,
            6 => Anchor::BottomLeft,
            7 => Anchor::TopRight,
            8 => Anchor::BottomRight,
            _ => return None,
        })
    }

    /// The set of edges this anchor point touches.
    pub fn edges(self) -> Edges {
        match self {
            Anchor::None => Edges::empty(),
            Anchor::Top => Edges::TOP,
            Anchor::Bottom => Edges::BOTTOM,
            Anchor::Left => Edges::LEFT,
            Anchor::Right => Edges::RIGHT,
            Anchor::TopLeft => Edges::TOP | Edges::LEFT,
            Anchor::BottomLeft => Edges::BOTTOM | Edges::LEFT,
            Anchor::TopRight => Edges::TOP | Edges::RIGHT,
            Anchor::BottomRight => Edges::BOTTOM | Edges::RIGHT,
        }
    }
}

/// Gravity codes, defining in which direction the surface grows away from
/// its anchor point.
///
/// Gravity shares the numeric space of [`Anchor`] on the wire but is a
/// distinct enumeration; it is decoded from its own constants here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Gravity {
    /// Centered over the anchor point
    None = 0,
    /// Upwards
    Top = 1,
    /// Downwards
    Bottom = 2,
    /// Leftwards
    Left = 3,
    /// Rightwards
    Right = 4,
    /// Towards the top left corner
    TopLeft = 5,
    /// Towards the bottom left corner
    BottomLeft = 6,
    /// Towards the top right corner
    TopRight = 7,
    /// Towards the bottom right corner
    BottomRight = 8,
}

impl Gravity {
    /// Decode a raw wire value, `None` for codes past `bottom_right`.
    pub fn from_raw(raw: u32) -> Option<Gravity> {
        Some(match raw {
            0 => Gravity::None,
            1 => Gravity::Top,
            2 => Gravity::Bottom,
            3 => Gravity::Left,
            4 => Gravity::Right,
            5 => Gravity::TopLeft,
            6 => Gravity::BottomLeft,
            7 => Gravity::TopRight,
            8 => Gravity::BottomRight,
            _ => return None,
        })
    }

    /// The set of edges the surface is pulled towards.
    pub fn edges(self) -> Edges {
        match self {
            Gravity::None => Edges::empty(),
            Gravity::Top => Edges::TOP,
            Gravity::Bottom => Edges::BOTTOM,
            Gravity::Left => Edges::LEFT,
            Gravity::Right => Edges::RIGHT,
            Gravity::TopLeft => Edges::TOP | Edges::LEFT,
            Gravity::BottomLeft => Edges::BOTTOM | Edges::LEFT,
            Gravity::TopRight => Edges::TOP | Edges::RIGHT,
            Gravity::BottomRight => Edges::BOTTOM | Edges::RIGHT,
        }
    }
}

bitflags::bitflags! {
    /// Constraint adjustment bits of the `set_constraint_adjustment` request.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ConstraintAdjustment: u32 {
        /// Slide along the horizontal axis
        const SLIDE_X = 1;
        /// Slide along the vertical axis
        const SLIDE_Y = 2;
        /// Invert the horizontal anchor and gravity
        const FLIP_X = 4;
        /// Invert the vertical anchor and gravity
        const FLIP_Y = 8;
        /// Shrink horizontally
        const RESIZE_X = 16;
        /// Shrink vertically
        const RESIZE_Y = 32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_decode_table() {
        assert_eq!(Anchor::from_raw(0).unwrap().edges(), Edges::empty());
        assert_eq!(Anchor::from_raw(1).unwrap().edges(), Edges::TOP);
        assert_eq!(Anchor::from_raw(7).unwrap().edges(), Edges::TOP | Edges::RIGHT);
        assert_eq!(
            Anchor::from_raw(8).unwrap().edges(),
            Edges::BOTTOM | Edges::RIGHT
        );
        assert_eq!(Anchor::from_raw(9), None);
    }

    #[test]
    fn gravity_decode_table() {
        assert_eq!(Gravity::from_raw(0).unwrap().edges(), Edges::empty());
        assert_eq!(
            Gravity::from_raw(6).unwrap().edges(),
            Edges::BOTTOM | Edges::LEFT
        );
        assert_eq!(Gravity::from_raw(42), None);
    }
}
