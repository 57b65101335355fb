use std::ops::{Add, AddAssign, Sub};

/// A point in surface-local logical coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Point {
    /// Create a point from its coordinates.
    pub const fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Point {
        Point { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, other: Point) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// A two-dimensional extent in surface-local logical coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Size {
    /// Create a size from its extents.
    pub const fn new(w: i32, h: i32) -> Size {
        Size { w, h }
    }

    /// Whether either axis is missing a meaningful extent.
    ///
    /// Matches the convention of the wire protocol, where a dimension of
    /// zero stands for "unconstrained" or "unset".
    pub const fn is_empty(self) -> bool {
        self.w < 1 || self.h < 1
    }
}

impl From<(i32, i32)> for Size {
    fn from((w, h): (i32, i32)) -> Size {
        Size { w, h }
    }
}

/// An axis-aligned rectangle in surface-local logical coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rectangle {
    /// Location of the top-left corner
    pub loc: Point,
    /// Extent of the rectangle
    pub size: Size,
}

impl Rectangle {
    /// Create a rectangle from the location of its top-left corner and its size.
    pub fn from_loc_and_size(loc: impl Into<Point>, size: impl Into<Size>) -> Rectangle {
        Rectangle {
            loc: loc.into(),
            size: size.into(),
        }
    }

    /// Whether this rectangle contains the given point.
    pub fn contains(self, point: impl Into<Point>) -> bool {
        let point = point.into();
        point.x >= self.loc.x
            && point.y >= self.loc.y
            && point.x < self.loc.x + self.size.w
            && point.y < self.loc.y + self.size.h
    }
}

bitflags::bitflags! {
    /// A set of cardinal edges of a rectangle.
    ///
    /// Used for anchor and gravity edge sets of popup positioners as well as
    /// for the borders grabbed by an interactive resize.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Edges: u32 {
        /// The top edge
        const TOP = 0x01;
        /// The bottom edge
        const BOTTOM = 0x02;
        /// The left edge
        const LEFT = 0x04;
        /// The right edge
        const RIGHT = 0x08;
    }
}

bitflags::bitflags! {
    /// A set of axes.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Orientations: u32 {
        /// The horizontal axis
        const HORIZONTAL = 0x01;
        /// The vertical axis
        const VERTICAL = 0x02;
    }
}
