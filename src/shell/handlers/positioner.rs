use crate::protocol::xdg_positioner::{Anchor, ConstraintAdjustment, Error, Gravity, Request};
use crate::protocol::{post_error, ErrorCode, PositionerId, ShellTransport};
use crate::utils::{Orientations, Point, Rectangle, Size};

use super::super::XdgShellHandler;

/// Handle a request on an `xdg_positioner` object.
///
/// Every request mutates the pending value state; invalid input is
/// rejected with `invalid_input` before anything is stored.
pub fn positioner_request<D>(state: &mut D, positioner: PositionerId, request: Request)
where
    D: XdgShellHandler + ShellTransport,
{
    match request {
        Request::SetSize { width, height } => {
            if width < 1 || height < 1 {
                post_error(
                    state,
                    positioner,
                    ErrorCode::Positioner(Error::InvalidInput),
                    "width and height must be positive and non-zero",
                );
                return;
            }
            if let Some(data) = state.xdg_shell_state().positioners.get_mut(&positioner) {
                data.state.size = Some(Size::new(width, height));
            }
        }
        Request::SetAnchorRect {
            x,
            y,
            width,
            height,
        } => {
            if width < 1 || height < 1 {
                post_error(
                    state,
                    positioner,
                    ErrorCode::Positioner(Error::InvalidInput),
                    "width and height must be positive and non-zero",
                );
                return;
            }
            if let Some(data) = state.xdg_shell_state().positioners.get_mut(&positioner) {
                data.state.anchor_rect =
                    Some(Rectangle::from_loc_and_size((x, y), (width, height)));
            }
        }
        Request::SetAnchor { anchor } => {
            let Some(anchor) = Anchor::from_raw(anchor) else {
                post_error(
                    state,
                    positioner,
                    ErrorCode::Positioner(Error::InvalidInput),
                    "unknown anchor point",
                );
                return;
            };
            if let Some(data) = state.xdg_shell_state().positioners.get_mut(&positioner) {
                data.state.anchor_edges = anchor.edges();
            }
        }
        Request::SetGravity { gravity } => {
            let Some(gravity) = Gravity::from_raw(gravity) else {
                post_error(
                    state,
                    positioner,
                    ErrorCode::Positioner(Error::InvalidInput),
                    "unknown gravity direction",
                );
                return;
            };
            if let Some(data) = state.xdg_shell_state().positioners.get_mut(&positioner) {
                data.state.gravity_edges = gravity.edges();
            }
        }
        Request::SetConstraintAdjustment {
            constraint_adjustment,
        } => {
            let mask = ConstraintAdjustment::from_bits_truncate(constraint_adjustment);
            if let Some(data) = state.xdg_shell_state().positioners.get_mut(&positioner) {
                data.state.flip_adjustments = orientations(
                    mask,
                    ConstraintAdjustment::FLIP_X,
                    ConstraintAdjustment::FLIP_Y,
                );
                data.state.slide_adjustments = orientations(
                    mask,
                    ConstraintAdjustment::SLIDE_X,
                    ConstraintAdjustment::SLIDE_Y,
                );
                data.state.resize_adjustments = orientations(
                    mask,
                    ConstraintAdjustment::RESIZE_X,
                    ConstraintAdjustment::RESIZE_Y,
                );
            }
        }
        Request::SetOffset { x, y } => {
            if let Some(data) = state.xdg_shell_state().positioners.get_mut(&positioner) {
                data.state.offset = Point::new(x, y);
            }
        }
        Request::Destroy => {
            state.xdg_shell_state().positioners.remove(&positioner);
        }
    }
}

fn orientations(
    mask: ConstraintAdjustment,
    x: ConstraintAdjustment,
    y: ConstraintAdjustment,
) -> Orientations {
    let mut orientations = Orientations::empty();
    if mask.contains(x) {
        orientations |= Orientations::HORIZONTAL;
    }
    if mask.contains(y) {
        orientations |= Orientations::VERTICAL;
    }
    orientations
}
