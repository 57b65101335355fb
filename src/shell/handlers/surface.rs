use crate::protocol::xdg_surface::{Error, Request};
use crate::protocol::{post_error, xdg_wm_base, ErrorCode, ShellTransport, XdgSurfaceId};
use crate::utils::{Rectangle, Serial};

use super::super::{
    PopupData, PopupSurface, ShellSurface, SurfaceRole, ToplevelData, ToplevelSurface,
    XdgShellHandler,
};

mod popup;
mod toplevel;

pub use popup::popup_request;
pub use toplevel::toplevel_request;

/// Handle a request on an `xdg_surface` object.
pub fn surface_request<D>(state: &mut D, surface: XdgSurfaceId, request: Request)
where
    D: XdgShellHandler + ShellTransport,
{
    match request {
        Request::GetToplevel { id } => {
            let shell = state.xdg_shell_state();
            let Some(data) = shell.surfaces.get(&surface) else {
                return;
            };
            let wl_surface = data.wl_surface;
            if shell.give_role(wl_surface, SurfaceRole::Toplevel).is_err() {
                post_error(
                    state,
                    surface,
                    ErrorCode::Surface(Error::AlreadyConstructed),
                    "xdg_surface has already been constructed",
                );
                return;
            }
            let handle = ToplevelSurface {
                shell_surface: id,
                xdg_surface: surface,
                wl_surface,
            };
            let shell = state.xdg_shell_state();
            shell.toplevels.insert(id, ToplevelData::new(surface, wl_surface));
            if let Some(data) = shell.surfaces.get_mut(&surface) {
                data.role = Some(ShellSurface::Toplevel(handle));
            }
            state.new_toplevel(handle);
        }
        Request::GetPopup {
            id,
            parent,
            positioner,
        } => {
            let shell = state.xdg_shell_state();
            let Some(data) = shell.surfaces.get(&surface) else {
                return;
            };
            let wl_surface = data.wl_surface;
            let positioner_state = shell
                .positioners
                .get(&positioner)
                .map(|data| data.state)
                .unwrap_or_default();
            if !positioner_state.is_complete() {
                post_error(
                    state,
                    surface,
                    ErrorCode::WmBase(xdg_wm_base::Error::InvalidPositioner),
                    "xdg_positioner is incomplete",
                );
                return;
            }
            // A null parent must be specified through some other protocol
            // before the first commit; no such protocol is supported here.
            let parent = parent.filter(|id| state.xdg_shell_state().surfaces.contains_key(id));
            let Some(parent) = parent else {
                post_error(
                    state,
                    surface,
                    ErrorCode::Implementation,
                    "parent surface is not set",
                );
                return;
            };
            let handle = PopupSurface {
                shell_surface: id,
                xdg_surface: surface,
                wl_surface,
            };
            let shell = state.xdg_shell_state();
            if shell.give_role(wl_surface, SurfaceRole::Popup).is_err() {
                post_error(
                    state,
                    surface,
                    ErrorCode::Surface(Error::AlreadyConstructed),
                    "xdg_surface has already been constructed",
                );
                return;
            }
            shell.popups.insert(
                id,
                PopupData {
                    xdg_surface: surface,
                    wl_surface,
                    parent,
                    positioner: positioner_state,
                    has_explicit_grab: false,
                },
            );
            if let Some(data) = shell.surfaces.get_mut(&surface) {
                data.role = Some(ShellSurface::Popup(handle));
            }
            state.new_popup(handle, positioner_state);
        }
        Request::SetWindowGeometry {
            x,
            y,
            width,
            height,
        } => {
            let shell = state.xdg_shell_state();
            let Some(data) = shell.surfaces.get_mut(&surface) else {
                return;
            };
            if data.role.is_none() {
                post_error(
                    state,
                    surface,
                    ErrorCode::Surface(Error::NotConstructed),
                    "xdg_surface must have a role",
                );
                return;
            }
            if width < 1 || height < 1 {
                post_error(
                    state,
                    surface,
                    ErrorCode::Implementation,
                    "invalid window geometry size",
                );
                return;
            }
            data.pending_geometry = Some(Rectangle::from_loc_and_size((x, y), (width, height)));
        }
        Request::AckConfigure { serial } => {
            let serial = Serial::from(serial);
            let shell = state.xdg_shell_state();
            let Some(data) = shell.surfaces.get(&surface) else {
                return;
            };
            let Some(role) = data.role else {
                return;
            };
            state.configure_acknowledged(role, serial);
        }
        Request::Destroy => {
            let shell = state.xdg_shell_state();
            let Some(data) = shell.surfaces.remove(&surface) else {
                return;
            };
            shell.surface_index.remove(&data.wl_surface);
            if let Some(surfaces) = shell.client_surfaces.get_mut(&data.client) {
                surfaces.shift_remove(&surface);
            }
            match data.role {
                Some(ShellSurface::Toplevel(toplevel)) => {
                    tracing::warn!("xdg_surface destroyed before its role object");
                    shell.toplevels.remove(&toplevel.shell_surface);
                    state.toplevel_destroyed(toplevel);
                }
                Some(ShellSurface::Popup(popup)) => {
                    tracing::warn!("xdg_surface destroyed before its role object");
                    shell.popups.remove(&popup.shell_surface);
                    if let Some(stack) = shell.grab_stacks.get_mut(&data.client) {
                        stack.retain(|grabbed| *grabbed != popup.shell_surface);
                    }
                    state.popup_destroyed(popup);
                }
                None => {}
            }
        }
    }
}
