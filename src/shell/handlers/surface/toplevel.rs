use crate::protocol::xdg_toplevel::{resize_edges, Request};
use crate::protocol::{post_error, xdg_surface, ErrorCode, ShellTransport, ToplevelId};
use crate::utils::{Point, Serial, Size};

use super::super::super::{ToplevelSurface, XdgShellHandler};

/// Handle a request on an `xdg_toplevel` object.
pub fn toplevel_request<D>(state: &mut D, toplevel: ToplevelId, request: Request)
where
    D: XdgShellHandler + ShellTransport,
{
    let shell = state.xdg_shell_state();
    let Some(data) = shell.toplevels.get(&toplevel) else {
        // request on a role object whose xdg_surface is gone
        return;
    };
    let handle = ToplevelSurface {
        shell_surface: toplevel,
        xdg_surface: data.xdg_surface,
        wl_surface: data.wl_surface,
    };
    let configured = shell
        .surfaces
        .get(&handle.xdg_surface)
        .map(|surface| surface.configured)
        .unwrap_or(false);

    match request {
        Request::SetParent { parent } => {
            let shell = state.xdg_shell_state();
            // a dead or foreign id reads as "no parent"
            let parent = parent.filter(|id| shell.toplevels.contains_key(id));
            let Some(data) = shell.toplevels.get_mut(&toplevel) else {
                return;
            };
            if data.parent == parent {
                return;
            }
            data.parent = parent;
            state.parent_changed(handle);
        }
        Request::SetTitle { title } => {
            let Some(data) = state.xdg_shell_state().toplevels.get_mut(&toplevel) else {
                return;
            };
            if data.title == title {
                return;
            }
            data.title = title.clone();
            state.title_changed(handle, title);
        }
        Request::SetAppId { app_id } => {
            let Some(data) = state.xdg_shell_state().toplevels.get_mut(&toplevel) else {
                return;
            };
            if data.app_id == app_id {
                return;
            }
            data.app_id = app_id.clone();
            state.app_id_changed(handle, app_id);
        }
        Request::ShowWindowMenu { seat, serial, x, y } => {
            if !configured {
                post_error(
                    state,
                    toplevel,
                    ErrorCode::Surface(xdg_surface::Error::NotConstructed),
                    "surface has not been configured yet",
                );
                return;
            }
            state.show_window_menu(handle, seat, Serial::from(serial), Point::new(x, y));
        }
        Request::Move { seat, serial } => {
            if !configured {
                post_error(
                    state,
                    toplevel,
                    ErrorCode::Surface(xdg_surface::Error::NotConstructed),
                    "surface has not been configured yet",
                );
                return;
            }
            state.move_request(handle, seat, Serial::from(serial));
        }
        Request::Resize {
            seat,
            serial,
            edges,
        } => {
            if !configured {
                post_error(
                    state,
                    toplevel,
                    ErrorCode::Surface(xdg_surface::Error::NotConstructed),
                    "surface has not been configured yet",
                );
                return;
            }
            state.resize_request(handle, seat, Serial::from(serial), resize_edges(edges));
        }
        Request::SetMaxSize { width, height } => {
            if width < 0 || height < 0 {
                post_error(
                    state,
                    toplevel,
                    ErrorCode::Implementation,
                    "width and height must be positive or zero",
                );
                return;
            }
            if let Some(data) = state.xdg_shell_state().toplevels.get_mut(&toplevel) {
                data.pending_max_size = Size::new(width, height);
            }
        }
        Request::SetMinSize { width, height } => {
            if width < 0 || height < 0 {
                post_error(
                    state,
                    toplevel,
                    ErrorCode::Implementation,
                    "width and height must be positive or zero",
                );
                return;
            }
            if let Some(data) = state.xdg_shell_state().toplevels.get_mut(&toplevel) {
                data.pending_min_size = Size::new(width, height);
            }
        }
        Request::SetMaximized => {
            state.maximize_request(handle);
        }
        Request::UnsetMaximized => {
            state.unmaximize_request(handle);
        }
        Request::SetFullscreen { output } => {
            state.fullscreen_request(handle, output);
        }
        Request::UnsetFullscreen => {
            state.unfullscreen_request(handle);
        }
        Request::SetMinimized => {
            state.minimize_request(handle);
        }
        Request::Destroy => {
            let shell = state.xdg_shell_state();
            shell.toplevels.remove(&toplevel);
            if let Some(data) = shell.surfaces.get_mut(&handle.xdg_surface) {
                data.role = None;
            }
            state.toplevel_destroyed(handle);
        }
    }
}
