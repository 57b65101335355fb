use crate::protocol::{
    post_error, xdg_surface, xdg_wm_base, ClientId, ErrorCode, ShellTransport, WmBaseId,
};
use crate::utils::Serial;

use super::super::{
    ping, PositionerData, PositionerState, ShellClient, ShellSurface, SurfaceAccess,
    XdgShellHandler, XdgSurfaceData,
};

/// Record a client binding the `xdg_wm_base` global.
pub fn bind_wm_base<D>(state: &mut D, client: ClientId, id: WmBaseId)
where
    D: XdgShellHandler,
{
    state.xdg_shell_state().wm_bases.insert(id, client);
    state.new_client(ShellClient {
        wm_base: id,
        client,
    });
}

/// Handle a request on an `xdg_wm_base` binding.
pub fn wm_base_request<D>(state: &mut D, wm_base: WmBaseId, request: xdg_wm_base::Request)
where
    D: XdgShellHandler + ShellTransport + SurfaceAccess,
{
    match request {
        xdg_wm_base::Request::CreatePositioner { id } => {
            let shell = state.xdg_shell_state();
            let Some(&client) = shell.wm_bases.get(&wm_base) else {
                return;
            };
            shell.positioners.insert(
                id,
                PositionerData {
                    client,
                    state: PositionerState::default(),
                },
            );
        }
        xdg_wm_base::Request::GetXdgSurface { id, surface } => {
            if state.surface_has_buffer(surface) {
                post_error(
                    state,
                    wm_base,
                    ErrorCode::Surface(xdg_surface::Error::UnconfiguredBuffer),
                    "xdg_surface must not have a buffer at creation",
                );
                return;
            }
            if state.xdg_shell_state().surface_index.contains_key(&surface) {
                post_error(
                    state,
                    wm_base,
                    ErrorCode::WmBase(xdg_wm_base::Error::Role),
                    "surface already has an xdg_surface",
                );
                return;
            }
            let shell = state.xdg_shell_state();
            let Some(&client) = shell.wm_bases.get(&wm_base) else {
                return;
            };
            shell.surfaces.insert(
                id,
                XdgSurfaceData {
                    wl_surface: surface,
                    wm_base,
                    client,
                    role: None,
                    configured: false,
                    pending_geometry: None,
                    current_geometry: None,
                },
            );
            shell.surface_index.insert(surface, id);
            shell.client_surfaces.entry(client).or_default().insert(id);
        }
        xdg_wm_base::Request::Pong { serial } => {
            ping::handle_pong(state, Serial::from(serial));
        }
        xdg_wm_base::Request::Destroy => {
            let shell = state.xdg_shell_state();
            let Some(&client) = shell.wm_bases.get(&wm_base) else {
                return;
            };
            let defunct = shell
                .client_surfaces
                .get(&client)
                .is_some_and(|surfaces| !surfaces.is_empty());
            if defunct {
                post_error(
                    state,
                    wm_base,
                    ErrorCode::WmBase(xdg_wm_base::Error::DefunctSurfaces),
                    "xdg_wm_base was destroyed before children",
                );
                return;
            }
            state.xdg_shell_state().wm_bases.remove(&wm_base);
            state.client_destroyed(ShellClient { wm_base, client });
        }
    }
}

/// Clean up every object of a connection that went away.
///
/// Outstanding pings of the client are dropped without further signals;
/// role and client destruction is reported the same way an orderly
/// teardown would.
pub fn client_disconnected<D>(state: &mut D, client: ClientId)
where
    D: XdgShellHandler,
{
    ping::cancel_client_pings(state, client);

    let shell = state.xdg_shell_state();
    let surfaces = shell.client_surfaces.remove(&client).unwrap_or_default();
    let mut dead_toplevels = Vec::new();
    let mut dead_popups = Vec::new();
    for id in &surfaces {
        if let Some(data) = shell.surfaces.remove(id) {
            shell.surface_index.remove(&data.wl_surface);
            match data.role {
                Some(ShellSurface::Toplevel(toplevel)) => {
                    shell.toplevels.remove(&toplevel.shell_surface);
                    dead_toplevels.push(toplevel);
                }
                Some(ShellSurface::Popup(popup)) => {
                    shell.popups.remove(&popup.shell_surface);
                    dead_popups.push(popup);
                }
                None => {}
            }
        }
    }
    shell.grab_stacks.remove(&client);
    shell.positioners.retain(|_, data| data.client != client);
    let dead_bases: Vec<WmBaseId> = shell
        .wm_bases
        .iter()
        .filter(|(_, owner)| **owner == client)
        .map(|(id, _)| *id)
        .collect();
    for id in &dead_bases {
        shell.wm_bases.remove(id);
    }

    tracing::debug!(
        surfaces = surfaces.len(),
        "cleaned up after disconnected client"
    );

    for toplevel in dead_toplevels {
        state.toplevel_destroyed(toplevel);
    }
    for popup in dead_popups {
        state.popup_destroyed(popup);
    }
    for wm_base in dead_bases {
        state.client_destroyed(ShellClient { wm_base, client });
    }
}
