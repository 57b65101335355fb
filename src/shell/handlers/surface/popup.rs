use crate::protocol::xdg_popup::Request;
use crate::protocol::{post_error, xdg_wm_base, ErrorCode, PopupId, ShellTransport};
use crate::utils::Serial;

use super::super::super::{PopupSurface, XdgShellHandler};

/// Handle a request on an `xdg_popup` object.
pub fn popup_request<D>(state: &mut D, popup: PopupId, request: Request)
where
    D: XdgShellHandler + ShellTransport,
{
    let shell = state.xdg_shell_state();
    let Some(data) = shell.popups.get(&popup) else {
        // request on a role object whose xdg_surface is gone
        return;
    };
    let handle = PopupSurface {
        shell_surface: popup,
        xdg_surface: data.xdg_surface,
        wl_surface: data.wl_surface,
    };

    match request {
        Request::Grab { seat, serial } => {
            let shell = state.xdg_shell_state();
            let client = shell
                .surfaces
                .get(&handle.xdg_surface)
                .map(|surface| surface.client);
            if let Some(data) = shell.popups.get_mut(&popup) {
                data.has_explicit_grab = true;
            }
            if let Some(client) = client {
                let stack = shell.grab_stacks.entry(client).or_default();
                if !stack.contains(&popup) {
                    stack.push(popup);
                }
            }
            state.grab(handle, seat, Serial::from(serial));
        }
        Request::Destroy => {
            let shell = state.xdg_shell_state();
            let client = shell
                .surfaces
                .get(&handle.xdg_surface)
                .map(|surface| surface.client);
            let grabbed = shell
                .popups
                .get(&popup)
                .map(|data| data.has_explicit_grab)
                .unwrap_or(false);
            if grabbed {
                if let Some(stack) = client.and_then(|client| shell.grab_stacks.get_mut(&client)) {
                    if stack.last() == Some(&popup) {
                        stack.pop();
                    } else if stack.contains(&popup) {
                        // grabbing popups must be destroyed topmost first
                        post_error(
                            state,
                            popup,
                            ErrorCode::WmBase(xdg_wm_base::Error::NotTheTopmostPopup),
                            "popup was destroyed while it was not the topmost popup",
                        );
                        return;
                    }
                }
            }
            let shell = state.xdg_shell_state();
            shell.popups.remove(&popup);
            if let Some(data) = shell.surfaces.get_mut(&handle.xdg_surface) {
                data.role = None;
            }
            state.popup_destroyed(handle);
        }
    }
}
