//! Ping liveness tracking.
//!
//! Every ping is keyed by a display serial and owns a periodic timer on the
//! compositor's event loop. The first tick without a pong reports the
//! client as delayed, the second gives up and destroys the record. A pong
//! cancels the timer at any point. A single client may have any number of
//! concurrent pings.

use calloop::timer::{TimeoutAction, Timer};
use calloop::RegistrationToken;

use super::{ShellClient, XdgShellHandler};
use crate::protocol::{xdg_wm_base, ShellTransport, XdgSurfaceId};
use crate::utils::Serial;

#[derive(Debug)]
pub(crate) struct PingData {
    pub(crate) token: RegistrationToken,
    pub(crate) client: ShellClient,
}

/// Send a liveness probe to the client owning `surface`.
///
/// Resolves the client's `xdg_wm_base` binding, allocates the next display
/// serial, sends the ping event and registers its timer. Returns `None`
/// when the surface is unknown or its client no longer has a shell binding,
/// in which case nothing is sent.
pub fn ping<D>(state: &mut D, surface: XdgSurfaceId) -> Option<Serial>
where
    D: XdgShellHandler + ShellTransport + 'static,
{
    let shell = state.xdg_shell_state();
    let data = shell.surfaces.get(&surface)?;
    let client = data.client;

    // the binding the surface was created from may already be gone; any
    // other binding of the same client can carry the ping
    let wm_base = if shell.wm_bases.contains_key(&data.wm_base) {
        data.wm_base
    } else {
        shell
            .wm_bases
            .iter()
            .find(|(_, owner)| **owner == client)
            .map(|(id, _)| *id)?
    };

    let serial = shell.serials.next_serial();
    let interval = shell.ping_interval;
    let loop_handle = shell.loop_handle.clone();

    state.wm_base_event(wm_base, xdg_wm_base::Event::Ping { serial });

    let timer = Timer::from_duration(interval);
    let token = loop_handle.insert_source(timer, {
        let mut attempt = 0u32;
        move |_, _, data: &mut D| {
            attempt += 1;
            if attempt == 1 {
                data.ping_delayed(serial);
                return TimeoutAction::ToDuration(interval);
            }
            data.xdg_shell_state().pings.remove(&serial);
            tracing::debug!(serial = u32::from(serial), "ping timed out");
            data.ping_timeout(serial);
            TimeoutAction::Drop
        }
    });
    let token = match token {
        Ok(token) => token,
        Err(_) => {
            tracing::error!(serial = u32::from(serial), "failed to register ping timer");
            return None;
        }
    };

    state.xdg_shell_state().pings.insert(
        serial,
        PingData {
            token,
            client: ShellClient { wm_base, client },
        },
    );
    Some(serial)
}

/// Process a pong from the client: cancel the matching timer, if any.
pub(crate) fn handle_pong<D>(state: &mut D, serial: Serial)
where
    D: XdgShellHandler,
{
    let shell = state.xdg_shell_state();
    let Some(ping) = shell.pings.remove(&serial) else {
        return;
    };
    shell.loop_handle.remove(ping.token);
    state.client_pong(ping.client, serial);
}

/// Drop every outstanding ping of a disconnecting client.
pub(crate) fn cancel_client_pings<D>(state: &mut D, client: crate::protocol::ClientId)
where
    D: XdgShellHandler,
{
    let shell = state.xdg_shell_state();
    let stale: Vec<Serial> = shell
        .pings
        .iter()
        .filter(|(_, ping)| ping.client.client == client)
        .map(|(serial, _)| *serial)
        .collect();
    for serial in stale {
        if let Some(ping) = shell.pings.remove(&serial) {
            shell.loop_handle.remove(ping.token);
        }
    }
}
