//! Compositor-side shell windows and their configure queue.
//!
//! The shell core sends a configure whenever the compositor asks it to; the
//! types here decide *when* to ask and remember what was proposed. One
//! [`XdgWindow`] per mapped shell surface tracks:
//!
//! - the FIFO of configures that were sent but not yet acknowledged,
//! - the last acknowledged configure, used to settle geometry on commit,
//! - the requested and applied frame/buffer geometry of the window,
//! - for toplevels, the intended state set and the attachment points of
//!   the side protocols (decoration, palette, application menu,
//!   plasma-shell surface).
//!
//! Geometry requests coalesce: [`request_geometry`] arms a zero-delay
//! timer, so every mutation made during one event-loop turn folds into a
//! single configure carrying the final rectangle.
//!
//! The compositor wires three of its [`XdgShellHandler`] callbacks into
//! this module: `configure_acknowledged` into [`ack_configure`],
//! `committed` into [`handle_commit`], and creation callbacks into
//! [`WindowState::add_window`].

use std::collections::VecDeque;

use calloop::timer::{TimeoutAction, Timer};
use calloop::LoopHandle;
use indexmap::IndexMap;

use crate::protocol::{ObjectId, ShellTransport, XdgSurfaceId};
use crate::shell::{ShellSurface, ToplevelStates, ToplevelSurface, XdgShellHandler};
use crate::utils::{Rectangle, Serial};

/// Handler trait for compositor states that manage shell windows.
#[allow(unused_variables)]
pub trait WindowHandler: XdgShellHandler + ShellTransport + Sized {
    /// [`WindowState`] getter.
    fn window_state(&mut self) -> &mut WindowState<Self>;

    /// The applied frame geometry of a window changed.
    fn frame_geometry_changed(&mut self, surface: ShellSurface, old: Rectangle) {}

    /// The applied buffer geometry of a window changed.
    fn buffer_geometry_changed(&mut self, surface: ShellSurface, old: Rectangle) {}

    /// The client acknowledged a configure with a different state set.
    fn states_acknowledged(&mut self, surface: ToplevelSurface, states: ToplevelStates) {}
}

/// One sent configure waiting to be acknowledged by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceConfigure {
    /// The serial the configure was sent with
    pub serial: Serial,
    /// The proposed frame geometry
    pub geometry: Rectangle,
    /// The proposed state set; empty for popups
    pub states: ToplevelStates,
}

/// Side-protocol objects attached to a toplevel window.
///
/// At most one of each kind; their lifetime is independent of the window,
/// so they are tracked by opaque id only and cleared when the side
/// protocol destroys them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Attachments {
    decoration: Option<ObjectId>,
    palette: Option<ObjectId>,
    app_menu: Option<ObjectId>,
    plasma_shell: Option<ObjectId>,
}

macro_rules! attachment {
    ($(#[$meta:meta])* $field:ident, $install:ident, $clear:ident) => {
        $(#[$meta])*
        pub fn $field(&self) -> Option<ObjectId> {
            self.attachments.$field
        }

        /// Attach the side-protocol object, replacing a previous one.
        pub fn $install(&mut self, id: ObjectId) {
            if self.attachments.$field.replace(id).is_some() {
                tracing::warn!("replacing an already attached side-protocol object");
            }
        }

        /// Forget the side-protocol object after its destruction.
        pub fn $clear(&mut self) {
            self.attachments.$field = None;
        }
    };
}

/// Compositor-side bookkeeping for one mapped shell surface.
#[derive(Debug)]
pub struct XdgWindow {
    surface: ShellSurface,
    configure_events: VecDeque<SurfaceConfigure>,
    last_acknowledged: Option<SurfaceConfigure>,
    last_acked_states: ToplevelStates,
    requested_frame_geometry: Rectangle,
    frame_geometry: Rectangle,
    buffer_geometry: Rectangle,
    pending_states: ToplevelStates,
    configure_scheduled: bool,
    attachments: Attachments,
}

impl XdgWindow {
    fn new(surface: ShellSurface) -> XdgWindow {
        XdgWindow {
            surface,
            configure_events: VecDeque::new(),
            last_acknowledged: None,
            last_acked_states: ToplevelStates::empty(),
            requested_frame_geometry: Rectangle::default(),
            frame_geometry: Rectangle::default(),
            buffer_geometry: Rectangle::default(),
            pending_states: ToplevelStates::empty(),
            configure_scheduled: false,
            attachments: Attachments::default(),
        }
    }

    /// The shell surface this window wraps.
    pub fn surface(&self) -> ShellSurface {
        self.surface
    }

    /// The geometry most recently asked of the client.
    pub fn requested_frame_geometry(&self) -> Rectangle {
        self.requested_frame_geometry
    }

    /// The applied frame geometry.
    pub fn frame_geometry(&self) -> Rectangle {
        self.frame_geometry
    }

    /// The applied buffer geometry.
    pub fn buffer_geometry(&self) -> Rectangle {
        self.buffer_geometry
    }

    /// The configure the client acknowledged last.
    pub fn last_acknowledged_configure(&self) -> Option<SurfaceConfigure> {
        self.last_acknowledged
    }

    /// The state set of the last acknowledged configure.
    pub fn last_acknowledged_states(&self) -> ToplevelStates {
        self.last_acked_states
    }

    /// Configures sent to, but not yet acknowledged by the client, oldest
    /// first.
    pub fn pending_configures(&self) -> impl Iterator<Item = &SurfaceConfigure> {
        self.configure_events.iter()
    }

    /// The state set the next configure will carry.
    pub fn states(&self) -> ToplevelStates {
        self.pending_states
    }

    /// Replace the state set for upcoming configures.
    ///
    /// Does not schedule anything by itself; combine with
    /// [`request_geometry`] or [`schedule_configure`].
    pub fn set_states(&mut self, states: ToplevelStates) {
        self.pending_states = states;
    }

    attachment!(
        /// The attached server-side decoration, if any.
        decoration,
        install_decoration,
        decoration_destroyed
    );
    attachment!(
        /// The attached decoration palette, if any.
        palette,
        install_palette,
        palette_destroyed
    );
    attachment!(
        /// The attached application menu, if any.
        app_menu,
        install_app_menu,
        app_menu_destroyed
    );
    attachment!(
        /// The attached plasma-shell surface, if any.
        plasma_shell,
        install_plasma_shell,
        plasma_shell_destroyed
    );
}

/// Registry of the compositor's shell windows, keyed by `xdg_surface`.
#[derive(Debug)]
pub struct WindowState<D> {
    windows: IndexMap<XdgSurfaceId, XdgWindow>,
    loop_handle: LoopHandle<'static, D>,
}

impl<D> WindowState<D> {
    /// Create the window registry on the compositor's event loop.
    pub fn new(loop_handle: LoopHandle<'static, D>) -> WindowState<D> {
        WindowState {
            windows: IndexMap::new(),
            loop_handle,
        }
    }

    /// Start tracking a freshly created shell surface.
    pub fn add_window(&mut self, surface: ShellSurface) {
        self.windows
            .insert(surface.xdg_surface(), XdgWindow::new(surface));
    }

    /// Stop tracking a window, returning its final bookkeeping.
    pub fn remove_window(&mut self, surface: XdgSurfaceId) -> Option<XdgWindow> {
        self.windows.shift_remove(&surface)
    }

    /// Access a window.
    pub fn window(&self, surface: XdgSurfaceId) -> Option<&XdgWindow> {
        self.windows.get(&surface)
    }

    /// Mutable access to a window.
    pub fn window_mut(&mut self, surface: XdgSurfaceId) -> Option<&mut XdgWindow> {
        self.windows.get_mut(&surface)
    }

    /// All tracked windows, in creation order.
    pub fn windows(&self) -> impl Iterator<Item = &XdgWindow> {
        self.windows.values()
    }
}

/// Ask the client to take on a new frame geometry.
///
/// Only records the wish and schedules a configure; the geometry is applied
/// once the client acknowledges and commits. Repeated calls within one
/// event-loop turn collapse into a single configure carrying the rectangle
/// of the last call.
pub fn request_geometry<D>(state: &mut D, surface: XdgSurfaceId, rect: Rectangle)
where
    D: WindowHandler + 'static,
{
    let Some(window) = state.window_state().windows.get_mut(&surface) else {
        return;
    };
    window.requested_frame_geometry = rect;
    schedule_configure(state, surface);
}

/// Arm the zero-delay configure timer for a window.
///
/// At most one configure is in flight per event-loop turn; a timer that is
/// already armed is left alone.
pub fn schedule_configure<D>(state: &mut D, surface: XdgSurfaceId)
where
    D: WindowHandler + 'static,
{
    let window_state = state.window_state();
    let Some(window) = window_state.windows.get_mut(&surface) else {
        return;
    };
    if window.configure_scheduled {
        return;
    }
    window.configure_scheduled = true;
    let loop_handle = window_state.loop_handle.clone();
    let inserted = loop_handle.insert_source(Timer::immediate(), move |_, _, state: &mut D| {
        send_configure(state, surface);
        TimeoutAction::Drop
    });
    if inserted.is_err() {
        tracing::error!("failed to arm configure timer");
        if let Some(window) = state.window_state().windows.get_mut(&surface) {
            window.configure_scheduled = false;
        }
    }
}

/// Send the pending configure of a window right away.
///
/// Normally runs from the timer armed by [`schedule_configure`]; calling it
/// directly flushes the batch early.
pub fn send_configure<D>(state: &mut D, surface: XdgSurfaceId)
where
    D: WindowHandler,
{
    let Some(window) = state.window_state().windows.get_mut(&surface) else {
        return;
    };
    window.configure_scheduled = false;
    let geometry = window.requested_frame_geometry;
    let states = window.pending_states;
    let shell_surface = window.surface;

    let serial = match shell_surface {
        ShellSurface::Toplevel(toplevel) => {
            toplevel.send_configure(state, geometry.size, states)
        }
        ShellSurface::Popup(popup) => popup.send_configure(state, geometry),
    };

    if let Some(window) = state.window_state().windows.get_mut(&surface) {
        window.configure_events.push_back(SurfaceConfigure {
            serial,
            geometry,
            states,
        });
    }
}

/// Process an acknowledgement for a window.
///
/// Drops every queued configure up to and including `serial`; the newest
/// dropped one becomes the last acknowledged configure. An acknowledgement
/// that admits a different state set is reported through
/// [`WindowHandler::states_acknowledged`].
pub fn ack_configure<D>(state: &mut D, surface: XdgSurfaceId, serial: Serial)
where
    D: WindowHandler,
{
    let Some(window) = state.window_state().windows.get_mut(&surface) else {
        return;
    };
    let mut acknowledged = None;
    while let Some(front) = window.configure_events.front() {
        if front.serial > serial {
            break;
        }
        acknowledged = window.configure_events.pop_front();
    }
    let Some(configure) = acknowledged else {
        return;
    };
    window.last_acknowledged = Some(configure);

    let states_changed = configure.states != window.last_acked_states;
    window.last_acked_states = configure.states;
    let shell_surface = window.surface;

    if states_changed {
        if let ShellSurface::Toplevel(toplevel) = shell_surface {
            state.states_acknowledged(toplevel, configure.states);
        }
    }
}

/// Settle geometry for a window after a commit.
///
/// When the committed window geometry matches the size of the last
/// acknowledged configure the proposed rectangle is applied to the frame
/// geometry; a commit that has not caught up yet leaves the applied
/// geometry alone.
pub fn handle_commit<D>(state: &mut D, surface: XdgSurfaceId)
where
    D: WindowHandler,
{
    let committed = state.xdg_shell_state().window_geometry(surface);
    let Some(window) = state.window_state().windows.get_mut(&surface) else {
        return;
    };
    let Some(acknowledged) = window.last_acknowledged else {
        return;
    };
    // a client that never sets a window geometry is taken at its word
    let caught_up = committed
        .map(|geometry| geometry.size == acknowledged.geometry.size)
        .unwrap_or(true);
    if !caught_up {
        return;
    }
    update_geometry(state, surface, acknowledged.geometry);
}

/// Apply a rectangle to both the frame and the buffer geometry of a window
/// in one step, emitting change notifications for each one that differed.
pub fn update_geometry<D>(state: &mut D, surface: XdgSurfaceId, rect: Rectangle)
where
    D: WindowHandler,
{
    let Some(window) = state.window_state().windows.get_mut(&surface) else {
        return;
    };
    let old_frame = window.frame_geometry;
    let old_buffer = window.buffer_geometry;
    window.frame_geometry = rect;
    window.buffer_geometry = rect;
    let shell_surface = window.surface;

    if old_frame != rect {
        state.frame_geometry_changed(shell_surface, old_frame);
    }
    if old_buffer != rect {
        state.buffer_geometry_changed(shell_surface, old_buffer);
    }
}

#[cfg(test)]
mod tests;
