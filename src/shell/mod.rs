//! Server-side handling of the `xdg_shell` protocol.
//!
//! This module tracks the shell objects defined by clients (surfaces,
//! toplevels, popups and positioners) and runs the configure/ack handshake
//! and the ping liveness machinery for them. All the actual drawing and
//! positioning logic of windows is out of its scope: client requests that
//! need a compositor decision surface as calls on the [`XdgShellHandler`]
//! trait, and everything destined for the client goes through the
//! [`ShellTransport`] sink the compositor's transport implements.
//!
//! ## How to use it
//!
//! Store an [`XdgShellState`] in your compositor state, implement
//! [`XdgShellHandler`] (plus [`SurfaceAccess`] and [`ShellTransport`]) and
//! feed decoded client requests into the dispatch functions of
//! [`handlers`]:
//!
//! ```no_run
//! use std::time::Duration;
//! use calloop::EventLoop;
//! use xdg_shell_core::protocol::{
//!     self, ClientId, ObjectId, PopupId, ProtocolError, SeatId, ShellTransport, SurfaceId,
//!     ToplevelId, WmBaseId, XdgSurfaceId,
//! };
//! use xdg_shell_core::shell::{
//!     handlers, PopupSurface, PositionerState, SurfaceAccess, ToplevelSurface, XdgShellHandler,
//!     XdgShellState,
//! };
//! use xdg_shell_core::utils::Serial;
//!
//! struct State {
//!     xdg_shell: XdgShellState<Self>,
//! }
//!
//! impl XdgShellHandler for State {
//!     fn xdg_shell_state(&mut self) -> &mut XdgShellState<Self> {
//!         &mut self.xdg_shell
//!     }
//!
//!     fn new_toplevel(&mut self, surface: ToplevelSurface) {
//!         // remember the surface; send a configure once it commits
//!     }
//!
//!     fn new_popup(&mut self, surface: PopupSurface, positioner: PositionerState) {}
//!
//!     fn grab(&mut self, surface: PopupSurface, seat: SeatId, serial: Serial) {}
//! }
//!
//! impl SurfaceAccess for State {
//!     fn surface_has_buffer(&self, surface: SurfaceId) -> bool {
//!         false
//!     }
//! }
//!
//! impl ShellTransport for State {
//!     fn wm_base_event(&mut self, wm_base: WmBaseId, event: protocol::xdg_wm_base::Event) {}
//!     fn surface_event(&mut self, surface: XdgSurfaceId, event: protocol::xdg_surface::Event) {}
//!     fn toplevel_event(&mut self, toplevel: ToplevelId, event: protocol::xdg_toplevel::Event) {}
//!     fn popup_event(&mut self, popup: PopupId, event: protocol::xdg_popup::Event) {}
//!     fn post_error(&mut self, error: ProtocolError) {}
//! }
//!
//! let mut event_loop = EventLoop::<State>::try_new().unwrap();
//! let mut state = State {
//!     xdg_shell: XdgShellState::new(event_loop.handle()),
//! };
//!
//! // the transport feeds decoded requests in:
//! handlers::bind_wm_base(&mut state, ClientId::new(1), WmBaseId::new(ObjectId::new(1)));
//! loop {
//!     event_loop
//!         .dispatch(Some(Duration::from_millis(16)), &mut state)
//!         .unwrap();
//! }
//! ```
//!
//! The surface subsystem must call [`commit`] whenever a wrapped surface
//! commits, so pending state can be promoted and roles can ask for their
//! initial configure.

use std::cmp::min;
use std::collections::HashMap;
use std::time::Duration;

use calloop::LoopHandle;
use indexmap::IndexSet;

use crate::protocol::{
    xdg_popup, xdg_surface, xdg_toplevel, ClientId, OutputId, PopupId, PositionerId, SeatId,
    ShellTransport, SurfaceId, ToplevelId, WmBaseId, XdgSurfaceId,
};
use crate::utils::{Edges, Orientations, Point, Rectangle, Serial, SerialCounter, Size};

pub mod handlers;
mod ping;

pub use ping::ping;


/// Default interval of the ping liveness timer.
pub const PING_INTERVAL: Duration = Duration::from_millis(1000);

/// Narrow view of the generic surface subsystem.
///
/// The shell only ever needs to know whether a surface already carries a
/// committed buffer; everything else about buffers, damage and input
/// regions stays with the surface subsystem.
pub trait SurfaceAccess {
    /// Whether the surface currently has a committed buffer.
    fn surface_has_buffer(&self, surface: SurfaceId) -> bool;
}

/// Handler trait for compositor-side decisions of the shell.
///
/// Emissions are synchronous; implementations are free to create or destroy
/// sibling resources from inside a callback.
#[allow(unused_variables)]
pub trait XdgShellHandler: Sized {
    /// [`XdgShellState`] getter.
    fn xdg_shell_state(&mut self) -> &mut XdgShellState<Self>;

    /// A new shell client was instantiated.
    fn new_client(&mut self, client: ShellClient) {}

    /// A shell client went away after destroying all of its surfaces.
    fn client_destroyed(&mut self, client: ShellClient) {}

    /// The pong for a pending ping of this shell client was received.
    fn client_pong(&mut self, client: ShellClient, serial: Serial) {}

    /// A ping went unanswered for one interval; the client may be stalled.
    fn ping_delayed(&mut self, serial: Serial) {}

    /// A ping went unanswered for two intervals and was given up on.
    fn ping_timeout(&mut self, serial: Serial) {}

    /// A new toplevel surface was created.
    fn new_toplevel(&mut self, surface: ToplevelSurface);

    /// A new popup surface was created.
    ///
    /// `positioner` is the snapshot taken when the popup was requested; the
    /// client mutating the positioner object afterwards has no effect on it.
    fn new_popup(&mut self, surface: PopupSurface, positioner: PositionerState);

    /// A toplevel surface was destroyed.
    fn toplevel_destroyed(&mut self, surface: ToplevelSurface) {}

    /// A popup surface was destroyed.
    fn popup_destroyed(&mut self, surface: PopupSurface) {}

    /// A role surface committed before receiving its first configure.
    ///
    /// The compositor should answer by sending the initial configure event
    /// once it has decided on a configuration.
    fn initialize_requested(&mut self, surface: ShellSurface) {}

    /// A commit promoted a new window geometry into the current state.
    fn window_geometry_changed(&mut self, surface: ShellSurface, geometry: Rectangle) {}

    /// The client acknowledged the configure with the given serial,
    /// admitting all earlier ones along with it.
    fn configure_acknowledged(&mut self, surface: ShellSurface, serial: Serial) {}

    /// A configured role surface finished a commit.
    ///
    /// Runs after pending state has been promoted, on every commit that was
    /// not an initialization request.
    fn committed(&mut self, surface: ShellSurface) {}

    /// The toplevel surface set a different title.
    fn title_changed(&mut self, surface: ToplevelSurface, title: String) {}

    /// The toplevel surface set a different application id.
    fn app_id_changed(&mut self, surface: ToplevelSurface, app_id: String) {}

    /// The parent of a toplevel surface changed.
    fn parent_changed(&mut self, surface: ToplevelSurface) {}

    /// A commit promoted a new minimum size into the current state.
    fn min_size_changed(&mut self, surface: ToplevelSurface, size: Size) {}

    /// A commit promoted a new maximum size into the current state.
    fn max_size_changed(&mut self, surface: ToplevelSurface, size: Size) {}

    /// The client asked for the compositor's window menu.
    fn show_window_menu(
        &mut self,
        surface: ToplevelSurface,
        seat: SeatId,
        serial: Serial,
        location: Point,
    ) {
    }

    /// The client requested the start of an interactive move.
    fn move_request(&mut self, surface: ToplevelSurface, seat: SeatId, serial: Serial) {}

    /// The client requested the start of an interactive resize.
    fn resize_request(
        &mut self,
        surface: ToplevelSurface,
        seat: SeatId,
        serial: Serial,
        edges: Edges,
    ) {
    }

    /// A toplevel surface requested to be maximized.
    fn maximize_request(&mut self, surface: ToplevelSurface) {}

    /// A toplevel surface requested to stop being maximized.
    fn unmaximize_request(&mut self, surface: ToplevelSurface) {}

    /// A toplevel surface requested to be set fullscreen.
    fn fullscreen_request(&mut self, surface: ToplevelSurface, output: Option<OutputId>) {}

    /// A toplevel surface requested to stop being fullscreen.
    fn unfullscreen_request(&mut self, surface: ToplevelSurface) {}

    /// A toplevel surface requested to be minimized.
    fn minimize_request(&mut self, surface: ToplevelSurface) {}

    /// This popup requested an explicit grab.
    fn grab(&mut self, surface: PopupSurface, seat: SeatId, serial: Serial);
}

/// A shell client, the instantiation of an `xdg_wm_base` global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShellClient {
    pub(crate) wm_base: WmBaseId,
    pub(crate) client: ClientId,
}

impl ShellClient {
    /// The `xdg_wm_base` resource of this shell client.
    pub fn wm_base(&self) -> WmBaseId {
        self.wm_base
    }

    /// The transport-level client identity.
    pub fn client(&self) -> ClientId {
        self.client
    }
}

/// A handle to a toplevel surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToplevelSurface {
    pub(crate) shell_surface: ToplevelId,
    pub(crate) xdg_surface: XdgSurfaceId,
    pub(crate) wl_surface: SurfaceId,
}

/// A handle to a popup surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopupSurface {
    pub(crate) shell_surface: PopupId,
    pub(crate) xdg_surface: XdgSurfaceId,
    pub(crate) wl_surface: SurfaceId,
}

/// A role object attached to an `xdg_surface`, either of the two kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellSurface {
    /// The surface is a toplevel
    Toplevel(ToplevelSurface),
    /// The surface is a popup
    Popup(PopupSurface),
}

impl ShellSurface {
    /// The `xdg_surface` this role is attached to.
    pub fn xdg_surface(&self) -> XdgSurfaceId {
        match self {
            ShellSurface::Toplevel(surface) => surface.xdg_surface,
            ShellSurface::Popup(surface) => surface.xdg_surface,
        }
    }

    /// The wrapped surface of the generic surface subsystem.
    pub fn wl_surface(&self) -> SurfaceId {
        match self {
            ShellSurface::Toplevel(surface) => surface.wl_surface,
            ShellSurface::Popup(surface) => surface.wl_surface,
        }
    }
}

impl ToplevelSurface {
    /// The `xdg_toplevel` resource of this surface.
    pub fn xdg_toplevel(&self) -> ToplevelId {
        self.shell_surface
    }

    /// The `xdg_surface` resource of this surface.
    pub fn xdg_surface(&self) -> XdgSurfaceId {
        self.xdg_surface
    }

    /// The wrapped surface of the generic surface subsystem.
    pub fn wl_surface(&self) -> SurfaceId {
        self.wl_surface
    }

    /// Send a configure event suggesting a new size and state set.
    ///
    /// Sends the role configure followed by the `xdg_surface` configure
    /// carrying the next display serial, and marks the surface as
    /// configured. The serial is returned for tracking the acknowledgement.
    pub fn send_configure<D>(&self, state: &mut D, size: Size, states: ToplevelStates) -> Serial
    where
        D: XdgShellHandler + ShellTransport,
    {
        let serial = state.xdg_shell_state().serials.next_serial();
        state.toplevel_event(
            self.shell_surface,
            xdg_toplevel::Event::Configure {
                width: size.w,
                height: size.h,
                states: states.wire_states(),
            },
        );
        state.surface_event(self.xdg_surface, xdg_surface::Event::Configure { serial });
        if let Some(data) = state.xdg_shell_state().surfaces.get_mut(&self.xdg_surface) {
            data.configured = true;
        }
        tracing::trace!(serial = u32::from(serial), "sent toplevel configure");
        serial
    }

    /// Ask the client to close its window.
    pub fn send_close<D>(&self, state: &mut D)
    where
        D: XdgShellHandler + ShellTransport,
    {
        state.toplevel_event(self.shell_surface, xdg_toplevel::Event::Close);
    }
}

impl PopupSurface {
    /// The `xdg_popup` resource of this surface.
    pub fn xdg_popup(&self) -> PopupId {
        self.shell_surface
    }

    /// The `xdg_surface` resource of this surface.
    pub fn xdg_surface(&self) -> XdgSurfaceId {
        self.xdg_surface
    }

    /// The wrapped surface of the generic surface subsystem.
    pub fn wl_surface(&self) -> SurfaceId {
        self.wl_surface
    }

    /// Send a configure event placing the popup at `rect`, relative to the
    /// window geometry of the parent surface.
    ///
    /// Sends the role configure followed by the `xdg_surface` configure
    /// carrying the next display serial, and marks the surface as
    /// configured. The serial is returned for tracking the acknowledgement.
    pub fn send_configure<D>(&self, state: &mut D, rect: Rectangle) -> Serial
    where
        D: XdgShellHandler + ShellTransport,
    {
        let serial = state.xdg_shell_state().serials.next_serial();
        state.popup_event(
            self.shell_surface,
            xdg_popup::Event::Configure {
                x: rect.loc.x,
                y: rect.loc.y,
                width: rect.size.w,
                height: rect.size.h,
            },
        );
        state.surface_event(self.xdg_surface, xdg_surface::Event::Configure { serial });
        if let Some(data) = state.xdg_shell_state().surfaces.get_mut(&self.xdg_surface) {
            data.configured = true;
        }
        tracing::trace!(serial = u32::from(serial), "sent popup configure");
        serial
    }

    /// Dismiss the popup.
    ///
    /// The surface is unmapped on the client side; a grabbing popup is also
    /// dropped from its client's grab stack.
    pub fn send_popup_done<D>(&self, state: &mut D)
    where
        D: XdgShellHandler + ShellTransport,
    {
        let shell = state.xdg_shell_state();
        if let Some(client) = shell
            .surfaces
            .get(&self.xdg_surface)
            .map(|data| data.client)
        {
            if let Some(stack) = shell.grab_stacks.get_mut(&client) {
                stack.retain(|popup| *popup != self.shell_surface);
            }
        }
        state.popup_event(self.shell_surface, xdg_popup::Event::PopupDone);
    }
}

bitflags::bitflags! {
    /// The window states of a toplevel surface, as used in configure events.
    ///
    /// Maximization is tracked per axis; the wire encoding in
    /// [`ToplevelStates::wire_states`] collapses it back into the single
    /// `maximized` state of the protocol.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ToplevelStates: u32 {
        /// Maximized along the horizontal axis
        const MAXIMIZED_HORIZONTAL = 0x01;
        /// Maximized along the vertical axis
        const MAXIMIZED_VERTICAL = 0x02;
        /// Fullscreen
        const FULLSCREEN = 0x04;
        /// Part of an interactive resize
        const RESIZING = 0x08;
        /// Holding the input focus
        const ACTIVATED = 0x10;
    }
}

impl ToplevelStates {
    /// Both maximization bits.
    pub const MAXIMIZED: ToplevelStates = ToplevelStates::MAXIMIZED_HORIZONTAL
        .union(ToplevelStates::MAXIMIZED_VERTICAL);

    /// Pack the set into the state array of a toplevel configure event.
    pub fn wire_states(self) -> Vec<xdg_toplevel::State> {
        let mut states = Vec::with_capacity(4);
        if self.contains(ToplevelStates::MAXIMIZED) {
            states.push(xdg_toplevel::State::Maximized);
        }
        if self.contains(ToplevelStates::FULLSCREEN) {
            states.push(xdg_toplevel::State::Fullscreen);
        }
        if self.contains(ToplevelStates::RESIZING) {
            states.push(xdg_toplevel::State::Resizing);
        }
        if self.contains(ToplevelStates::ACTIVATED) {
            states.push(xdg_toplevel::State::Activated);
        }
        states
    }
}

/// The state of a positioner, as set by the client.
///
/// Positioners are value objects; [`handlers::surface_request`] snapshots
/// them when a popup is created, so later mutation by the client does not
/// affect live popups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionerState {
    /// Size of the rectangle that needs to be positioned
    pub size: Option<Size>,
    /// Anchor rectangle in the parent surface coordinates relative to which
    /// the surface must be positioned
    pub anchor_rect: Option<Rectangle>,
    /// Edges defining the anchor point
    pub anchor_edges: Edges,
    /// Edges the surface gravitates towards relative to its anchor point
    pub gravity_edges: Edges,
    /// Axes on which anchor and gravity may be inverted when constrained
    pub flip_adjustments: Orientations,
    /// Axes on which the surface may slide when constrained
    pub slide_adjustments: Orientations,
    /// Axes on which the surface may shrink when constrained
    pub resize_adjustments: Orientations,
    /// Offset placement relative to the anchor point
    pub offset: Point,
}

impl Default for PositionerState {
    fn default() -> Self {
        PositionerState {
            size: None,
            anchor_rect: None,
            anchor_edges: Edges::empty(),
            gravity_edges: Edges::empty(),
            flip_adjustments: Orientations::empty(),
            slide_adjustments: Orientations::empty(),
            resize_adjustments: Orientations::empty(),
            offset: Point::default(),
        }
    }
}

impl PositionerState {
    /// A positioner is complete once both size and anchor rectangle are set.
    pub fn is_complete(&self) -> bool {
        self.size.is_some() && self.anchor_rect.is_some()
    }

    /// Get the anchor point as defined by `set_anchor_rect` and `set_anchor`.
    ///
    /// A corner anchor gives the corner itself; a single edge anchors to the
    /// middle of that edge; no edges anchor to the center of the rectangle.
    pub fn anchor_point(&self) -> Point {
        let rect = self.anchor_rect.unwrap_or_default();
        let mut point = rect.loc;

        point.y += if self.anchor_edges.contains(Edges::TOP) {
            0
        } else if self.anchor_edges.contains(Edges::BOTTOM) {
            rect.size.h
        } else {
            rect.size.h / 2
        };

        point.x += if self.anchor_edges.contains(Edges::LEFT) {
            0
        } else if self.anchor_edges.contains(Edges::RIGHT) {
            rect.size.w
        } else {
            rect.size.w / 2
        };

        point
    }

    /// Get the geometry for a popup as defined by this positioner, ignoring
    /// constraint adjustments.
    ///
    /// The rectangle is positioned relative to the window geometry of the
    /// parent surface. Gravity pulls the surface towards the contained
    /// edges; an axis without gravity centers the surface over the anchor
    /// point.
    pub fn get_geometry(&self) -> Rectangle {
        let mut geometry = Rectangle {
            loc: self.offset,
            size: self.size.unwrap_or_default(),
        };

        geometry.loc += self.anchor_point();

        if self.gravity_edges.contains(Edges::TOP) {
            geometry.loc.y -= geometry.size.h;
        } else if !self.gravity_edges.contains(Edges::BOTTOM) {
            geometry.loc.y -= geometry.size.h / 2;
        }

        if self.gravity_edges.contains(Edges::LEFT) {
            geometry.loc.x -= geometry.size.w;
        } else if !self.gravity_edges.contains(Edges::RIGHT) {
            geometry.loc.x -= geometry.size.w / 2;
        }

        geometry
    }

    /// Get the geometry for a popup after trying to fit it into the target
    /// rectangle.
    ///
    /// The constraint adjustments are applied in protocol order: flip,
    /// slide, resize, independently per axis. A flip that does not remove
    /// the constraint on its axis is reverted.
    pub fn get_unconstrained_geometry(mut self, target: Rectangle) -> Rectangle {
        let mut geo = self.get_geometry();
        let (mut off_left, mut off_right, mut off_top, mut off_bottom) =
            compute_offsets(target, geo);

        // Try to flip horizontally.
        if (off_left > 0 || off_right > 0)
            && self.flip_adjustments.contains(Orientations::HORIZONTAL)
        {
            let mut flipped = self;
            flipped.anchor_edges = flip_edges_x(flipped.anchor_edges);
            flipped.gravity_edges = flip_edges_x(flipped.gravity_edges);
            let new_geo = flipped.get_geometry();
            let (new_off_left, new_off_right, _, _) = compute_offsets(target, new_geo);

            if new_off_left <= 0 && new_off_right <= 0 {
                self = flipped;
                geo = new_geo;
                off_left = 0;
                off_right = 0;
                // off_top and off_bottom are unchanged since we work on rectangles
            }
        }

        // Try to flip vertically.
        if (off_top > 0 || off_bottom > 0) && self.flip_adjustments.contains(Orientations::VERTICAL)
        {
            let mut flipped = self;
            flipped.anchor_edges = flip_edges_y(flipped.anchor_edges);
            flipped.gravity_edges = flip_edges_y(flipped.gravity_edges);
            let new_geo = flipped.get_geometry();
            let (_, _, new_off_top, new_off_bottom) = compute_offsets(target, new_geo);

            if new_off_top <= 0 && new_off_bottom <= 0 {
                self = flipped;
                geo = new_geo;
                off_top = 0;
                off_bottom = 0;
            }
        }

        // Try to slide horizontally, preferring to expose the left edge.
        if (off_left > 0 || off_right > 0)
            && self.slide_adjustments.contains(Orientations::HORIZONTAL)
        {
            if off_left > 0 {
                geo.loc.x += off_left;
            } else if off_right > 0 {
                geo.loc.x -= min(off_right, -off_left);
            }

            (off_left, off_right, _, _) = compute_offsets(target, geo);
        }

        // Try to slide vertically, preferring to expose the top edge.
        if (off_top > 0 || off_bottom > 0) && self.slide_adjustments.contains(Orientations::VERTICAL)
        {
            if off_top > 0 {
                geo.loc.y += off_top;
            } else if off_bottom > 0 {
                geo.loc.y -= min(off_bottom, -off_top);
            }

            (_, _, off_top, off_bottom) = compute_offsets(target, geo);
        }

        // Try to resize horizontally. Skip an offset larger than the width,
        // where clamping would leave a zero-sized geometry.
        if self.resize_adjustments.contains(Orientations::HORIZONTAL) {
            if off_left > 0 && off_left < geo.size.w {
                geo.loc.x += off_left;
                geo.size.w -= off_left;
            }
            if off_right > 0 && off_right < geo.size.w {
                geo.size.w -= off_right;
            }
        }

        // Try to resize vertically.
        if self.resize_adjustments.contains(Orientations::VERTICAL) {
            if off_top > 0 && off_top < geo.size.h {
                geo.loc.y += off_top;
                geo.size.h -= off_top;
            }
            if off_bottom > 0 && off_bottom < geo.size.h {
                geo.size.h -= off_bottom;
            }
        }

        geo
    }
}

fn compute_offsets(target: Rectangle, popup: Rectangle) -> (i32, i32, i32, i32) {
    let off_left = target.loc.x - popup.loc.x;
    let off_right = (popup.loc.x + popup.size.w) - (target.loc.x + target.size.w);
    let off_top = target.loc.y - popup.loc.y;
    let off_bottom = (popup.loc.y + popup.size.h) - (target.loc.y + target.size.h);
    (off_left, off_right, off_top, off_bottom)
}

fn flip_edges_x(edges: Edges) -> Edges {
    let mut flipped = edges - (Edges::LEFT | Edges::RIGHT);
    if edges.contains(Edges::LEFT) {
        flipped |= Edges::RIGHT;
    }
    if edges.contains(Edges::RIGHT) {
        flipped |= Edges::LEFT;
    }
    flipped
}

fn flip_edges_y(edges: Edges) -> Edges {
    let mut flipped = edges - (Edges::TOP | Edges::BOTTOM);
    if edges.contains(Edges::TOP) {
        flipped |= Edges::BOTTOM;
    }
    if edges.contains(Edges::BOTTOM) {
        flipped |= Edges::TOP;
    }
    flipped
}

/// Error returned when attaching a role to a surface that already has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("surface already has a role")]
pub struct AlreadyHasRole;

/// The role kinds a surface can be bound to, at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRole {
    /// Bound as a toplevel
    Toplevel,
    /// Bound as a popup
    Popup,
}

#[derive(Debug)]
pub(crate) struct XdgSurfaceData {
    pub(crate) wl_surface: SurfaceId,
    pub(crate) wm_base: WmBaseId,
    pub(crate) client: ClientId,
    /// Non-owning pointer to the role object, cleared on role destruction
    pub(crate) role: Option<ShellSurface>,
    /// Set once the first configure has been sent
    pub(crate) configured: bool,
    pub(crate) pending_geometry: Option<Rectangle>,
    pub(crate) current_geometry: Option<Rectangle>,
}

#[derive(Debug)]
pub(crate) struct ToplevelData {
    pub(crate) xdg_surface: XdgSurfaceId,
    pub(crate) wl_surface: SurfaceId,
    pub(crate) title: String,
    pub(crate) app_id: String,
    /// Weak reference; the parent's lifecycle is independent
    pub(crate) parent: Option<ToplevelId>,
    pub(crate) pending_min_size: Size,
    pub(crate) pending_max_size: Size,
    pub(crate) current_min_size: Size,
    pub(crate) current_max_size: Size,
}

impl ToplevelData {
    pub(crate) fn new(xdg_surface: XdgSurfaceId, wl_surface: SurfaceId) -> ToplevelData {
        ToplevelData {
            xdg_surface,
            wl_surface,
            title: String::new(),
            app_id: String::new(),
            parent: None,
            pending_min_size: Size::default(),
            pending_max_size: Size::default(),
            current_min_size: Size::default(),
            current_max_size: Size::default(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct PositionerData {
    pub(crate) client: ClientId,
    pub(crate) state: PositionerState,
}

#[derive(Debug)]
pub(crate) struct PopupData {
    pub(crate) xdg_surface: XdgSurfaceId,
    pub(crate) wl_surface: SurfaceId,
    /// The parent `xdg_surface`, required at construction
    pub(crate) parent: XdgSurfaceId,
    /// Snapshot of the positioner at construction time
    pub(crate) positioner: PositionerState,
    pub(crate) has_explicit_grab: bool,
}

/// Shell global state.
///
/// Tracks every object clients created through the shell globals, the ping
/// registry and the display-wide serial counter. `D` is the compositor
/// state driving the event loop.
#[derive(Debug)]
pub struct XdgShellState<D> {
    pub(crate) wm_bases: HashMap<WmBaseId, ClientId>,
    pub(crate) client_surfaces: HashMap<ClientId, IndexSet<XdgSurfaceId>>,
    pub(crate) surfaces: HashMap<XdgSurfaceId, XdgSurfaceData>,
    pub(crate) surface_index: HashMap<SurfaceId, XdgSurfaceId>,
    pub(crate) toplevels: HashMap<ToplevelId, ToplevelData>,
    pub(crate) popups: HashMap<PopupId, PopupData>,
    pub(crate) positioners: HashMap<PositionerId, PositionerData>,
    /// One-shot role bindings of wrapped surfaces; never removed
    pub(crate) roles: HashMap<SurfaceId, SurfaceRole>,
    /// Grabbing popups per client, in mapping order
    pub(crate) grab_stacks: HashMap<ClientId, Vec<PopupId>>,
    pub(crate) pings: HashMap<Serial, ping::PingData>,
    pub(crate) serials: SerialCounter,
    pub(crate) ping_interval: Duration,
    pub(crate) loop_handle: LoopHandle<'static, D>,
}

impl<D> XdgShellState<D> {
    /// Create the shell state.
    ///
    /// The loop handle must belong to the event loop the compositor
    /// dispatches on; it drives the ping timers.
    pub fn new(loop_handle: LoopHandle<'static, D>) -> XdgShellState<D> {
        XdgShellState {
            wm_bases: HashMap::new(),
            client_surfaces: HashMap::new(),
            surfaces: HashMap::new(),
            surface_index: HashMap::new(),
            toplevels: HashMap::new(),
            popups: HashMap::new(),
            positioners: HashMap::new(),
            roles: HashMap::new(),
            grab_stacks: HashMap::new(),
            pings: HashMap::new(),
            serials: SerialCounter::new(),
            ping_interval: PING_INTERVAL,
            loop_handle,
        }
    }

    /// Override the ping interval, [`PING_INTERVAL`] by default.
    ///
    /// Only affects pings sent after the call.
    pub fn set_ping_interval(&mut self, interval: Duration) {
        self.ping_interval = interval;
    }

    /// The currently configured ping interval.
    pub fn ping_interval(&self) -> Duration {
        self.ping_interval
    }

    /// Allocate the next display-wide serial.
    pub fn next_serial(&self) -> Serial {
        self.serials.next_serial()
    }

    /// Access all toplevel surfaces known to this handler.
    pub fn toplevel_surfaces(&self) -> impl Iterator<Item = ToplevelSurface> + '_ {
        self.toplevels.iter().map(|(id, data)| ToplevelSurface {
            shell_surface: *id,
            xdg_surface: data.xdg_surface,
            wl_surface: data.wl_surface,
        })
    }

    /// Access all popup surfaces known to this handler.
    pub fn popup_surfaces(&self) -> impl Iterator<Item = PopupSurface> + '_ {
        self.popups.iter().map(|(id, data)| PopupSurface {
            shell_surface: *id,
            xdg_surface: data.xdg_surface,
            wl_surface: data.wl_surface,
        })
    }

    /// The `xdg_surface` wrapping a surface of the surface subsystem.
    pub fn xdg_surface(&self, wl_surface: SurfaceId) -> Option<XdgSurfaceId> {
        self.surface_index.get(&wl_surface).copied()
    }

    /// The role object currently attached to an `xdg_surface`.
    pub fn role(&self, surface: XdgSurfaceId) -> Option<ShellSurface> {
        self.surfaces.get(&surface).and_then(|data| data.role)
    }

    /// Whether the surface has received at least one configure.
    pub fn is_configured(&self, surface: XdgSurfaceId) -> bool {
        self.surfaces
            .get(&surface)
            .map(|data| data.configured)
            .unwrap_or(false)
    }

    /// The current (committed) window geometry of a surface, if the client
    /// ever set one.
    pub fn window_geometry(&self, surface: XdgSurfaceId) -> Option<Rectangle> {
        self.surfaces
            .get(&surface)
            .and_then(|data| data.current_geometry)
    }

    /// The shell client owning an `xdg_surface`.
    pub fn shell_client(&self, surface: XdgSurfaceId) -> Option<ShellClient> {
        self.surfaces.get(&surface).map(|data| ShellClient {
            wm_base: data.wm_base,
            client: data.client,
        })
    }

    /// The current title of a toplevel, empty until the client sets one.
    pub fn title(&self, toplevel: ToplevelSurface) -> Option<&str> {
        self.toplevels
            .get(&toplevel.shell_surface)
            .map(|data| data.title.as_str())
    }

    /// The current application id of a toplevel, empty until the client
    /// sets one.
    pub fn app_id(&self, toplevel: ToplevelSurface) -> Option<&str> {
        self.toplevels
            .get(&toplevel.shell_surface)
            .map(|data| data.app_id.as_str())
    }

    /// The parent of a toplevel, if it has one that is still alive.
    pub fn parent(&self, toplevel: ToplevelSurface) -> Option<ToplevelSurface> {
        let parent = self.toplevels.get(&toplevel.shell_surface)?.parent?;
        let data = self.toplevels.get(&parent)?;
        Some(ToplevelSurface {
            shell_surface: parent,
            xdg_surface: data.xdg_surface,
            wl_surface: data.wl_surface,
        })
    }

    /// The effective minimum size of a toplevel, `(0, 0)` when
    /// unconstrained.
    pub fn min_size(&self, toplevel: ToplevelSurface) -> Size {
        self.toplevels
            .get(&toplevel.shell_surface)
            .map(|data| data.current_min_size)
            .unwrap_or_default()
    }

    /// The effective maximum size of a toplevel.
    ///
    /// An unconstrained maximum reads as `(i32::MAX, i32::MAX)`.
    pub fn max_size(&self, toplevel: ToplevelSurface) -> Size {
        let size = self
            .toplevels
            .get(&toplevel.shell_surface)
            .map(|data| data.current_max_size)
            .unwrap_or_default();
        if size.is_empty() {
            Size::new(i32::MAX, i32::MAX)
        } else {
            size
        }
    }

    /// The positioner snapshot a popup was created with.
    pub fn positioner(&self, popup: PopupSurface) -> Option<PositionerState> {
        self.popups
            .get(&popup.shell_surface)
            .map(|data| data.positioner)
    }

    /// The parent `xdg_surface` of a popup.
    pub fn popup_parent(&self, popup: PopupSurface) -> Option<XdgSurfaceId> {
        self.popups.get(&popup.shell_surface).map(|data| data.parent)
    }

    /// Whether the popup has requested an explicit grab.
    pub fn has_explicit_grab(&self, popup: PopupSurface) -> bool {
        self.popups
            .get(&popup.shell_surface)
            .map(|data| data.has_explicit_grab)
            .unwrap_or(false)
    }

    /// Bind a role to a wrapped surface. Roles are permanent: once a
    /// surface was a toplevel or a popup it can never become anything else.
    pub(crate) fn give_role(
        &mut self,
        wl_surface: SurfaceId,
        role: SurfaceRole,
    ) -> Result<(), AlreadyHasRole> {
        if self.roles.contains_key(&wl_surface) {
            return Err(AlreadyHasRole);
        }
        self.roles.insert(wl_surface, role);
        Ok(())
    }
}

/// Handle a commit of a wrapped surface.
///
/// Must be called by the surface subsystem whenever a surface that was
/// passed to `get_xdg_surface` commits. Promotes the double-buffered shell
/// state and notifies the role:
///
/// - a role that has not been configured yet emits
///   [`XdgShellHandler::initialize_requested`] and promotes nothing,
/// - otherwise pending state becomes current, the size bounds of a
///   toplevel settling before the window geometry; change signals fire
///   for every value that differed and [`XdgShellHandler::committed`]
///   runs last.
pub fn commit<D>(state: &mut D, surface: SurfaceId)
where
    D: XdgShellHandler,
{
    let shell = state.xdg_shell_state();
    let Some(&xdg_id) = shell.surface_index.get(&surface) else {
        return;
    };
    let Some(data) = shell.surfaces.get(&xdg_id) else {
        return;
    };
    let Some(role) = data.role else {
        // plain xdg_surface without a role object, nothing to promote
        return;
    };

    if !data.configured {
        state.initialize_requested(role);
        return;
    }

    let mut min_change = None;
    let mut max_change = None;
    if let ShellSurface::Toplevel(toplevel) = role {
        if let Some(tl) = shell.toplevels.get_mut(&toplevel.shell_surface) {
            if tl.current_min_size != tl.pending_min_size {
                tl.current_min_size = tl.pending_min_size;
                min_change = Some(tl.current_min_size);
            }
            if tl.current_max_size != tl.pending_max_size {
                tl.current_max_size = tl.pending_max_size;
                max_change = Some(tl.current_max_size);
            }
        }
    }

    let geometry_change = match shell.surfaces.get_mut(&xdg_id) {
        Some(data) if data.pending_geometry != data.current_geometry => {
            data.current_geometry = data.pending_geometry;
            data.current_geometry
        }
        _ => None,
    };

    if let ShellSurface::Toplevel(toplevel) = role {
        if let Some(size) = min_change {
            state.min_size_changed(toplevel, size);
        }
        if let Some(size) = max_change {
            state.max_size_changed(toplevel, size);
        }
    }
    if let Some(geometry) = geometry_change {
        state.window_geometry_changed(role, geometry);
    }
    state.committed(role);
}
