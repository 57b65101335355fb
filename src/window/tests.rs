use std::collections::HashSet;
use std::time::{Duration, Instant};

use calloop::EventLoop;

use super::*;
use crate::protocol::{
    xdg_popup, xdg_positioner, xdg_surface, xdg_toplevel, xdg_wm_base, ClientId, ObjectId, PopupId,
    PositionerId, ProtocolError, SeatId, SurfaceId, ToplevelId, WmBaseId,
};
use crate::shell::{
    commit, handlers, PopupSurface, PositionerState, SurfaceAccess, ToplevelStates,
    ToplevelSurface, XdgShellHandler, XdgShellState,
};
use crate::utils::Size;

const CLIENT: ClientId = ClientId::new(1);

fn base(n: u32) -> WmBaseId {
    WmBaseId::new(ObjectId::new(n))
}

fn xdg(n: u32) -> XdgSurfaceId {
    XdgSurfaceId::new(ObjectId::new(n))
}

fn tl(n: u32) -> ToplevelId {
    ToplevelId::new(ObjectId::new(n))
}

fn pop(n: u32) -> PopupId {
    PopupId::new(ObjectId::new(n))
}

fn pos(n: u32) -> PositionerId {
    PositionerId::new(ObjectId::new(n))
}

fn wl(n: u32) -> SurfaceId {
    SurfaceId::new(n)
}

fn rect(x: i32, y: i32, w: i32, h: i32) -> Rectangle {
    Rectangle::from_loc_and_size((x, y), (w, h))
}

struct WinState {
    shell: XdgShellState<WinState>,
    windows: WindowState<WinState>,
    buffers: HashSet<SurfaceId>,
    toplevel_configures: Vec<(ToplevelId, Size, Vec<xdg_toplevel::State>)>,
    popup_configures: Vec<(PopupId, Rectangle)>,
    surface_configures: Vec<(XdgSurfaceId, Serial)>,
    frame_changes: Vec<(ShellSurface, Rectangle)>,
    buffer_changes: Vec<(ShellSurface, Rectangle)>,
    states_acks: Vec<(ToplevelSurface, ToplevelStates)>,
    errors: Vec<ProtocolError>,
}

impl XdgShellHandler for WinState {
    fn xdg_shell_state(&mut self) -> &mut XdgShellState<Self> {
        &mut self.shell
    }

    fn new_toplevel(&mut self, surface: ToplevelSurface) {
        self.windows.add_window(ShellSurface::Toplevel(surface));
    }

    fn new_popup(&mut self, surface: PopupSurface, _positioner: PositionerState) {
        self.windows.add_window(ShellSurface::Popup(surface));
    }

    fn grab(&mut self, _surface: PopupSurface, _seat: SeatId, _serial: Serial) {}

    fn configure_acknowledged(&mut self, surface: ShellSurface, serial: Serial) {
        ack_configure(self, surface.xdg_surface(), serial);
    }

    fn committed(&mut self, surface: ShellSurface) {
        handle_commit(self, surface.xdg_surface());
    }

    fn toplevel_destroyed(&mut self, surface: ToplevelSurface) {
        self.windows.remove_window(surface.xdg_surface());
    }

    fn popup_destroyed(&mut self, surface: PopupSurface) {
        self.windows.remove_window(surface.xdg_surface());
    }
}

impl WindowHandler for WinState {
    fn window_state(&mut self) -> &mut WindowState<Self> {
        &mut self.windows
    }

    fn frame_geometry_changed(&mut self, surface: ShellSurface, old: Rectangle) {
        self.frame_changes.push((surface, old));
    }

    fn buffer_geometry_changed(&mut self, surface: ShellSurface, old: Rectangle) {
        self.buffer_changes.push((surface, old));
    }

    fn states_acknowledged(&mut self, surface: ToplevelSurface, states: ToplevelStates) {
        self.states_acks.push((surface, states));
    }
}

impl SurfaceAccess for WinState {
    fn surface_has_buffer(&self, surface: SurfaceId) -> bool {
        self.buffers.contains(&surface)
    }
}

impl crate::protocol::ShellTransport for WinState {
    fn wm_base_event(&mut self, _wm_base: WmBaseId, _event: xdg_wm_base::Event) {}

    fn surface_event(&mut self, surface: XdgSurfaceId, event: xdg_surface::Event) {
        let xdg_surface::Event::Configure { serial } = event;
        self.surface_configures.push((surface, serial));
    }

    fn toplevel_event(&mut self, toplevel: ToplevelId, event: xdg_toplevel::Event) {
        if let xdg_toplevel::Event::Configure {
            width,
            height,
            states,
        } = event
        {
            self.toplevel_configures
                .push((toplevel, Size::new(width, height), states));
        }
    }

    fn popup_event(&mut self, popup: PopupId, event: xdg_popup::Event) {
        if let xdg_popup::Event::Configure {
            x,
            y,
            width,
            height,
        } = event
        {
            self.popup_configures.push((popup, rect(x, y, width, height)));
        }
    }

    fn post_error(&mut self, error: ProtocolError) {
        self.errors.push(error);
    }
}

fn setup() -> (EventLoop<'static, WinState>, WinState) {
    let event_loop = EventLoop::try_new().unwrap();
    let state = WinState {
        shell: XdgShellState::new(event_loop.handle()),
        windows: WindowState::new(event_loop.handle()),
        buffers: HashSet::new(),
        toplevel_configures: Vec::new(),
        popup_configures: Vec::new(),
        surface_configures: Vec::new(),
        frame_changes: Vec::new(),
        buffer_changes: Vec::new(),
        states_acks: Vec::new(),
        errors: Vec::new(),
    };
    (event_loop, state)
}

fn bring_up(state: &mut WinState) -> ToplevelSurface {
    handlers::bind_wm_base(state, CLIENT, base(1));
    handlers::wm_base_request(
        state,
        base(1),
        xdg_wm_base::Request::GetXdgSurface {
            id: xdg(2),
            surface: wl(100),
        },
    );
    handlers::surface_request(state, xdg(2), xdg_surface::Request::GetToplevel { id: tl(3) });
    state.shell.toplevel_surfaces().next().unwrap()
}

fn last_serial(state: &WinState) -> u32 {
    state.surface_configures.last().unwrap().1.into()
}

#[test]
fn rapid_geometry_requests_coalesce() {
    let (mut event_loop, mut state) = setup();
    bring_up(&mut state);

    request_geometry(&mut state, xdg(2), rect(0, 0, 640, 480));
    request_geometry(&mut state, xdg(2), rect(0, 0, 800, 600));
    assert!(state.toplevel_configures.is_empty());

    let deadline = Instant::now() + Duration::from_millis(500);
    while state.toplevel_configures.is_empty() && Instant::now() < deadline {
        event_loop
            .dispatch(Some(Duration::from_millis(5)), &mut state)
            .unwrap();
    }
    // a few more turns must not produce a second configure
    for _ in 0..5 {
        event_loop
            .dispatch(Some(Duration::from_millis(5)), &mut state)
            .unwrap();
    }

    assert_eq!(
        state.toplevel_configures,
        vec![(tl(3), Size::new(800, 600), Vec::new())]
    );
    let window = state.windows.window(xdg(2)).unwrap();
    assert_eq!(window.pending_configures().count(), 1);
    assert_eq!(window.requested_frame_geometry(), rect(0, 0, 800, 600));
}

#[test]
fn ack_truncates_the_queue_prefix() {
    let (_event_loop, mut state) = setup();
    bring_up(&mut state);

    request_geometry(&mut state, xdg(2), rect(0, 0, 100, 100));
    send_configure(&mut state, xdg(2));
    let first = last_serial(&state);
    request_geometry(&mut state, xdg(2), rect(0, 0, 200, 200));
    send_configure(&mut state, xdg(2));
    let second = last_serial(&state);
    request_geometry(&mut state, xdg(2), rect(0, 0, 300, 300));
    send_configure(&mut state, xdg(2));
    let third = last_serial(&state);
    assert!(first < second && second < third);

    handlers::surface_request(
        &mut state,
        xdg(2),
        xdg_surface::Request::AckConfigure { serial: second },
    );

    let window = state.windows.window(xdg(2)).unwrap();
    let left: Vec<u32> = window
        .pending_configures()
        .map(|configure| configure.serial.into())
        .collect();
    assert_eq!(left, vec![third]);
    let acknowledged = window.last_acknowledged_configure().unwrap();
    assert_eq!(u32::from(acknowledged.serial), second);
    assert_eq!(acknowledged.geometry, rect(0, 0, 200, 200));
}

#[test]
fn ack_with_no_matching_configure_changes_nothing() {
    let (_event_loop, mut state) = setup();
    bring_up(&mut state);

    request_geometry(&mut state, xdg(2), rect(0, 0, 100, 100));
    send_configure(&mut state, xdg(2));
    let serial = last_serial(&state);

    handlers::surface_request(
        &mut state,
        xdg(2),
        xdg_surface::Request::AckConfigure { serial: serial + 1000 },
    );
    // a stale serial smaller than anything queued is also inert
    let window = state.windows.window(xdg(2)).unwrap();
    assert!(window.last_acknowledged_configure().is_some());

    let (_event_loop, mut state) = setup();
    bring_up(&mut state);
    request_geometry(&mut state, xdg(2), rect(0, 0, 100, 100));
    send_configure(&mut state, xdg(2));
    handlers::surface_request(&mut state, xdg(2), xdg_surface::Request::AckConfigure { serial: 0 });
    let window = state.windows.window(xdg(2)).unwrap();
    assert!(window.last_acknowledged_configure().is_none());
    assert_eq!(window.pending_configures().count(), 1);
}

#[test]
fn commit_applies_acknowledged_geometry_when_caught_up() {
    let (_event_loop, mut state) = setup();
    bring_up(&mut state);

    request_geometry(&mut state, xdg(2), rect(0, 0, 400, 300));
    send_configure(&mut state, xdg(2));
    let serial = last_serial(&state);
    handlers::surface_request(&mut state, xdg(2), xdg_surface::Request::AckConfigure { serial });

    // the client commits an older size first, nothing is applied
    handlers::surface_request(
        &mut state,
        xdg(2),
        xdg_surface::Request::SetWindowGeometry {
            x: 0,
            y: 0,
            width: 200,
            height: 100,
        },
    );
    commit(&mut state, wl(100));
    assert!(state.frame_changes.is_empty());
    assert_eq!(
        state.windows.window(xdg(2)).unwrap().frame_geometry(),
        Rectangle::default()
    );

    // once the committed geometry matches, the rectangle is applied
    handlers::surface_request(
        &mut state,
        xdg(2),
        xdg_surface::Request::SetWindowGeometry {
            x: 0,
            y: 0,
            width: 400,
            height: 300,
        },
    );
    commit(&mut state, wl(100));
    assert_eq!(state.frame_changes.len(), 1);
    assert_eq!(state.buffer_changes.len(), 1);
    let window = state.windows.window(xdg(2)).unwrap();
    assert_eq!(window.frame_geometry(), rect(0, 0, 400, 300));
    assert_eq!(window.buffer_geometry(), rect(0, 0, 400, 300));
}

#[test]
fn acknowledged_states_are_reported_once() {
    let (_event_loop, mut state) = setup();
    let toplevel = bring_up(&mut state);

    let states = ToplevelStates::MAXIMIZED | ToplevelStates::ACTIVATED;
    state.windows.window_mut(xdg(2)).unwrap().set_states(states);
    request_geometry(&mut state, xdg(2), rect(0, 0, 1280, 720));
    send_configure(&mut state, xdg(2));
    let serial = last_serial(&state);
    handlers::surface_request(&mut state, xdg(2), xdg_surface::Request::AckConfigure { serial });
    assert_eq!(state.states_acks, vec![(toplevel, states)]);
    assert_eq!(
        state.windows.window(xdg(2)).unwrap().last_acknowledged_states(),
        states
    );

    // an acknowledgement with the same state set stays quiet
    send_configure(&mut state, xdg(2));
    let serial = last_serial(&state);
    handlers::surface_request(&mut state, xdg(2), xdg_surface::Request::AckConfigure { serial });
    assert_eq!(state.states_acks.len(), 1);
}

#[test]
fn update_geometry_swaps_both_rectangles() {
    let (_event_loop, mut state) = setup();
    let toplevel = bring_up(&mut state);

    update_geometry(&mut state, xdg(2), rect(10, 10, 300, 200));
    assert_eq!(
        state.frame_changes,
        vec![(ShellSurface::Toplevel(toplevel), Rectangle::default())]
    );
    assert_eq!(
        state.buffer_changes,
        vec![(ShellSurface::Toplevel(toplevel), Rectangle::default())]
    );

    // applying the same rectangle again is not a change
    update_geometry(&mut state, xdg(2), rect(10, 10, 300, 200));
    assert_eq!(state.frame_changes.len(), 1);
    assert_eq!(state.buffer_changes.len(), 1);
}

#[test]
fn popup_windows_send_popup_configures() {
    let (_event_loop, mut state) = setup();
    bring_up(&mut state);

    handlers::wm_base_request(
        &mut state,
        base(1),
        xdg_wm_base::Request::CreatePositioner { id: pos(4) },
    );
    handlers::positioner_request(
        &mut state,
        pos(4),
        xdg_positioner::Request::SetSize {
            width: 100,
            height: 50,
        },
    );
    handlers::positioner_request(
        &mut state,
        pos(4),
        xdg_positioner::Request::SetAnchorRect {
            x: 10,
            y: 10,
            width: 1,
            height: 1,
        },
    );
    handlers::wm_base_request(
        &mut state,
        base(1),
        xdg_wm_base::Request::GetXdgSurface {
            id: xdg(5),
            surface: wl(101),
        },
    );
    handlers::surface_request(
        &mut state,
        xdg(5),
        xdg_surface::Request::GetPopup {
            id: pop(6),
            parent: Some(xdg(2)),
            positioner: pos(4),
        },
    );

    request_geometry(&mut state, xdg(5), rect(11, 11, 100, 50));
    send_configure(&mut state, xdg(5));
    assert_eq!(state.popup_configures, vec![(pop(6), rect(11, 11, 100, 50))]);
    let window = state.windows.window(xdg(5)).unwrap();
    assert_eq!(window.pending_configures().count(), 1);
    assert!(state.errors.is_empty());
}

#[test]
fn attachments_track_side_protocol_objects() {
    let (_event_loop, mut state) = setup();
    bring_up(&mut state);
    let window = state.windows.window_mut(xdg(2)).unwrap();

    assert_eq!(window.decoration(), None);
    window.install_decoration(ObjectId::new(40));
    window.install_palette(ObjectId::new(41));
    window.install_app_menu(ObjectId::new(42));
    window.install_plasma_shell(ObjectId::new(43));
    assert_eq!(window.decoration(), Some(ObjectId::new(40)));
    assert_eq!(window.palette(), Some(ObjectId::new(41)));
    assert_eq!(window.app_menu(), Some(ObjectId::new(42)));
    assert_eq!(window.plasma_shell(), Some(ObjectId::new(43)));

    // replacing is allowed, one of each kind at most
    window.install_decoration(ObjectId::new(50));
    assert_eq!(window.decoration(), Some(ObjectId::new(50)));

    // side-protocol teardown clears the slot but leaves the window alone
    window.decoration_destroyed();
    assert_eq!(window.decoration(), None);
    assert!(state.windows.window(xdg(2)).is_some());
}
