//! Typed view of the `xdg_shell` wire protocol.
//!
//! The transport (object marshalling, per-client dispatch, version
//! negotiation) is out of scope for this crate. Instead of generated
//! bindings, each interface is described here by plain `Request` and `Event`
//! enums plus the error codes the stable `xdg_shell` XML defines for it.
//! The transport decodes incoming messages into [`Request`] values, hands
//! them to the dispatch functions in [`crate::shell::handlers`], and
//! forwards everything the core pushes into its [`ShellTransport`] sink
//! back onto the wire.
//!
//! All object identities are opaque ids assigned by the transport. The
//! per-interface newtypes only exist so that a popup id cannot be confused
//! with a positioner id inside the core.
//!
//! [`Request`]: xdg_wm_base::Request

use std::borrow::Cow;

pub mod xdg_popup;
pub mod xdg_positioner;
pub mod xdg_surface;
pub mod xdg_toplevel;
pub mod xdg_wm_base;

/// Opaque identity of a client connection, assigned by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u32);

impl ClientId {
    /// Wrap a raw client id.
    pub const fn new(id: u32) -> ClientId {
        ClientId(id)
    }
}

/// Opaque identity of a protocol object, assigned by the transport.
///
/// Unlike the per-client object ids of the wire format, these are unique
/// across the whole display, like the resource pointers they stand in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Wrap a raw protocol object id.
    pub const fn new(id: u32) -> ObjectId {
        ObjectId(id)
    }

    /// The raw protocol id.
    pub const fn protocol_id(self) -> u32 {
        self.0
    }
}

macro_rules! interface_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(ObjectId);

        impl $name {
            /// Wrap a raw transport object id.
            pub const fn new(id: ObjectId) -> $name {
                $name(id)
            }

            /// The underlying object id.
            pub const fn object_id(self) -> ObjectId {
                self.0
            }
        }

        impl From<$name> for ObjectId {
            fn from(id: $name) -> ObjectId {
                id.0
            }
        }
    };
}

interface_id!(
    /// Identity of an `xdg_wm_base` binding.
    WmBaseId
);
interface_id!(
    /// Identity of an `xdg_positioner` object.
    PositionerId
);
interface_id!(
    /// Identity of an `xdg_surface` object.
    XdgSurfaceId
);
interface_id!(
    /// Identity of an `xdg_toplevel` object.
    ToplevelId
);
interface_id!(
    /// Identity of an `xdg_popup` object.
    PopupId
);

/// Opaque handle to a surface of the generic surface subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u32);

impl SurfaceId {
    /// Wrap a raw surface id.
    pub const fn new(id: u32) -> SurfaceId {
        SurfaceId(id)
    }
}

/// Opaque handle to a seat, passed through to emitted request signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeatId(u32);

impl SeatId {
    /// Wrap a raw seat id.
    pub const fn new(id: u32) -> SeatId {
        SeatId(id)
    }
}

/// Opaque handle to an output, passed through to emitted request signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputId(u32);

impl OutputId {
    /// Wrap a raw output id.
    pub const fn new(id: u32) -> OutputId {
        OutputId(id)
    }
}

/// Error code carried by a [`ProtocolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// An error defined by the `xdg_wm_base` interface
    WmBase(xdg_wm_base::Error),
    /// An error defined by the `xdg_surface` interface
    Surface(xdg_surface::Error),
    /// An error defined by the `xdg_positioner` interface
    Positioner(xdg_positioner::Error),
    /// An implementation-defined error outside the protocol's enums,
    /// carried on the wire as code `-1` like the reference server
    Implementation,
}

impl ErrorCode {
    /// The numeric code to put on the wire.
    pub fn wire_code(self) -> i32 {
        match self {
            ErrorCode::WmBase(err) => err as i32,
            ErrorCode::Surface(err) => err as i32,
            ErrorCode::Positioner(err) => err as i32,
            ErrorCode::Implementation => -1,
        }
    }
}

/// A fatal protocol violation, reported on the offending resource.
///
/// Posting one of these terminates the client connection on the transport
/// side; the core never mutates state for the rejected request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("protocol error {code:?} on object {object:?}: {message}")]
pub struct ProtocolError {
    /// The resource the violating request was issued on
    pub object: ObjectId,
    /// The typed error code
    pub code: ErrorCode,
    /// Human readable description, forwarded to the client
    pub message: Cow<'static, str>,
}

impl ProtocolError {
    pub(crate) fn new(
        object: impl Into<ObjectId>,
        code: ErrorCode,
        message: impl Into<Cow<'static, str>>,
    ) -> ProtocolError {
        ProtocolError {
            object: object.into(),
            code,
            message: message.into(),
        }
    }
}

/// Outbound half of the wire connection, implemented by the transport.
///
/// The core pushes typed events into this sink; the transport is expected
/// to marshal and deliver them in call order. Sends to destroyed resources
/// must be ignored by the transport.
pub trait ShellTransport {
    /// Queue an event on an `xdg_wm_base` resource.
    fn wm_base_event(&mut self, wm_base: WmBaseId, event: xdg_wm_base::Event);

    /// Queue an event on an `xdg_surface` resource.
    fn surface_event(&mut self, surface: XdgSurfaceId, event: xdg_surface::Event);

    /// Queue an event on an `xdg_toplevel` resource.
    fn toplevel_event(&mut self, toplevel: ToplevelId, event: xdg_toplevel::Event);

    /// Queue an event on an `xdg_popup` resource.
    fn popup_event(&mut self, popup: PopupId, event: xdg_popup::Event);

    /// Report a protocol violation on the offending resource.
    fn post_error(&mut self, error: ProtocolError);
}

/// Convenience used by the dispatch functions to keep call sites short.
pub(crate) fn post_error<T: ShellTransport + ?Sized>(
    transport: &mut T,
    object: impl Into<ObjectId>,
    code: ErrorCode,
    message: impl Into<Cow<'static, str>>,
) {
    transport.post_error(ProtocolError::new(object, code, message));
}
