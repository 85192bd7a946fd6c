//! Raw SocketCAN binding (Linux only): one `CAN_RAW` socket bound to a named
//! interface, written to without ever blocking.
//!
//! The socket lives in an [`OwnedFd`], so every failure path after creation
//! and every drop releases the descriptor; [`SocketCanBus::close`] only takes
//! it out early.
use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use crate::error::TransportError;
use crate::protocol::transport::{can_frame::CanFrame, traits::can_bus::CanBus, CAN_MTU};

/// Kernel limit on interface names, trailing NUL included.
const IFNAMSIZ: usize = libc::IFNAMSIZ;

/// Transport Handle for a bound SocketCAN raw socket.
#[derive(Debug)]
pub struct SocketCanBus {
    interface: String,
    ifindex: u32,
    socket: Option<OwnedFd>,
}

impl SocketCanBus {
    /// Resolve `interface`, create a raw CAN socket and bind it.
    ///
    /// Resolution happens before any descriptor exists, so an unknown name
    /// never allocates a socket; a bind failure drops the fresh socket.
    pub fn open(interface: &str) -> Result<Self, TransportError> {
        let ifindex = resolve_interface(interface)?;
        let socket = create_raw_socket()?;
        bind_to_interface(&socket, ifindex).map_err(|source| TransportError::BindFailed {
            name: interface.to_owned(),
            source,
        })?;

        tracing::info!(interface, ifindex, "CAN raw socket bound");
        Ok(Self {
            interface: interface.to_owned(),
            ifindex,
            socket: Some(socket),
        })
    }

    /// Name the socket was bound to.
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Kernel interface index the socket was bound to.
    pub fn ifindex(&self) -> u32 {
        self.ifindex
    }

    /// `false` once [`CanBus::close`] ran.
    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    /// Single non-blocking `send(2)`; anything but a full frame is a failure.
    pub fn send_now(&self, frame: &CanFrame) -> Result<(), TransportError> {
        let Some(socket) = self.socket.as_ref() else {
            return Err(TransportError::SendFailed {
                written: 0,
                expected: CAN_MTU,
                source: io::Error::from_raw_os_error(libc::EBADF),
            });
        };

        let wire = frame.to_wire();
        // SAFETY: `wire` is a live buffer of `wire.len()` bytes and the
        // descriptor is owned by `self` for the duration of the call.
        let written = unsafe {
            libc::send(
                socket.as_raw_fd(),
                wire.as_ptr().cast(),
                wire.len(),
                libc::MSG_DONTWAIT,
            )
        };

        if written < 0 {
            return Err(TransportError::SendFailed {
                written: 0,
                expected: CAN_MTU,
                source: io::Error::last_os_error(),
            });
        }
        let written = written as usize;
        if written != CAN_MTU {
            return Err(TransportError::SendFailed {
                written,
                expected: CAN_MTU,
                source: io::Error::from(io::ErrorKind::WriteZero),
            });
        }
        Ok(())
    }
}

impl CanBus for SocketCanBus {
    type Error = TransportError;

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        self.send_now(frame)
    }

    fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            drop(socket);
            tracing::debug!(interface = %self.interface, "CAN raw socket closed");
        }
    }
}

fn resolve_interface(name: &str) -> Result<u32, TransportError> {
    let not_found = || TransportError::InterfaceNotFound {
        name: name.to_owned(),
    };
    if name.is_empty() || name.len() >= IFNAMSIZ {
        return Err(not_found());
    }
    let c_name = CString::new(name).map_err(|_| not_found())?;
    // SAFETY: `c_name` is a valid NUL-terminated string for the call.
    let index = unsafe { libc::if_nametoindex(c_name.as_ptr()) };
    if index == 0 {
        return Err(not_found());
    }
    Ok(index)
}

fn create_raw_socket() -> Result<OwnedFd, TransportError> {
    // SAFETY: plain syscall, no pointers involved.
    let fd = unsafe {
        libc::socket(
            libc::PF_CAN,
            libc::SOCK_RAW | libc::SOCK_CLOEXEC,
            libc::CAN_RAW,
        )
    };
    if fd < 0 {
        return Err(TransportError::SocketCreateFailed(io::Error::last_os_error()));
    }
    // SAFETY: `fd` was just returned by socket(2) and is owned by nobody else.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

fn bind_to_interface(socket: &OwnedFd, ifindex: u32) -> io::Result<()> {
    // SAFETY: `sockaddr_can` is plain old data; all-zero is a valid value.
    let mut addr: libc::sockaddr_can = unsafe { std::mem::zeroed() };
    addr.can_family = libc::AF_CAN as libc::sa_family_t;
    addr.can_ifindex = ifindex as libc::c_int;

    // SAFETY: `addr` outlives the call and the length matches its type.
    let rc = unsafe {
        libc::bind(
            socket.as_raw_fd(),
            (&addr as *const libc::sockaddr_can).cast::<libc::sockaddr>(),
            std::mem::size_of::<libc::sockaddr_can>() as libc::socklen_t,
        )
    };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
