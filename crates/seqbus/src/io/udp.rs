// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Non-blocking UDP datagram channel.
//!
//! Sockets are built through `socket2` so reuse-address can be set before
//! bind, then handed to mio for readiness polling.

use std::io;
use std::net::SocketAddr;

use mio::net::UdpSocket;
use mio::{Registry, Token};
use socket2::{Domain, Protocol, Socket, Type};

use super::selector::{Channel, Ops};

/// Largest datagram the receive path accepts.
const RECV_BUFFER_SIZE: usize = 65_535;

/// Datagram delivery callback: `(payload, source address)`.
pub type DatagramFn = Box<dyn FnMut(&[u8], SocketAddr)>;

/// UDP endpoint dispatching received datagrams to a callback.
pub struct UdpChannel {
    socket: UdpSocket,
    recv_buf: Box<[u8]>,
    on_datagram: DatagramFn,
}

impl UdpChannel {
    /// Bind a reusable, non-blocking socket on `addr`.
    pub fn bind(addr: SocketAddr, on_datagram: DatagramFn) -> io::Result<Self> {
        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };
        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&addr.into())?;

        Ok(Self {
            socket: UdpSocket::from_std(socket.into()),
            recv_buf: vec![0u8; RECV_BUFFER_SIZE].into_boxed_slice(),
            on_datagram,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Send one datagram; partial sends do not happen for UDP.
    pub fn send_to(&self, payload: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(payload, target)
    }
}

impl Channel for UdpChannel {
    fn register(&mut self, registry: &Registry, token: Token, ops: Ops) -> io::Result<()> {
        registry.register(&mut self.socket, token, ops.to_interest())
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        registry.deregister(&mut self.socket)
    }

    fn on_ready(&mut self, readable: bool, _writable: bool) -> io::Result<()> {
        if !readable {
            return Ok(());
        }
        loop {
            match self.socket.recv_from(&mut self.recv_buf) {
                Ok((len, from)) => (self.on_datagram)(&self.recv_buf[..len], from),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::selector::Selector;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().expect("Loopback address should parse")
    }

    #[test]
    fn test_datagram_roundtrip_through_selector() {
        let mut selector = Selector::new().expect("Selector creation should succeed");
        let received: Rc<RefCell<Vec<Vec<u8>>>> = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&received);
        let receiver = Rc::new(RefCell::new(
            UdpChannel::bind(
                loopback(),
                Box::new(move |payload, _from| {
                    sink.borrow_mut().push(payload.to_vec());
                }),
            )
            .expect("Receiver bind should succeed"),
        ));
        let receiver_addr = receiver
            .borrow()
            .local_addr()
            .expect("Local addr should resolve");
        selector
            .register(receiver.clone(), Ops::READ)
            .expect("Register should succeed");

        let sender =
            UdpChannel::bind(loopback(), Box::new(|_, _| {})).expect("Sender bind should succeed");
        sender
            .send_to(b"ping", receiver_addr)
            .expect("Send should succeed");

        // A couple of polls gives the kernel time to deliver locally.
        for _ in 0..50 {
            selector
                .select(Some(Duration::from_millis(20)))
                .expect("Select should succeed");
            if !received.borrow().is_empty() {
                break;
            }
        }
        assert_eq!(*received.borrow(), vec![b"ping".to_vec()]);
    }
}
