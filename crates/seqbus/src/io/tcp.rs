// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Non-blocking TCP stream and listener channels.
//!
//! Streams queue outbound bytes and flush on write readiness; reads drain
//! the socket and hand each chunk to the data callback. A peer close
//! surfaces as an error from `on_ready`, which makes the selector drop the
//! channel.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::SocketAddr;

use mio::net::{TcpListener, TcpStream};
use mio::{Registry, Token};

use super::selector::{Channel, Ops};

/// Read chunk size; one TCP segment's worth of headroom.
const READ_BUFFER_SIZE: usize = 16 * 1024;

/// Inbound data callback.
pub type DataFn = Box<dyn FnMut(&[u8])>;

/// Accept callback: `(stream, peer address)`.
pub type AcceptFn = Box<dyn FnMut(TcpStream, SocketAddr)>;

/// Accepting side of a TCP endpoint.
pub struct TcpListenerChannel {
    listener: TcpListener,
    on_accept: AcceptFn,
}

impl TcpListenerChannel {
    pub fn bind(addr: SocketAddr, on_accept: AcceptFn) -> io::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr)?,
            on_accept,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Channel for TcpListenerChannel {
    fn register(&mut self, registry: &Registry, token: Token, ops: Ops) -> io::Result<()> {
        registry.register(&mut self.listener, token, ops.to_interest())
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        registry.deregister(&mut self.listener)
    }

    fn on_ready(&mut self, readable: bool, _writable: bool) -> io::Result<()> {
        if !readable {
            return Ok(());
        }
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => (self.on_accept)(stream, peer),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Connected TCP stream with an outbound queue.
pub struct TcpChannel {
    stream: TcpStream,
    read_buf: Box<[u8]>,
    write_queue: VecDeque<Vec<u8>>,
    /// Offset already flushed within the queue head.
    write_offset: usize,
    on_data: DataFn,
}

impl TcpChannel {
    /// Start a non-blocking connect; write readiness signals completion.
    pub fn connect(addr: SocketAddr, on_data: DataFn) -> io::Result<Self> {
        Ok(Self::from_stream(TcpStream::connect(addr)?, on_data))
    }

    /// Wrap an accepted stream.
    pub fn from_stream(stream: TcpStream, on_data: DataFn) -> Self {
        Self {
            stream,
            read_buf: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            write_queue: VecDeque::new(),
            write_offset: 0,
            on_data,
        }
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.peer_addr()
    }

    /// Queue bytes and try to flush immediately.
    pub fn send(&mut self, payload: &[u8]) -> io::Result<()> {
        self.write_queue.push_back(payload.to_vec());
        self.flush_queue()
    }

    /// Bytes queued and not yet written to the socket.
    pub fn queued(&self) -> usize {
        let head_done = self.write_offset;
        self.write_queue
            .iter()
            .map(Vec::len)
            .sum::<usize>()
            .saturating_sub(head_done)
    }

    fn flush_queue(&mut self) -> io::Result<()> {
        while let Some(front) = self.write_queue.front() {
            let remaining = &front[self.write_offset..];
            if remaining.is_empty() {
                self.write_queue.pop_front();
                self.write_offset = 0;
                continue;
            }
            match self.stream.write(remaining) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => self.write_offset += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl Channel for TcpChannel {
    fn register(&mut self, registry: &Registry, token: Token, ops: Ops) -> io::Result<()> {
        registry.register(&mut self.stream, token, ops.to_interest())
    }

    fn deregister(&mut self, registry: &Registry) -> io::Result<()> {
        registry.deregister(&mut self.stream)
    }

    fn on_ready(&mut self, readable: bool, writable: bool) -> io::Result<()> {
        if writable {
            self.flush_queue()?;
        }
        if readable {
            loop {
                match self.stream.read(&mut self.read_buf) {
                    Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
                    Ok(n) => (self.on_data)(&self.read_buf[..n]),
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::selector::Selector;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    #[test]
    fn test_accept_and_exchange() {
        let mut selector = Selector::new().expect("Selector creation should succeed");

        let accepted: Rc<RefCell<Vec<TcpStream>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&accepted);
        let listener = Rc::new(RefCell::new(
            TcpListenerChannel::bind(
                "127.0.0.1:0".parse().expect("Address should parse"),
                Box::new(move |stream, _peer| {
                    sink.borrow_mut().push(stream);
                }),
            )
            .expect("Listener bind should succeed"),
        ));
        let addr = listener
            .borrow()
            .local_addr()
            .expect("Local addr should resolve");
        selector
            .register(listener.clone(), Ops::ACCEPT)
            .expect("Register should succeed");

        let received: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
        let data_sink = Rc::clone(&received);
        let client = Rc::new(RefCell::new(
            TcpChannel::connect(
                addr,
                Box::new(move |data| {
                    data_sink.borrow_mut().extend_from_slice(data);
                }),
            )
            .expect("Connect should start"),
        ));
        selector
            .register(client.clone(), Ops::READ.union(Ops::WRITE).union(Ops::CONNECT))
            .expect("Register should succeed");

        // Drive until the server side accepts.
        for _ in 0..100 {
            selector
                .select(Some(Duration::from_millis(10)))
                .expect("Select should succeed");
            if !accepted.borrow().is_empty() {
                break;
            }
        }
        let server_stream = accepted
            .borrow_mut()
            .pop()
            .expect("Listener should have accepted");
        let server = Rc::new(RefCell::new(TcpChannel::from_stream(
            server_stream,
            Box::new(|_| {}),
        )));
        selector
            .register(server.clone(), Ops::READ.union(Ops::WRITE))
            .expect("Register should succeed");

        server
            .borrow_mut()
            .send(b"hello from server")
            .expect("Send should queue");

        for _ in 0..100 {
            selector
                .select(Some(Duration::from_millis(10)))
                .expect("Select should succeed");
            if !received.borrow().is_empty() {
                break;
            }
        }
        assert_eq!(&*received.borrow(), b"hello from server");
    }
}
