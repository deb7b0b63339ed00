use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};
use wimod_frame::{Frame, FrameConfig, FrameWriter, ReceiveAssembler, ReceiveStats};
use wimod_transport::{LinkStream, TransportError};

use crate::dispatch::{DispatchRegistry, EntryId};
use crate::error::{HciError, Result};
use crate::waiter::PendingWaiter;

/// Default time allowed for writing one request frame.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(3);

/// Default poll interval of the receive thread.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Session behavior configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Write timeout applied to the link's write half.
    pub write_timeout: Option<Duration>,
    /// Read timeout applied to the link's read half. The receive thread
    /// checks for shutdown at this interval.
    pub read_timeout: Option<Duration>,
    /// Bytes requested from the link per read.
    pub read_chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            write_timeout: Some(DEFAULT_WRITE_TIMEOUT),
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            read_chunk_size: 256,
        }
    }
}

/// Request/response access to one HCI link.
///
/// `&Session` may be shared between threads. Sends are serialized so two
/// callers never interleave frame bytes; waiting happens outside that lock.
pub struct Session<W> {
    registry: Arc<DispatchRegistry>,
    writer: Mutex<FrameWriter<W>>,
}

impl<W: Write> Session<W> {
    /// Create a session writing to `inner` and matching responses in `registry`.
    pub fn new(inner: W, registry: Arc<DispatchRegistry>) -> Self {
        Self::from_writer(FrameWriter::new(inner), registry)
    }

    pub fn from_writer(writer: FrameWriter<W>, registry: Arc<DispatchRegistry>) -> Self {
        Self {
            registry,
            writer: Mutex::new(writer),
        }
    }

    /// Send one frame without waiting for anything.
    pub fn send(&self, frame: &Frame) -> Result<()> {
        self.lock_writer().write_frame(frame)?;
        Ok(())
    }

    /// Send `request` and wait up to `timeout` for a frame matching `response`.
    ///
    /// Returns the response payload. A failed write is returned immediately.
    /// The waiter is always unregistered before this returns.
    pub fn request(&self, request: &Frame, response: (u8, u8), timeout: Duration) -> Result<Bytes> {
        let (dst_id, msg_id) = response;
        let waiter = Arc::new(PendingWaiter::new());
        let slot = Arc::clone(&waiter);
        let registration = Registration {
            registry: &self.registry,
            id: self.registry.register(dst_id, msg_id, move |payload| {
                slot.complete(payload);
            }),
        };

        if let Err(err) = self.send(request) {
            debug!(
                dst_id = request.dst_id,
                msg_id = request.msg_id,
                error = %err,
                "request write failed"
            );
            return Err(err);
        }

        let outcome = waiter.wait_timeout(timeout);
        drop(registration);

        match outcome {
            Some(payload) => Ok(payload),
            None => {
                debug!(dst_id, msg_id, ?timeout, "request timed out");
                Err(HciError::Timeout(timeout))
            }
        }
    }

    /// Registry shared with this session's receive path.
    pub fn registry(&self) -> &Arc<DispatchRegistry> {
        &self.registry
    }

    /// Consume the session and return the write half.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_inner()
    }

    fn lock_writer(&self) -> MutexGuard<'_, FrameWriter<W>> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Session<LinkStream> {
    /// Split `stream` into halves, start the receive thread and return the session.
    pub fn open(stream: LinkStream, config: SessionConfig) -> Result<(Self, ReceiverHandle)> {
        let mut reader_stream = stream.try_clone()?;
        reader_stream.set_read_timeout(config.read_timeout)?;

        let frame_config = FrameConfig {
            write_timeout: config.write_timeout,
            ..FrameConfig::default()
        };
        let writer = FrameWriter::with_config_link(stream, frame_config)?;

        let registry = Arc::new(DispatchRegistry::new());
        let receiver = Receiver::new(Arc::clone(&registry));
        let handle = spawn_receiver(reader_stream, receiver, config.read_chunk_size)?;

        info!(
            transport = writer.get_ref().transport_name(),
            "hci session opened"
        );
        Ok((Self::from_writer(writer, registry), handle))
    }
}

struct Registration<'a> {
    registry: &'a DispatchRegistry,
    id: EntryId,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}

/// Receive path for one link: reassembles frames and dispatches them.
#[derive(Debug)]
pub struct Receiver {
    assembler: ReceiveAssembler,
    registry: Arc<DispatchRegistry>,
}

impl Receiver {
    pub fn new(registry: Arc<DispatchRegistry>) -> Self {
        Self {
            assembler: ReceiveAssembler::new(),
            registry,
        }
    }

    /// Feed one chunk of link bytes. Returns the number consumed.
    pub fn receive_buf(&mut self, chunk: &[u8]) -> usize {
        let registry = &self.registry;
        self.assembler.receive(chunk, |frame| {
            registry.dispatch(frame.dst_id, frame.msg_id, &frame.payload);
        })
    }

    /// Feed a whole buffer, re-presenting any unconsumed tail.
    pub fn receive_all(&mut self, mut chunk: &[u8]) {
        while !chunk.is_empty() {
            let consumed = self.receive_buf(chunk);
            if consumed == 0 {
                break;
            }
            chunk = &chunk[consumed..];
        }
    }

    pub fn stats(&self) -> ReceiveStats {
        self.assembler.stats()
    }
}

/// Handle to a running receive thread.
#[derive(Debug)]
pub struct ReceiverHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<ReceiveStats>>,
}

impl ReceiverHandle {
    /// Ask the thread to stop, wait for it and return its final counters.
    ///
    /// The thread notices the request at its next read timeout, or at EOF.
    pub fn shutdown(mut self) -> ReceiveStats {
        self.stop.store(true, Ordering::SeqCst);
        self.thread
            .take()
            .and_then(|thread| thread.join().ok())
            .unwrap_or_default()
    }

    /// True once the receive thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for ReceiverHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Run `receiver` on a dedicated thread reading from `reader`.
///
/// The thread exits on EOF, on a read error other than a timeout, or after
/// [`ReceiverHandle::shutdown`].
pub fn spawn_receiver<R>(mut reader: R, mut receiver: Receiver, chunk_size: usize) -> Result<ReceiverHandle>
where
    R: Read + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = Arc::clone(&stop);
    let mut chunk = vec![0u8; chunk_size.max(1)];

    let thread = thread::Builder::new()
        .name("wimod-rx".to_string())
        .spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                match reader.read(&mut chunk) {
                    Ok(0) => {
                        info!("link closed; receive thread exiting");
                        break;
                    }
                    Ok(n) => receiver.receive_all(&chunk[..n]),
                    Err(err)
                        if matches!(
                            err.kind(),
                            ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                        ) => {}
                    Err(err) => {
                        warn!(error = %err, "link read failed; receive thread exiting");
                        break;
                    }
                }
            }
            let stats = receiver.stats();
            debug!(?stats, "receive thread stopped");
            stats
        })
        .map_err(TransportError::from)?;

    Ok(ReceiverHandle {
        stop,
        thread: Some(thread),
    })
}
