use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{trace, warn};

/// Default buffer for broadcast topics and work queues.
pub const DEFAULT_CAPACITY: usize = 128;

/// Supported channel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Fan-out: every subscriber sees every event.
    Broadcast { capacity: usize },
    /// Work queue: a single consumer drains events in order.
    Mpsc { capacity: usize },
}

impl ChannelKind {
    const fn capacity(self) -> usize {
        match self {
            Self::Broadcast { capacity } | Self::Mpsc { capacity } => capacity,
        }
    }

    const fn same_kind(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Broadcast { .. }, Self::Broadcast { .. }) | (Self::Mpsc { .. }, Self::Mpsc { .. })
        )
    }
}

/// Marker trait for types that can travel over the [`EventBus`].
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

/// Type-erased channel registered for one event type.
#[derive(Debug)]
struct Channel {
    kind: ChannelKind,
    /// `broadcast::Sender<Arc<T>>` or `mpsc::Sender<Arc<T>>`.
    sender: Box<dyn Any + Send + Sync>,
    /// `mpsc::Receiver<Arc<T>>` until a consumer takes it.
    receiver: Option<Box<dyn Any + Send + Sync>>,
}

impl Channel {
    fn broadcast<T: Event>(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel::<Arc<T>>(capacity);
        Self { kind: ChannelKind::Broadcast { capacity }, sender: Box::new(tx), receiver: None }
    }

    fn mpsc<T: Event>(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel::<Arc<T>>(capacity);
        Self {
            kind: ChannelKind::Mpsc { capacity },
            sender: Box::new(tx),
            receiver: Some(Box::new(rx)),
        }
    }

    fn sender<S: Clone + 'static>(&self) -> Result<S, EventBusError> {
        self.sender.downcast_ref::<S>().cloned().ok_or_else(|| EventBusError::TypeMismatch {
            message: type_name::<S>().into(),
            context: Some("Unexpected sender type".into()),
        })
    }
}

/// Thread-safe, typed event bus.
///
/// Channels are keyed by the [`TypeId`] of the event and created lazily by the
/// first publisher or subscriber. A type is bound to one [`ChannelKind`] for
/// the lifetime of the bus.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, Channel>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to broadcast events of type `T` with the default capacity.
    ///
    /// # Errors
    /// [`EventBusError::ChannelKindMismatch`] if `T` is already used as a queue.
    ///
    /// ```rust
    /// use campus_event_bus::{EventBus, EventReceiverExt};
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct CertificateIssued(u64);
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), campus_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let mut rx = bus.subscribe::<CertificateIssued>()?;
    /// bus.publish(CertificateIssued(7))?;
    /// assert_eq!(rx.recv_event().await.unwrap().0, 7);
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes with an explicit broadcast capacity. The capacity only
    /// applies when this call creates the channel.
    ///
    /// # Errors
    /// [`EventBusError::InvalidCapacity`] for zero, or a kind mismatch.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        let sender = self.broadcast_sender::<T>(validate_capacity(capacity)?)?;
        Ok(sender.subscribe())
    }

    /// Publishes `event` to every current broadcast subscriber.
    ///
    /// Returns the number of subscribers reached; zero is not an error.
    ///
    /// # Errors
    /// [`EventBusError::ChannelKindMismatch`] if `T` is already used as a queue.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Same as [`EventBus::publish`] without re-wrapping a shared event.
    ///
    /// # Errors
    /// [`EventBusError::ChannelKindMismatch`] if `T` is already used as a queue.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.broadcast_sender::<T>(DEFAULT_CAPACITY)?;
        let delivered = sender.send(event).unwrap_or(0);
        trace!(event = type_name::<T>(), delivered, "Event dispatched");
        Ok(delivered)
    }

    /// Takes the single consumer end of the work queue for `T`.
    ///
    /// # Errors
    /// [`EventBusError::ReceiverTaken`] if another consumer already owns it,
    /// [`EventBusError::InvalidCapacity`] for zero, or a kind mismatch.
    ///
    /// ```rust
    /// use campus_event_bus::EventBus;
    ///
    /// #[derive(Debug)]
    /// struct Job(u64);
    ///
    /// # fn main() -> Result<(), campus_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let mut rx = bus.subscribe_mpsc::<Job>(8)?;
    /// bus.publish_mpsc(Job(1))?;
    /// assert_eq!(rx.try_recv().unwrap().0, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe_mpsc<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<mpsc::Receiver<Arc<T>>, EventBusError> {
        let capacity = validate_capacity(capacity)?;
        let mut channels = self.channels.write();
        let channel = channels.entry(TypeId::of::<T>()).or_insert_with(|| {
            trace!(event = type_name::<T>(), capacity, "Initializing work queue");
            Channel::mpsc::<T>(capacity)
        });
        ensure_kind::<T>(channel, ChannelKind::Mpsc { capacity })?;

        let receiver = channel.receiver.take().ok_or_else(|| EventBusError::ReceiverTaken {
            message: type_name::<T>().into(),
            context: None,
        })?;
        receiver.downcast::<mpsc::Receiver<Arc<T>>>().map(|rx| *rx).map_err(|_| {
            EventBusError::TypeMismatch {
                message: type_name::<T>().into(),
                context: Some("Unexpected receiver type".into()),
            }
        })
    }

    /// Producer end of the work queue for `T`, for callers that want to await
    /// free capacity instead of failing fast.
    ///
    /// # Errors
    /// [`EventBusError::ChannelKindMismatch`] if `T` is already used for broadcast.
    pub fn mpsc_sender<T: Event>(&self) -> Result<mpsc::Sender<Arc<T>>, EventBusError> {
        self.mpsc_sender_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Like [`EventBus::mpsc_sender`], sizing the queue when this call
    /// creates it.
    ///
    /// # Errors
    /// [`EventBusError::InvalidCapacity`] for zero, or a kind mismatch.
    pub fn mpsc_sender_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<mpsc::Sender<Arc<T>>, EventBusError> {
        let wanted = ChannelKind::Mpsc { capacity: validate_capacity(capacity)? };
        if let Some(channel) = self.channels.read().get(&TypeId::of::<T>()) {
            ensure_kind::<T>(channel, wanted)?;
            return channel.sender();
        }

        let mut channels = self.channels.write();
        let channel = channels.entry(TypeId::of::<T>()).or_insert_with(|| {
            trace!(event = type_name::<T>(), capacity, "Initializing work queue");
            Channel::mpsc::<T>(capacity)
        });
        ensure_kind::<T>(channel, wanted)?;
        channel.sender()
    }

    /// Enqueues `event` without waiting.
    ///
    /// # Errors
    /// [`EventBusError::ChannelFull`] when the queue is at capacity or its
    /// consumer is gone, or a kind mismatch.
    pub fn publish_mpsc<T: Event>(&self, event: T) -> Result<(), EventBusError> {
        self.mpsc_sender::<T>()?.try_send(Arc::new(event)).map_err(|e| {
            EventBusError::ChannelFull {
                message: e.to_string().into(),
                context: Some(type_name::<T>().into()),
            }
        })
    }

    /// Drops every channel. Receivers observe closure once all outstanding
    /// senders are gone. Returns the number of channels removed.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn broadcast_sender<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        let wanted = ChannelKind::Broadcast { capacity };
        if let Some(channel) = self.channels.read().get(&TypeId::of::<T>()) {
            ensure_kind::<T>(channel, wanted)?;
            return channel.sender();
        }

        let mut channels = self.channels.write();
        let channel = channels.entry(TypeId::of::<T>()).or_insert_with(|| {
            trace!(event = type_name::<T>(), capacity, "Initializing broadcast channel");
            Channel::broadcast::<T>(capacity)
        });
        ensure_kind::<T>(channel, wanted)?;
        channel.sender()
    }
}

fn ensure_kind<T: Event>(channel: &Channel, wanted: ChannelKind) -> Result<(), EventBusError> {
    if !channel.kind.same_kind(wanted) {
        return Err(EventBusError::ChannelKindMismatch {
            message: format!(
                "Expected {wanted:?} but found {:?} for {}",
                channel.kind,
                type_name::<T>()
            )
            .into(),
            context: None,
        });
    }
    if channel.kind.capacity() != wanted.capacity() {
        trace!(
            event = type_name::<T>(),
            existing = channel.kind.capacity(),
            requested = wanted.capacity(),
            "Channel already initialized with a different capacity"
        );
    }
    Ok(())
}

fn validate_capacity(capacity: usize) -> Result<usize, EventBusError> {
    if capacity == 0 {
        warn!("Rejected zero-capacity channel request");
        return Err(EventBusError::InvalidCapacity {
            message: "capacity must be >= 1".into(),
            context: None,
        });
    }
    Ok(capacity)
}
