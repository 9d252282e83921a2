use campus_event_bus::{EventBus, EventBusError, EventReceiverExt};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq)]
struct TaskQueued(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
struct TaskFinished(u64);

#[tokio::test]
async fn broadcast_reaches_every_subscriber() {
    let bus = EventBus::new();
    let mut first = bus.subscribe::<TaskFinished>().unwrap();
    let mut second = bus.subscribe::<TaskFinished>().unwrap();

    assert_eq!(bus.publish(TaskFinished(3)).unwrap(), 2);

    assert_eq!(*first.recv_event().await.unwrap(), TaskFinished(3));
    assert_eq!(*second.recv_event().await.unwrap(), TaskFinished(3));
}

#[tokio::test]
async fn publishing_without_subscribers_is_not_an_error() {
    let bus = EventBus::new();
    assert_eq!(bus.publish(TaskFinished(1)).unwrap(), 0);
}

#[tokio::test]
async fn lagged_receiver_resumes_from_retained_tail() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe_with_capacity::<TaskFinished>(2).unwrap();

    for i in 0..50 {
        bus.publish(TaskFinished(i)).unwrap();
    }

    let first = rx.recv_event().await.unwrap();
    assert!(first.0 >= 48, "expected the retained tail, got {}", first.0);
    let next = rx.recv_event().await.unwrap();
    assert_eq!(next.0, first.0 + 1);
}

#[tokio::test]
async fn queue_preserves_order_for_single_consumer() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe_mpsc::<TaskQueued>(8).unwrap();

    for i in 0..3 {
        bus.publish_mpsc(TaskQueued(i)).unwrap();
    }

    for i in 0..3 {
        assert_eq!(rx.recv_event().await.unwrap().0, i);
    }
}

#[tokio::test]
async fn queue_accepts_work_before_consumer_attaches() {
    let bus = EventBus::new();
    bus.publish_mpsc(TaskQueued(9)).unwrap();

    let mut rx = bus.subscribe_mpsc::<TaskQueued>(8).unwrap();
    assert_eq!(rx.recv_event().await.unwrap().0, 9);
}

#[tokio::test]
async fn queue_receiver_is_handed_out_once() {
    let bus = EventBus::new();
    let _rx = bus.subscribe_mpsc::<TaskQueued>(1).unwrap();

    let second = bus.subscribe_mpsc::<TaskQueued>(1);
    assert!(matches!(second, Err(EventBusError::ReceiverTaken { .. })));
}

#[tokio::test]
async fn full_queue_rejects_without_blocking() {
    let bus = EventBus::new();
    let _rx = bus.subscribe_mpsc::<TaskQueued>(1).unwrap();

    bus.publish_mpsc(TaskQueued(1)).unwrap();
    let overflow = bus.publish_mpsc(TaskQueued(2));
    assert!(matches!(overflow, Err(EventBusError::ChannelFull { .. })));
}

#[tokio::test]
async fn sender_handle_waits_for_capacity() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe_mpsc::<TaskQueued>(1).unwrap();
    let tx = bus.mpsc_sender::<TaskQueued>().unwrap();

    tx.send(Arc::new(TaskQueued(1))).await.unwrap();
    let pending = tokio::spawn(async move { tx.send(Arc::new(TaskQueued(2))).await.is_ok() });

    assert_eq!(rx.recv_event().await.unwrap().0, 1);
    assert!(pending.await.unwrap());
    assert_eq!(rx.recv_event().await.unwrap().0, 2);
}

#[tokio::test]
async fn a_type_keeps_its_channel_kind() {
    let bus = EventBus::new();
    let _rx = bus.subscribe::<TaskFinished>().unwrap();

    let queue = bus.subscribe_mpsc::<TaskFinished>(4);
    assert!(matches!(queue, Err(EventBusError::ChannelKindMismatch { .. })));

    let _queue = bus.subscribe_mpsc::<TaskQueued>(4).unwrap();
    let topic = bus.publish(TaskQueued(1));
    assert!(matches!(topic, Err(EventBusError::ChannelKindMismatch { .. })));
}

#[tokio::test]
async fn shutdown_closes_broadcast_receivers() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<TaskFinished>().unwrap();

    assert_eq!(bus.shutdown(), 1);
    assert!(rx.recv_event().await.is_none());
}

#[tokio::test]
async fn zero_capacity_is_rejected() {
    let bus = EventBus::new();

    let topic = bus.subscribe_with_capacity::<TaskFinished>(0);
    assert!(matches!(topic, Err(EventBusError::InvalidCapacity { .. })));

    let queue = bus.subscribe_mpsc::<TaskQueued>(0);
    assert!(matches!(queue, Err(EventBusError::InvalidCapacity { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_publishers_deliver_everything() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe_with_capacity::<TaskFinished>(256).unwrap();

    let handles: Vec<_> = (0..2u64)
        .map(|half| {
            let bus = bus.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    bus.publish(TaskFinished(half * 50 + i)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let mut received = 0;
    while tokio::time::timeout(Duration::from_millis(100), rx.recv_event()).await.is_ok() {
        received += 1;
    }
    assert_eq!(received, 100);
}

#[tokio::test]
async fn producer_can_size_the_queue_first() {
    let bus = EventBus::new();
    let tx = bus.mpsc_sender_with_capacity::<TaskQueued>(2).unwrap();
    let _rx = bus.subscribe_mpsc::<TaskQueued>(64).unwrap();

    tx.try_send(Arc::new(TaskQueued(1))).unwrap();
    tx.try_send(Arc::new(TaskQueued(2))).unwrap();
    assert!(tx.try_send(Arc::new(TaskQueued(3))).is_err());
}
