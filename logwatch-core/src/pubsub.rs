use tokio::sync::mpsc;

/// Fan-out channel: every published item is delivered to every live
/// subscriber over its own bounded queue.
///
/// A subscriber only sees items published after its `subscribe` call.
/// `publish` awaits space in each queue in turn, so one full subscriber
/// applies backpressure to the producer without revoking anything already
/// delivered to the others. Subscribers whose receiving half was dropped
/// are pruned during the next publish, so abandoned consumers cannot leak.
pub struct PubSub<T> {
    capacity: usize,
    senders: Vec<mpsc::Sender<T>>,
}

impl<T: Clone> PubSub<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            senders: Vec::new(),
        }
    }

    /// Opens a new bounded subscription; no history is replayed.
    pub fn subscribe(&mut self) -> mpsc::Receiver<T> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.senders.push(tx);
        rx
    }

    pub async fn publish(&mut self, item: T) {
        let mut any_closed = false;
        for sender in &self.senders {
            if sender.send(item.clone()).await.is_err() {
                any_closed = true;
            }
        }
        if any_closed {
            self.senders.retain(|sender| !sender.is_closed());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.senders.len()
    }
}
