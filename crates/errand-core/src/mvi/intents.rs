use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::trace;

pub(crate) enum Envelope<I> {
    Intent(I),
    Barrier(oneshot::Sender<()>),
}

/// Intent source owned by a view. At most one presenter is subscribed at a
/// time; intents published while nobody is subscribed are dropped.
pub struct Intents<I> {
    slot: Mutex<Slot<I>>,
}

struct Slot<I> {
    next_id: u64,
    subscriber: Option<(u64, mpsc::UnboundedSender<Envelope<I>>)>,
}

impl<I> Default for Intents<I> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(Slot {
                next_id: 0,
                subscriber: None,
            }),
        }
    }
}

impl<I: Send + 'static> Intents<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, intent: I) -> bool {
        let delivered = self.send(Envelope::Intent(intent));
        if !delivered {
            trace!("no presenter subscribed; intent dropped");
        }
        delivered
    }

    /// Resolves once every intent published before this call has been
    /// handled. Returns false when no presenter is subscribed.
    pub async fn settled(&self) -> bool {
        let (ack, done) = oneshot::channel();
        if !self.send(Envelope::Barrier(ack)) {
            return false;
        }
        done.await.is_ok()
    }

    pub fn is_subscribed(&self) -> bool {
        self.slot
            .lock()
            .subscriber
            .as_ref()
            .is_some_and(|(_, sender)| !sender.is_closed())
    }

    /// Replaces any current subscriber; the older subscription then sees
    /// its source close.
    pub fn subscribe(&self) -> Subscription<I> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut slot = self.slot.lock();
        let id = slot.next_id;
        slot.next_id += 1;
        if slot.subscriber.replace((id, sender)).is_some() {
            trace!(subscription = id, "replacing previous intent subscription");
        }
        Subscription { id, receiver }
    }

    /// Clears the slot only while `subscription` is still the current
    /// subscriber. Returns whether it was.
    pub fn unsubscribe(&self, subscription: &Subscription<I>) -> bool {
        let mut slot = self.slot.lock();
        let current = slot.subscriber.as_ref().map(|(id, _)| *id);
        if current != Some(subscription.id) {
            trace!(subscription = subscription.id, "subscription already replaced");
            return false;
        }
        slot.subscriber = None;
        true
    }

    fn send(&self, envelope: Envelope<I>) -> bool {
        let slot = self.slot.lock();
        match slot.subscriber.as_ref() {
            Some((_, sender)) => sender.send(envelope).is_ok(),
            None => false,
        }
    }
}

pub struct Subscription<I> {
    id: u64,
    receiver: mpsc::UnboundedReceiver<Envelope<I>>,
}

impl<I> Subscription<I> {
    pub(crate) async fn next(&mut self) -> Option<Envelope<I>> {
        self.receiver.recv().await
    }
}
