//! Event bus port: publish/subscribe for thing events.

use smarthome_domain::event::Event;

/// Publishes thing events to interested subscribers.
///
/// Publishing is synchronous: handler callbacks run on whatever thread
/// delivered the triggering event and must never block on subscribers.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event);
}

impl<T: EventPublisher + ?Sized> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) {
        (**self).publish(event);
    }
}
