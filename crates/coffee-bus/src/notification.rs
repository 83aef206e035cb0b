//! # Notification
//!
//! The envelope handed to every handler: the channel name, a mutable borrow
//! of the caller's body, and a correlation ID when the emit is a query.

use crate::correlation::CorrelationId;

/// A notification in flight on the bus.
///
/// The body is borrowed mutably from the emitter, so any change a handler
/// makes is visible to the emitter once the emit returns.
#[derive(Debug)]
pub struct Notification<'a, P> {
    name: &'a str,
    body: &'a mut P,
    correlation_id: Option<CorrelationId>,
}

impl<'a, P> Notification<'a, P> {
    /// Create a plain notification.
    pub fn new(name: &'a str, body: &'a mut P) -> Self {
        Self {
            name,
            body,
            correlation_id: None,
        }
    }

    /// Create a notification carrying a query's correlation ID.
    pub fn correlated(name: &'a str, body: &'a mut P, correlation_id: CorrelationId) -> Self {
        Self {
            name,
            body,
            correlation_id: Some(correlation_id),
        }
    }

    /// Channel this notification is emitted on.
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn body(&self) -> &P {
        &*self.body
    }

    pub fn body_mut(&mut self) -> &mut P {
        &mut *self.body
    }

    /// Correlation ID, present only for queries.
    pub fn correlation_id(&self) -> Option<CorrelationId> {
        self.correlation_id
    }

    /// True when the emitter awaits handler results.
    pub fn is_query(&self) -> bool {
        self.correlation_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_notification_has_no_correlation() {
        let mut body = 5u32;
        let notification = Notification::new("COUNT", &mut body);

        assert_eq!(notification.name(), "COUNT");
        assert_eq!(*notification.body(), 5);
        assert!(!notification.is_query());
    }

    #[test]
    fn test_body_mut_writes_through() {
        let mut body = String::from("Merlin");
        {
            let mut notification = Notification::new("RENAME", &mut body);
            notification.body_mut().replace_range(.., "Arthur");
        }
        assert_eq!(body, "Arthur");
    }

    #[test]
    fn test_correlated_notification() {
        let mut body = ();
        let id = CorrelationId::new();
        let notification = Notification::correlated("QUERY", &mut body, id);

        assert!(notification.is_query());
        assert_eq!(notification.correlation_id(), Some(id));
    }
}
