use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Location on the bus, an exchange paired with a routing key
///
/// When used for publishing, the routing key is the concrete key attached to the message.
/// When used for queue bindings, it may contain wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    exchange: &'static str,
    routing_key: &'static str,
}

impl Address {
    /// Creates a new instance from raw parts
    pub const fn new(exchange: &'static str, routing_key: &'static str) -> Self {
        Self {
            exchange,
            routing_key,
        }
    }

    /// Exchange the message travels through
    pub fn exchange(&self) -> &'static str {
        self.exchange
    }

    /// Routing key (or binding pattern) within the exchange
    pub fn routing_key(&self) -> &'static str {
        self.routing_key
    }
}

/// Entity to notify other services about an event that took place
pub trait Notification: Serialize + DeserializeOwned + PartialEq + Debug {
    /// Address at which this instance is published
    ///
    /// This is an instance method as some notifications are enums whose variants
    /// carry distinct routing keys.
    fn address(&self) -> Address;
}
