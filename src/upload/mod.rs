//! Serial upload: link abstraction, the ready/echo/ack protocol, background workers and port
//! discovery.

pub(crate) mod discovery;
pub(crate) mod link;
pub(crate) mod protocol;
pub(crate) mod sim;
pub(crate) mod worker;
