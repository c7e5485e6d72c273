//! Real-time ticket channel contract.
//!
//! # Module Structure
//!
//! - `event`: wire frames and the inbound/outbound event types
//! - `transport`: the transport seam (`ChannelTransport`) and link handles

mod event;
mod transport;

pub use event::{InboundEvent, OutboundEvent, ServerFrame, ServerMessage};
pub use transport::{ChannelLink, ChannelState, ChannelTransport, LinkHandle, TransportEvent};
