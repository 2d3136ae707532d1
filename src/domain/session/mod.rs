//! Session aggregate and its value objects.

mod aggregate;
mod intelligence;
mod turn;

pub use aggregate::{ChannelMetadata, Session};
pub use intelligence::{IntelCategory, Intelligence};
pub use turn::{Sender, Turn};
