//! Transport layer: outgoing socket setup and the ordered sender

pub mod sender;
pub mod socket;

pub use sender::{SendReport, send_spliced};
pub use socket::*;
