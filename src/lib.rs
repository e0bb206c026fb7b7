//! hellopad — deliver an opaque payload inside the Padding extension of a
//! captured TLS ClientHello.
//!
//! The captured record's length fields are grown so that bytes sent right
//! after it are parsed by the peer as Padding data of the same handshake
//! message.

pub mod cli;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod util;

pub use error::{Result, SmuggleError};
pub use session::{SmuggleOutcome, run, smuggle};
