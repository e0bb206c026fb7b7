//! TLS ClientHello parsing and rewriting

pub mod client_hello;
pub mod codec;
pub mod constants;
pub mod record;
pub mod splice;

#[cfg(test)]
pub(crate) mod test_vectors;

pub use client_hello::{ClientHelloInfo, ExtensionEntry, find_padding_extension, locate_extensions};
pub use record::RecordHeader;
pub use splice::{
    PaddingEdit, SpliceMode, SplicePlan, plan_splice, splice_in_place, splice_payload, splice_to_vec,
};
