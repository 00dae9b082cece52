//! Message registry, wire constants and field codecs for the BGAPI serial protocol.
//!
//! This crate is pure reference data plus the primitives the per-message
//! routines are built from:
//! - [`defs`] — header layout, type tags, class ids and the name-prefix table
//! - [`field`] — bounds-checked little-endian field access and length-prefixed fields
//! - [`registry`] — `(class, id)` and command-name lookup of message descriptors
//! - [`result_codes`] — 16-bit result code names

mod args;
mod builtin;
pub mod defs;
mod descriptor;
pub mod error;
pub mod field;
pub mod registry;
pub mod result_codes;
mod value;

pub use args::{Arg, Args};
pub use defs::{class, MessageKind, COMMAND_TAG, EVENT_TAG, HEADER_SIZE, RESPONSE_TAG};
pub use descriptor::{CommandDescriptor, DecodeFn, EncodeFn, MessageDescriptor, PayloadDecode};
pub use error::{EncodeError, FieldError};
pub use registry::{MessageKey, Registry};
pub use result_codes::lookup_error_name;
pub use value::{Fields, Value};
