//! Codec for the BGAPI binary command/response/event protocol spoken by
//! wireless radio co-processors over a serial link.
//!
//! # Crate Structure
//!
//! - [`registry`] — Wire constants, field primitives, message tables and result codes
//! - [`frame`] — Command encoder, frame decoder, resynchronizing stream parser and
//!   blocking/async transport adapters
//!
//! ```
//! use bgwire::frame::{IngestBatch, StreamParser};
//!
//! let mut parser = StreamParser::new();
//! match parser.collect(&[0x20, 0x02, 0x1f, 0x04, 0x80, 0x01]) {
//!     IngestBatch::Frames(frames) => assert_eq!(frames[0].name, "rsp_mesh_generic_server_init"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

/// Re-export registry types.
pub mod registry {
    pub use bgwire_registry::*;
}

/// Re-export frame types.
pub mod frame {
    pub use bgwire_frame::*;
}
