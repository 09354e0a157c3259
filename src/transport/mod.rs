//! Frame delivery to the remote collector.
//!
//! The wire protocol is deliberately minimal: one TCP connection per frame,
//! payload is exactly the bytes of the JPEG-encoded frame, and the receiver
//! infers end-of-image from the connection close. There is no length prefix,
//! no framing, and no acknowledgement, which also means connections cannot
//! be reused.

mod tcp;

pub use tcp::{TcpUploader, UploadConfig};
