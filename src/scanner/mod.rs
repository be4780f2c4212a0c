//! QR scanner adapters
//!
//! A scanner owns its input device and hands out decoded payloads one at a
//! time. The scan loop pauses it for the duration of a check-in cycle.

pub mod error;
pub mod line;
pub mod traits;

pub use error::ScannerError;
pub use line::{InputKind, LineScanner, ScanSource};
pub use traits::QrScanner;
