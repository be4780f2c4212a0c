//! Check-in submission
//!
//! Turns one decoded QR payload into exactly one `POST` against the
//! attendance server and collapses every transport problem into a value the
//! scan loop can render.

pub mod client;
pub mod error;
pub mod model;

pub use client::{CheckinClient, HttpCheckinClient, DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT};
pub use error::TransportError;
pub use model::{CheckinOutcome, CheckinReceipt, CheckinRequest, CheckinResponse, ScanPayload};
