//! Tolerant decoding of semi-structured remote payloads.
//!
//! Every field access is optional: absence or a type mismatch leaves the
//! entity default in place instead of failing the record, and a bad element
//! never discards its siblings. The one exception is an agreement's own
//! start/end dates, which are mandatory; an agreement missing either is
//! skipped and reported as a [`DecodeError`].

pub mod agreement;
pub mod plan;
pub mod reference;
pub mod value;

pub use agreement::decode_agreements;
pub use reference::decode_reference;

/// A per-record decode anomaly. Collected and logged, never fatal to the
/// batch.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    #[error("agreement {agreement_id:?} missing mandatory field {field}")]
    MissingField {
        agreement_id: String,
        field: &'static str,
    },
}
