//! Résumé feedback normalization. The model call that produces the raw
//! feedback lives outside this service; only the reshaping happens here.

pub mod handlers;
pub mod normalize;

pub use normalize::normalize_feedback;
