//! Feedview engine: content normalization pipeline and fetch effect execution.
mod admission;
mod canonical;
mod engine;
mod normalize;
mod reconcile;
mod resolve;
mod service;
mod source;

pub use admission::{
    parse_dimension, Admission, AdmissionPolicy, DropReason, ImageFacts, MAX_PIXEL_SIDE,
    MIN_AREA, MIN_HEIGHT, MIN_WIDTH,
};
pub use canonical::{canonical_key, CanonicalKey};
pub use engine::{EngineEvent, EngineHandle};
pub use normalize::{normalize, normalize_request, ImageId, InlineImage, NormalizedDocument};
pub use reconcile::reconcile_attachments;
pub use resolve::resolve_url;
pub use service::{ContentService, HttpContentService, ServiceError, ServiceSettings};
pub use source::{
    parse_srcset, select_source, ImageCandidate, SourceVariant, SrcsetEntry,
    LAZY_SOURCE_ATTRIBUTES,
};
