use std::fmt;

use crate::source::{is_vector_type, is_vector_url};

/// Substrings of src/alt/class/id that mark an image as page chrome.
const DECORATIVE_KEYWORDS: [&str; 7] = [
    "avatar", "author", "profile", "headshot", "logo", "icon", "badge",
];

/// Substrings of the source URL that mark an image as a tracker or spacer.
const TRACKING_MARKERS: [&str; 12] = [
    "pixel",
    "beacon",
    "track",
    "analytics",
    "stat",
    "count",
    "impression",
    "spacer",
    "blank.gif",
    "clear.gif",
    "1x1",
    "1px",
];

pub const MAX_PIXEL_SIDE: u32 = 5;
pub const MIN_AREA: u64 = 10_000;
pub const MIN_WIDTH: u32 = 80;
pub const MIN_HEIGHT: u32 = 50;

/// What the filter knows about an image besides its rendered size.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageFacts {
    /// Resolved effective source.
    pub src: String,
    pub alt: String,
    pub class: String,
    pub id: String,
    pub declared_width: Option<u32>,
    pub declared_height: Option<u32>,
    /// Declared MIME type, when the markup states one.
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingSource,
    Decorative,
    TrackingPixel,
    TooSmall,
    Vector,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingSource => write!(f, "no usable source"),
            DropReason::Decorative => write!(f, "decorative keyword"),
            DropReason::TrackingPixel => write!(f, "tracking pixel"),
            DropReason::TooSmall => write!(f, "below size threshold"),
            DropReason::Vector => write!(f, "vector image in strict mode"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Keep,
    Drop(DropReason),
}

impl Admission {
    pub fn is_kept(self) -> bool {
        matches!(self, Admission::Keep)
    }
}

/// Keep/drop policy. `strict` also removes vector images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdmissionPolicy {
    pub strict: bool,
}

impl AdmissionPolicy {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// Decision from declared attributes only, before any image has loaded.
    pub fn admit_eager(&self, image: &ImageFacts) -> Admission {
        self.decide(image, None)
    }

    /// Re-applies the decision once the rendered size is known.
    ///
    /// Anything the eager pass drops stays dropped.
    pub fn admit_post_load(
        &self,
        image: &ImageFacts,
        observed_width: u32,
        observed_height: u32,
    ) -> Admission {
        match self.admit_eager(image) {
            Admission::Keep => self.decide(image, Some((observed_width, observed_height))),
            dropped => dropped,
        }
    }

    fn decide(&self, image: &ImageFacts, observed: Option<(u32, u32)>) -> Admission {
        if image.src.trim().is_empty() {
            return Admission::Drop(DropReason::MissingSource);
        }
        if is_decorative(image) {
            return Admission::Drop(DropReason::Decorative);
        }
        if is_tracking_pixel(image, observed) {
            return Admission::Drop(DropReason::TrackingPixel);
        }
        if is_too_small(image, observed) {
            return Admission::Drop(DropReason::TooSmall);
        }
        if self.strict && is_vector(image) {
            return Admission::Drop(DropReason::Vector);
        }
        Admission::Keep
    }
}

fn is_decorative(image: &ImageFacts) -> bool {
    let haystack = format!(
        "{} {} {} {}",
        image.src, image.alt, image.class, image.id
    )
    .to_lowercase();
    DECORATIVE_KEYWORDS
        .iter()
        .any(|keyword| haystack.contains(keyword))
}

fn is_tracking_pixel(image: &ImageFacts, observed: Option<(u32, u32)>) -> bool {
    let (width, height) = match observed {
        Some((width, height)) => (Some(width), Some(height)),
        None => (image.declared_width, image.declared_height),
    };
    if let (Some(width), Some(height)) = (width, height) {
        if width <= MAX_PIXEL_SIDE && height <= MAX_PIXEL_SIDE {
            return true;
        }
    }
    let src = image.src.to_lowercase();
    TRACKING_MARKERS.iter().any(|marker| src.contains(marker))
}

fn is_too_small(image: &ImageFacts, observed: Option<(u32, u32)>) -> bool {
    match observed {
        Some((observed_width, observed_height)) => {
            let width = image.declared_width.unwrap_or(0).max(observed_width);
            let height = image.declared_height.unwrap_or(0).max(observed_height);
            width > 0
                && height > 0
                && (u64::from(width) * u64::from(height) < MIN_AREA
                    || width < MIN_WIDTH
                    || height < MIN_HEIGHT)
        }
        // Unconfirmed sizes only get the per-side floors.
        None => {
            image
                .declared_width
                .is_some_and(|width| width > 0 && width < MIN_WIDTH)
                || image
                    .declared_height
                    .is_some_and(|height| height > 0 && height < MIN_HEIGHT)
        }
    }
}

fn is_vector(image: &ImageFacts) -> bool {
    is_vector_url(&image.src) || image.media_type.as_deref().is_some_and(is_vector_type)
}

/// Parses a `width`/`height` attribute such as `640`, `640px` or `640.5`.
pub fn parse_dimension(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let number = trimmed
        .strip_suffix("px")
        .or_else(|| trimmed.strip_suffix("PX"))
        .unwrap_or(trimmed)
        .trim();
    if let Ok(value) = number.parse::<u32>() {
        return Some(value);
    }
    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0 && *value <= f64::from(u32::MAX))
        .map(|value| value as u32)
}
