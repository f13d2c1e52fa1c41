use std::collections::HashSet;

use feedview_core::MediaAttachment;
use feedview_logging::{feed_debug, loggable_url};

use crate::canonical::{canonical_key, CanonicalKey};
use crate::resolve::resolve_url;

/// Keeps the attachments not already shown inline, in input order.
///
/// `inline_keys` holds the canonical keys of every surviving inline image and
/// audio/video source of the same document.
pub fn reconcile_attachments(
    attachments: &[MediaAttachment],
    inline_keys: &HashSet<CanonicalKey>,
    base_url: Option<&str>,
) -> Vec<MediaAttachment> {
    attachments
        .iter()
        .filter(|attachment| {
            let url = attachment.url.trim();
            if url.is_empty() {
                return false;
            }
            let key = canonical_key(&resolve_url(base_url, url));
            let shown_inline = inline_keys.contains(&key);
            if shown_inline {
                feed_debug!(
                    "attachment {} already shown inline",
                    loggable_url(&attachment.url)
                );
            }
            !shown_inline
        })
        .cloned()
        .collect()
}
