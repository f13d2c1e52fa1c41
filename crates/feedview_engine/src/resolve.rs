use feedview_logging::feed_trace;
use url::Url;

/// Resolves `reference` against `base`, best effort.
///
/// Empty, scheme-qualified and protocol-relative references come back as-is,
/// as does anything that fails to parse.
pub fn resolve_url(base: Option<&str>, reference: &str) -> String {
    if reference.is_empty() || has_scheme(reference) || reference.starts_with("//") {
        return reference.to_string();
    }
    let Some(base) = base.map(str::trim).filter(|b| !b.is_empty()) else {
        return reference.to_string();
    };
    match Url::parse(base).and_then(|base| base.join(reference)) {
        Ok(url) => url.into(),
        Err(err) => {
            feed_trace!("could not resolve {reference:?} against {base:?}: {err}");
            reference.to_string()
        }
    }
}

/// `scheme ":"` where scheme is `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
pub(crate) fn has_scheme(reference: &str) -> bool {
    let Some((scheme, _)) = reference.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

pub(crate) fn is_javascript_url(reference: &str) -> bool {
    reference
        .trim_start()
        .get(..11)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("javascript:"))
}
