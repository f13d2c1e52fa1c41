use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Trailing `-{width}x{height}` in a file stem, as emitted by responsive image rewriters.
static SIZE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+x\d+$").expect("size suffix pattern"));

/// Normalized URL used only for "same visual asset" comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips fragment, query and rescaled-size suffixes from an absolute URL.
///
/// Unparsable input is returned unchanged so dedup degrades to exact matching.
pub fn canonical_key(url: &str) -> CanonicalKey {
    let Ok(mut parsed) = Url::parse(url) else {
        return CanonicalKey(url.to_string());
    };
    parsed.set_fragment(None);
    parsed.set_query(None);
    if !parsed.cannot_be_a_base() {
        if let Some(path) = strip_size_suffix(parsed.path()) {
            parsed.set_path(&path);
        }
    }
    CanonicalKey(parsed.into())
}

fn strip_size_suffix(path: &str) -> Option<String> {
    let (dir, file) = path.rsplit_once('/')?;
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    let mut stripped = stem;
    while let Some(found) = SIZE_SUFFIX.find(stripped) {
        if found.start() == 0 {
            break;
        }
        stripped = &stripped[..found.start()];
    }
    (stripped.len() != stem.len()).then(|| format!("{dir}/{stripped}.{ext}"))
}
