use std::collections::{HashMap, HashSet};

use ego_tree::{NodeId, NodeRef};
use feedview_core::{DocumentRequest, MediaAttachment};
use feedview_logging::{feed_debug, loggable_url};
use html5ever::{LocalName, Namespace, QualName};
use scraper::node::{Element, Node};
use scraper::{ElementRef, Html, StrTendril};

use crate::admission::{parse_dimension, Admission, AdmissionPolicy, ImageFacts};
use crate::canonical::{canonical_key, CanonicalKey};
use crate::reconcile::reconcile_attachments;
use crate::resolve::{is_javascript_url, resolve_url};
use crate::source::{select_source, ImageCandidate, SourceVariant, LAZY_SOURCE_ATTRIBUTES};

/// Elements removed together with their content.
const STRIPPED_ELEMENTS: [&str; 4] = ["script", "style", "template", "noscript"];

/// Attributes carrying a single URL that must be absolute in the output.
const URL_ATTRIBUTES: [&str; 4] = ["href", "src", "poster", "cite"];

/// Media attributes whose URL counts as shown inline.
const MEDIA_KEY_ATTRIBUTES: [&str; 2] = ["src", "poster"];

/// Image attributes superseded by the selected `src`.
const SOURCE_SELECTION_ATTRIBUTES: [&str; 3] = ["srcset", "sizes", "data-srcset"];

type RewrittenAttributes = Vec<(QualName, String)>;

/// Handle to an inline image, valid for the document it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(NodeId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub id: ImageId,
    pub facts: ImageFacts,
    pub admission: Admission,
    /// The `<img>` itself, or its `<picture>` when it has one.
    removal_target: NodeId,
    post_load_applied: bool,
}

/// Result of one normalization run. Owns its edited tree so the post-load
/// admission pass can drop images after the first render.
#[derive(Debug, Clone)]
pub struct NormalizedDocument {
    tree: Html,
    policy: AdmissionPolicy,
    images: Vec<InlineImage>,
    inline_keys: HashSet<CanonicalKey>,
    attachments: Vec<MediaAttachment>,
}

/// Resolves, filters and dedups `markup`, then reconciles `attachments`
/// against the media that survived inline.
pub fn normalize(
    markup: &str,
    base_url: Option<&str>,
    attachments: &[MediaAttachment],
    strict: bool,
) -> NormalizedDocument {
    let mut tree = Html::parse_fragment(markup);
    let policy = AdmissionPolicy::new(strict);
    let mut walker = Walker::new(base_url, policy);
    for child in tree.root_element().children() {
        walker.visit(child);
    }
    let Walker {
        removed,
        attributes,
        images,
        inline_keys,
        ..
    } = walker;

    for (id, rewritten) in attributes {
        replace_attributes(&mut tree, id, rewritten);
    }
    for id in removed {
        detach(&mut tree, id);
    }

    let attachments = reconcile_attachments(attachments, &inline_keys, base_url);
    feed_debug!(
        "normalized markup: {} images ({} kept), {} inline keys, {} attachments kept, strict={}",
        images.len(),
        images.iter().filter(|i| i.admission.is_kept()).count(),
        inline_keys.len(),
        attachments.len(),
        strict
    );

    NormalizedDocument {
        tree,
        policy,
        images,
        inline_keys,
        attachments,
    }
}

/// Runs [`normalize`] on the markup stream chosen by the detail controller.
pub fn normalize_request(request: &DocumentRequest) -> NormalizedDocument {
    normalize(
        &request.markup,
        request.base_url.as_deref(),
        &request.attachments,
        request.strict,
    )
}

impl NormalizedDocument {
    /// Serialized markup with every dropped element removed.
    pub fn html(&self) -> String {
        self.tree.root_element().inner_html()
    }

    pub fn attachments(&self) -> &[MediaAttachment] {
        &self.attachments
    }

    pub fn images(&self) -> &[InlineImage] {
        &self.images
    }

    pub fn inline_keys(&self) -> &HashSet<CanonicalKey> {
        &self.inline_keys
    }

    pub fn into_parts(self) -> (String, Vec<MediaAttachment>) {
        (self.html(), self.attachments)
    }

    /// Re-evaluates an image once its rendered size is known.
    ///
    /// Applied at most once per image; later calls return the settled decision.
    pub fn apply_post_load(
        &mut self,
        id: ImageId,
        observed_width: u32,
        observed_height: u32,
    ) -> Option<Admission> {
        let image = self.images.iter_mut().find(|image| image.id == id)?;
        if image.post_load_applied {
            return Some(image.admission);
        }
        image.post_load_applied = true;
        let decision = self
            .policy
            .admit_post_load(&image.facts, observed_width, observed_height);
        if let Admission::Drop(reason) = decision {
            if image.admission.is_kept() {
                feed_debug!(
                    "image {} dropped after load ({observed_width}x{observed_height}): {reason}",
                    loggable_url(&image.facts.src)
                );
                detach(&mut self.tree, image.removal_target);
            }
        }
        image.admission = decision;
        Some(decision)
    }
}

fn detach(tree: &mut Html, id: NodeId) {
    if let Some(mut node) = tree.tree.get_mut(id) {
        node.detach();
    }
}

fn replace_attributes(tree: &mut Html, id: NodeId, attributes: RewrittenAttributes) {
    let Some(mut node) = tree.tree.get_mut(id) else {
        return;
    };
    if let Node::Element(element) = node.value() {
        element.attrs = attributes
            .into_iter()
            .map(|(name, value)| (name, StrTendril::from(value)))
            .collect();
    }
}

struct Walker<'b> {
    base_url: Option<&'b str>,
    policy: AdmissionPolicy,
    removed: HashSet<NodeId>,
    attributes: HashMap<NodeId, RewrittenAttributes>,
    images: Vec<InlineImage>,
    inline_keys: HashSet<CanonicalKey>,
}

impl<'b> Walker<'b> {
    fn new(base_url: Option<&'b str>, policy: AdmissionPolicy) -> Self {
        Self {
            base_url,
            policy,
            removed: HashSet::new(),
            attributes: HashMap::new(),
            images: Vec::new(),
            inline_keys: HashSet::new(),
        }
    }

    fn visit(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Element(element) => self.visit_element(node, element),
            Node::Comment(_) | Node::ProcessingInstruction(_) | Node::Doctype(_) => {
                self.removed.insert(node.id());
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: NodeRef<'_, Node>) {
        for child in node.children() {
            self.visit(child);
        }
    }

    fn visit_element(&mut self, node: NodeRef<'_, Node>, element: &Element) {
        let tag = element.name().to_ascii_lowercase();
        if STRIPPED_ELEMENTS.contains(&tag.as_str()) || (self.policy.strict && tag == "svg") {
            self.removed.insert(node.id());
            return;
        }
        match tag.as_str() {
            "img" => self.handle_image(node, element),
            "source" if parent_is(node, &["picture"]) => {
                // The chosen variant is written into the picture's <img>.
                self.removed.insert(node.id());
            }
            "source" if parent_is(node, &["audio", "video"]) => {
                let attributes = self.rewrite_attributes(element);
                self.collect_media_keys(&attributes);
                self.attributes.insert(node.id(), attributes);
            }
            "audio" | "video" => {
                let attributes = self.rewrite_attributes(element);
                self.collect_media_keys(&attributes);
                self.attributes.insert(node.id(), attributes);
                self.visit_children(node);
            }
            _ => {
                let attributes = self.rewrite_attributes(element);
                self.attributes.insert(node.id(), attributes);
                self.visit_children(node);
            }
        }
    }

    fn handle_image(&mut self, node: NodeRef<'_, Node>, element: &Element) {
        let candidate = image_candidate(node, element);
        let chosen = select_source(&candidate);
        let src = if is_javascript_url(&chosen) {
            String::new()
        } else {
            resolve_url(self.base_url, &chosen)
        };

        let facts = ImageFacts {
            src,
            alt: element.attr("alt").unwrap_or_default().to_string(),
            class: element.attr("class").unwrap_or_default().to_string(),
            id: element.attr("id").unwrap_or_default().to_string(),
            declared_width: candidate.declared_width,
            declared_height: candidate.declared_height,
            media_type: element.attr("type").map(str::to_string),
        };
        let admission = self.policy.admit_eager(&facts);
        // A picture without its image renders nothing useful.
        let removal_target = node
            .parent()
            .filter(|parent| is_element_named(*parent, &["picture"]))
            .map_or(node.id(), |parent| parent.id());

        match admission {
            Admission::Keep => {
                self.inline_keys.insert(canonical_key(&facts.src));
                let mut attributes: RewrittenAttributes = self
                    .rewrite_attributes(element)
                    .into_iter()
                    .filter(|(name, _)| {
                        !(is_plain(name) && is_superseded_image_attribute(&name.local))
                    })
                    .collect();
                match attributes
                    .iter_mut()
                    .find(|(name, _)| is_plain(name) && &*name.local == "src")
                {
                    Some((_, value)) => value.clone_from(&facts.src),
                    None => {
                        attributes.push((plain_name("src"), facts.src.clone()));
                        sort_attributes(&mut attributes);
                    }
                }
                self.attributes.insert(node.id(), attributes);
            }
            Admission::Drop(reason) => {
                feed_debug!("image {} dropped: {reason}", loggable_url(&facts.src));
                self.removed.insert(removal_target);
            }
        }

        self.images.push(InlineImage {
            id: ImageId(node.id()),
            facts,
            admission,
            removal_target,
            post_load_applied: false,
        });
    }

    fn collect_media_keys(&mut self, attributes: &[(QualName, String)]) {
        for (_, url) in attributes.iter().filter(|(name, value)| {
            is_plain(name)
                && MEDIA_KEY_ATTRIBUTES.contains(&&*name.local)
                && !value.trim().is_empty()
        }) {
            self.inline_keys.insert(canonical_key(url));
        }
    }

    /// Copies attributes, dropping event handlers and `javascript:` URLs and
    /// resolving URL-valued attributes against the base. Namespaced
    /// attributes such as `xlink:href` are kept verbatim. Output is sorted.
    fn rewrite_attributes(&self, element: &Element) -> RewrittenAttributes {
        let mut attributes: RewrittenAttributes = element
            .attrs
            .iter()
            .filter_map(|(name, value)| {
                let value: &str = value;
                if !is_plain(name) {
                    return Some((name.clone(), value.to_string()));
                }
                let local = name.local.to_ascii_lowercase();
                if is_event_handler(&local) {
                    return None;
                }
                if !URL_ATTRIBUTES.contains(&&*local) {
                    return Some((name.clone(), value.to_string()));
                }
                let trimmed = value.trim();
                if is_javascript_url(trimmed) {
                    return None;
                }
                let resolved = if trimmed.starts_with('#') {
                    trimmed.to_string()
                } else {
                    resolve_url(self.base_url, trimmed)
                };
                Some((name.clone(), resolved))
            })
            .collect();
        sort_attributes(&mut attributes);
        attributes
    }
}

fn sort_attributes(attributes: &mut [(QualName, String)]) {
    attributes.sort_by(|(left, _), (right, _)| left.cmp(right));
}

/// True for attributes in no namespace, i.e. ordinary HTML attributes.
fn is_plain(name: &QualName) -> bool {
    name.prefix.is_none() && name.ns.is_empty()
}

fn plain_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(local))
}

fn image_candidate(node: NodeRef<'_, Node>, element: &Element) -> ImageCandidate {
    let non_blank = |name: &str| {
        element
            .attr(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let group = node
        .parent()
        .filter(|parent| is_element_named(*parent, &["picture"]))
        .map(|picture| {
            picture
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name().eq_ignore_ascii_case("source"))
                .map(|source| {
                    let source = source.value();
                    SourceVariant {
                        srcset: source
                            .attr("srcset")
                            .or_else(|| source.attr("data-srcset"))
                            .unwrap_or_default()
                            .to_string(),
                        media_type: source.attr("type").map(str::to_string),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    ImageCandidate {
        srcset: non_blank("srcset").or_else(|| non_blank("data-srcset")),
        group,
        src: element.attr("src").map(str::to_string),
        lazy: element
            .attrs()
            .filter(|(name, _)| {
                LAZY_SOURCE_ATTRIBUTES
                    .iter()
                    .any(|lazy| lazy.eq_ignore_ascii_case(name))
            })
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        declared_width: element.attr("width").and_then(parse_dimension),
        declared_height: element.attr("height").and_then(parse_dimension),
    }
}

fn parent_is(node: NodeRef<'_, Node>, names: &[&str]) -> bool {
    node.parent()
        .is_some_and(|parent| is_element_named(parent, names))
}

fn is_element_named(node: NodeRef<'_, Node>, names: &[&str]) -> bool {
    match node.value() {
        Node::Element(element) => names
            .iter()
            .any(|name| element.name().eq_ignore_ascii_case(name)),
        _ => false,
    }
}

fn is_event_handler(name: &str) -> bool {
    name.len() > 2 && name.get(..2).is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

fn is_superseded_image_attribute(name: &str) -> bool {
    SOURCE_SELECTION_ATTRIBUTES
        .iter()
        .chain(LAZY_SOURCE_ATTRIBUTES.iter())
        .any(|attr| attr.eq_ignore_ascii_case(name))
}
