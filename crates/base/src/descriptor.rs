use crate::{uri, ContentUri, Handle};

/// One published payload: its handle and the MIME type it was declared with.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ItemDescriptor {
    pub handle: Handle,
    pub mime: mime::Mime,
}

impl ItemDescriptor {
    #[inline]
    pub const fn new(handle: Handle, mime: mime::Mime) -> Self { Self { handle, mime } }

    /// # Errors
    pub fn to_clip_item(&self, authority: &str) -> Result<ClipItem, uri::Error> {
        let uri = ContentUri::copy(authority, self.handle).to_uri()?;
        Ok(ClipItem::Uri { uri, mime: self.mime.clone() })
    }
}

/// One entry of the shared clipboard content.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ClipItem {
    Uri { uri: http::Uri, mime: mime::Mime },
    Text(String),
}

impl ClipItem {
    #[inline]
    #[must_use]
    pub fn mime(&self) -> mime::Mime {
        match self {
            Self::Uri { mime, .. } => mime.clone(),
            Self::Text(_) => mime::TEXT_PLAIN_UTF_8,
        }
    }

    /// The parsed provider address of this item, if it has one.
    #[inline]
    #[must_use]
    pub fn content_uri(&self) -> Option<ContentUri> {
        match self {
            Self::Uri { uri, .. } => ContentUri::parse(uri).ok(),
            Self::Text(_) => None,
        }
    }
}

/// The whole content installed into the shared clipboard by one `copy`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ClipDescriptor {
    mime_types: Vec<mime::Mime>,
    items: Vec<ClipItem>,
}

impl ClipDescriptor {
    /// Builds a descriptor whose manifest lists the item types in order of first appearance.
    #[must_use]
    pub fn new(items: Vec<ClipItem>) -> Self {
        let mut mime_types: Vec<mime::Mime> = Vec::with_capacity(items.len());
        for mime in items.iter().map(ClipItem::mime) {
            if !mime_types.contains(&mime) {
                mime_types.push(mime);
            }
        }
        Self { mime_types, items }
    }

    #[inline]
    #[must_use]
    pub const fn with_mime_types(mime_types: Vec<mime::Mime>, items: Vec<ClipItem>) -> Self {
        Self { mime_types, items }
    }

    #[inline]
    #[must_use]
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        Self::new(vec![ClipItem::Text(text.into())])
    }

    #[inline]
    #[must_use]
    pub fn mime_types(&self) -> &[mime::Mime] { &self.mime_types }

    #[inline]
    #[must_use]
    pub fn items(&self) -> &[ClipItem] { &self.items }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize { self.items.len() }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Returns `true` if the manifest lists a type matching `expected`.
    ///
    /// Parameters are ignored and `expected` may be a wildcard such as `image/*`.
    #[must_use]
    pub fn has_mime_type(&self, expected: &mime::Mime) -> bool {
        !self.is_empty() && self.mime_types.iter().any(|mime| mime_matches(expected, mime))
    }

    /// Handles of the items published under `authority`, in item order.
    pub fn handles_of<'a>(&'a self, authority: &'a str) -> impl Iterator<Item = Handle> + 'a {
        self.items
            .iter()
            .filter_map(ClipItem::content_uri)
            .filter(move |uri| uri.is_copy_of(authority))
            .filter_map(|uri| uri.handle())
    }

    /// Returns `true` if at least one item was published under `authority`.
    #[inline]
    #[must_use]
    pub fn references(&self, authority: &str) -> bool {
        self.handles_of(authority).next().is_some()
    }
}

#[must_use]
pub fn mime_matches(pattern: &mime::Mime, mime: &mime::Mime) -> bool {
    if pattern.type_() == mime::STAR {
        return true;
    }
    if pattern.type_() != mime.type_() {
        return false;
    }
    pattern.subtype() == mime::STAR
        || (pattern.subtype() == mime.subtype() && pattern.suffix() == mime.suffix())
}

#[cfg(test)]
mod tests {
    use super::{mime_matches, ClipDescriptor, ClipItem, ItemDescriptor};
    use crate::Handle;

    const AUTHORITY: &str = "org.example.provider";

    fn int_mime() -> mime::Mime { "x/int".parse().unwrap() }

    #[test]
    fn test_manifest_is_deduplicated() {
        let items = (0..3)
            .map(|_| ItemDescriptor::new(Handle::new(), int_mime()).to_clip_item(AUTHORITY))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let descriptor = ClipDescriptor::new(items);
        assert_eq!(descriptor.len(), 3);
        assert_eq!(descriptor.mime_types(), &[int_mime()]);
        assert!(descriptor.has_mime_type(&int_mime()));
        assert!(!descriptor.has_mime_type(&mime::TEXT_PLAIN));
    }

    #[test]
    fn test_handles_of_keeps_order_and_filters_authority() {
        let handles = [Handle::new(), Handle::new()];
        let mut items = handles
            .iter()
            .map(|handle| ItemDescriptor::new(*handle, int_mime()).to_clip_item(AUTHORITY).unwrap())
            .collect::<Vec<_>>();
        items.push(
            ItemDescriptor::new(Handle::new(), int_mime())
                .to_clip_item("org.other.provider")
                .unwrap(),
        );
        items.push(ClipItem::Text("hello".to_string()));

        let descriptor = ClipDescriptor::new(items);
        assert_eq!(descriptor.handles_of(AUTHORITY).collect::<Vec<_>>(), handles.to_vec());
        assert!(descriptor.references(AUTHORITY));
        assert!(!ClipDescriptor::from_text("hello").references(AUTHORITY));
    }

    #[test]
    fn test_mime_matches() {
        let png = mime::IMAGE_PNG;
        assert!(mime_matches(&mime::STAR_STAR, &png));
        assert!(mime_matches(&mime::IMAGE_STAR, &png));
        assert!(mime_matches(&mime::IMAGE_PNG, &png));
        assert!(!mime_matches(&mime::IMAGE_JPEG, &png));
        assert!(!mime_matches(&mime::TEXT_STAR, &png));
        assert!(mime_matches(&mime::TEXT_PLAIN, &mime::TEXT_PLAIN_UTF_8));
    }

    #[test]
    fn test_empty_descriptor_has_no_types() {
        let descriptor = ClipDescriptor::default();
        assert!(descriptor.is_empty());
        assert!(!descriptor.has_mime_type(&mime::STAR_STAR));
    }
}
