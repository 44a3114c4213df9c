use clipmux_base::ClipDescriptor;

/// What the shared clipboard holds after a change notification.
#[derive(Debug)]
pub enum SessionEvent {
    Changed(ClipDescriptor),

    /// The session holds no primary clip.
    Cleared,

    /// The session could not be read.
    Unreadable(clipmux_clipboard::Error),
}

impl SessionEvent {
    /// Returns `true` if the session still shows a payload published under `authority`.
    #[inline]
    #[must_use]
    pub fn references(&self, authority: &str) -> bool {
        matches!(self, Self::Changed(descriptor) if descriptor.references(authority))
    }
}

impl From<Result<ClipDescriptor, clipmux_clipboard::Error>> for SessionEvent {
    fn from(result: Result<ClipDescriptor, clipmux_clipboard::Error>) -> Self {
        match result {
            Ok(descriptor) if descriptor.is_empty() => Self::Cleared,
            Ok(descriptor) => Self::Changed(descriptor),
            Err(clipmux_clipboard::Error::Empty) => Self::Cleared,
            Err(err) => Self::Unreadable(err),
        }
    }
}

/// Result of reacting to one [`SessionEvent`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SweepOutcome {
    /// The session references our payloads, nothing was touched.
    Retained,

    /// Every tracked payload was deleted.
    Swept { removed: usize },
}

#[cfg(test)]
mod tests {
    use clipmux_base::{ClipDescriptor, Handle, ItemDescriptor};

    use super::SessionEvent;

    const AUTHORITY: &str = "org.example.provider";

    #[test]
    fn test_from_load_result() {
        assert!(matches!(SessionEvent::from(Ok(ClipDescriptor::default())), SessionEvent::Cleared));
        assert!(matches!(
            SessionEvent::from(Err(clipmux_clipboard::Error::Empty)),
            SessionEvent::Cleared
        ));
        assert!(matches!(
            SessionEvent::from(Err(clipmux_clipboard::Error::PrimitivePoisoned)),
            SessionEvent::Unreadable(_)
        ));

        let item =
            ItemDescriptor::new(Handle::new(), mime::IMAGE_PNG).to_clip_item(AUTHORITY).unwrap();
        let event = SessionEvent::from(Ok(ClipDescriptor::new(vec![item])));
        assert!(event.references(AUTHORITY));
        assert!(!event.references("org.other.provider"));
        assert!(!SessionEvent::from(Ok(ClipDescriptor::from_text("hi"))).references(AUTHORITY));
    }
}
