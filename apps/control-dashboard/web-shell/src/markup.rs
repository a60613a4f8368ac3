/// CSS selector matching every element that carries `attribute`.
pub(crate) fn marker_selector(attribute: &str) -> String {
    format!("[{attribute}]")
}

/// `aria-*` boolean attribute semantics: only a literal `true` is set.
pub(crate) fn aria_flag(value: Option<&str>) -> bool {
    value.is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

pub(crate) fn aria_value(flag: bool) -> &'static str {
    if flag { "true" } else { "false" }
}

/// Roving tabindex: only the active control is a sequential focus stop.
pub(crate) fn tab_index(tab_stop: bool) -> i32 {
    if tab_stop { 0 } else { -1 }
}

/// Document identity previously stamped on the root element.
pub(crate) fn parse_document_key(raw: Option<&str>) -> Option<u64> {
    raw?.trim().parse::<u64>().ok().filter(|key| *key > 0)
}

/// Where the current document's identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DocumentKeySource {
    /// Read back from the root element.
    Stamped(u64),
    /// Stamping failed earlier; the key handed out then is reused.
    Remembered(u64),
    /// Newly allocated; the caller must stamp it.
    Fresh(u64),
}

impl DocumentKeySource {
    pub(crate) fn key(self) -> u64 {
        match self {
            Self::Stamped(key) | Self::Remembered(key) | Self::Fresh(key) => key,
        }
    }
}

pub(crate) fn document_key_source(
    stamped: Option<&str>,
    remembered: Option<u64>,
    allocate: impl FnOnce() -> u64,
) -> DocumentKeySource {
    if let Some(key) = parse_document_key(stamped) {
        return DocumentKeySource::Stamped(key);
    }
    match remembered {
        Some(key) => DocumentKeySource::Remembered(key),
        None => DocumentKeySource::Fresh(allocate()),
    }
}

pub(crate) fn normalized_selector(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_wraps_attribute_name() {
        assert_eq!(marker_selector("data-view-tab"), "[data-view-tab]");
    }

    #[test]
    fn aria_flag_accepts_only_true() {
        assert!(aria_flag(Some("true")));
        assert!(aria_flag(Some(" TRUE ")));
        assert!(!aria_flag(Some("false")));
        assert!(!aria_flag(Some("")));
        assert!(!aria_flag(Some("1")));
        assert!(!aria_flag(None));
    }

    #[test]
    fn roving_tab_index() {
        assert_eq!(tab_index(true), 0);
        assert_eq!(tab_index(false), -1);
        assert_eq!(aria_value(false), "false");
    }

    #[test]
    fn document_key_requires_positive_integer() {
        assert_eq!(parse_document_key(Some("7")), Some(7));
        assert_eq!(parse_document_key(Some(" 12 ")), Some(12));
        assert_eq!(parse_document_key(Some("0")), None);
        assert_eq!(parse_document_key(Some("doc-1")), None);
        assert_eq!(parse_document_key(None), None);
    }

    #[test]
    fn unstampable_document_reuses_its_first_key() {
        assert_eq!(
            document_key_source(Some("3"), Some(9), || 10),
            DocumentKeySource::Stamped(3)
        );
        assert_eq!(document_key_source(None, None, || 10), DocumentKeySource::Fresh(10));

        let first = document_key_source(None, None, || 4);
        let remembered = match first {
            DocumentKeySource::Fresh(key) => Some(key),
            _ => None,
        };
        let second = document_key_source(None, remembered, || 5);
        assert_eq!(second, DocumentKeySource::Remembered(4));
        assert_eq!(second.key(), first.key());
    }

    #[test]
    fn blank_selector_is_rejected() {
        assert_eq!(normalized_selector("  "), None);
        assert_eq!(
            normalized_selector(" header.dashboard-header "),
            Some("header.dashboard-header".to_string())
        );
    }
}
