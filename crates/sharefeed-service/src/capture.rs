//! Building share drafts from what the user clicked on.

use serde::{Deserialize, Serialize};
use sharefeed_types::{ShareDraft, ShareRecord};

use crate::error::{ServiceError, ServiceResult};

/// Longest title shown in a share notification.
const NOTIFICATION_TITLE_MAX: usize = 50;

/// Metadata scraped from the page being shared.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMetadata {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub favicon: Option<String>,
    pub og_image: Option<String>,
    pub selection: Option<String>,
}

/// What was right-clicked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CaptureContext {
    Page,
    Link {
        #[serde(default)]
        link_url: Option<String>,
    },
    Selection {
        #[serde(default)]
        text: Option<String>,
    },
    Image {
        #[serde(default)]
        src_url: Option<String>,
    },
}

/// Only web pages can be shared; browser-internal pages cannot.
pub fn is_shareable(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Build the draft for a capture on `page`.
///
/// Starts from the page's url, title, description and favicon, then
/// applies the context: a link shares the link target, a selection adds
/// the highlighted text, an image shares the image source.
pub fn draft_for(context: &CaptureContext, page: &PageMetadata) -> ServiceResult<ShareDraft> {
    if !is_shareable(&page.url) {
        return Err(ServiceError::NotShareable(page.url.clone()));
    }

    let mut draft = ShareDraft::new(page.url.clone(), page.title.clone());
    draft.description = page.description.clone();
    draft.favicon = page.favicon.clone();

    match context {
        CaptureContext::Page => {}
        CaptureContext::Link { link_url } => {
            if let Some(link) = link_url {
                draft.url = link.clone();
                draft.title = link.clone();
            }
        }
        CaptureContext::Selection { text } => {
            draft.selection = text.clone().or_else(|| page.selection.clone());
        }
        CaptureContext::Image { src_url } => {
            if let Some(src) = src_url {
                draft.url = src.clone();
                draft.title = format!("Image from {}", page.title);
            }
        }
    }
    Ok(draft)
}

/// Shorten `s` to at most `max` characters, ending in `...` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Title and body of the notification shown after a successful share.
pub fn share_notification(record: &ShareRecord) -> (&'static str, String) {
    (
        "Shared",
        format!(
            "\"{}\" saved to ShareFeed",
            truncate(&record.title, NOTIFICATION_TITLE_MAX)
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageMetadata {
        PageMetadata {
            url: "https://example.com/article".into(),
            title: "An Article".into(),
            description: Some("About things".into()),
            favicon: Some("data:image/png;base64,AAAA".into()),
            og_image: None,
            selection: Some("page selection".into()),
        }
    }

    #[test]
    fn page_uses_metadata_as_is() {
        let draft = draft_for(&CaptureContext::Page, &page()).unwrap();
        assert_eq!(draft.url, "https://example.com/article");
        assert_eq!(draft.title, "An Article");
        assert_eq!(draft.description.as_deref(), Some("About things"));
        assert_eq!(draft.selection, None);
    }

    #[test]
    fn link_shares_target() {
        let ctx = CaptureContext::Link {
            link_url: Some("https://other.org/x".into()),
        };
        let draft = draft_for(&ctx, &page()).unwrap();
        assert_eq!(draft.url, "https://other.org/x");
        assert_eq!(draft.title, "https://other.org/x");
    }

    #[test]
    fn selection_prefers_clicked_text() {
        let clicked = CaptureContext::Selection {
            text: Some("clicked".into()),
        };
        assert_eq!(
            draft_for(&clicked, &page()).unwrap().selection.as_deref(),
            Some("clicked")
        );
        let fallback = CaptureContext::Selection { text: None };
        assert_eq!(
            draft_for(&fallback, &page()).unwrap().selection.as_deref(),
            Some("page selection")
        );
    }

    #[test]
    fn image_shares_source() {
        let ctx = CaptureContext::Image {
            src_url: Some("https://cdn.example.com/cat.jpg".into()),
        };
        let draft = draft_for(&ctx, &page()).unwrap();
        assert_eq!(draft.url, "https://cdn.example.com/cat.jpg");
        assert_eq!(draft.title, "Image from An Article");
    }

    #[test]
    fn non_http_pages_are_refused() {
        let mut internal = page();
        internal.url = "chrome://settings".into();
        let err = draft_for(&CaptureContext::Page, &internal).unwrap_err();
        assert!(matches!(err, ServiceError::NotShareable(_)));
        assert!(!is_shareable("file:///etc/hosts"));
        assert!(is_shareable("http://a.com"));
    }

    #[test]
    fn truncate_respects_limit() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly ten", 11), "exactly ten");
        assert_eq!(truncate("this is too long", 10), "this is...");
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn notification_truncates_title() {
        let record = ShareRecord::new("1", "https://a.com", "x".repeat(80), 1, "u");
        let (title, body) = share_notification(&record);
        assert_eq!(title, "Shared");
        assert_eq!(body, format!("\"{}...\" saved to ShareFeed", "x".repeat(47)));
    }

    #[test]
    fn context_parses_from_json() {
        let ctx: CaptureContext =
            serde_json::from_str(r#"{"kind":"link","link_url":"https://a.com"}"#).unwrap();
        assert_eq!(
            ctx,
            CaptureContext::Link {
                link_url: Some("https://a.com".into())
            }
        );
    }
}
