//! Turns a feed entry into a publishable post.
//!
//! The pipeline never fails: enhancement and image rendering are optional
//! steps whose failures fall back to the plain text.

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::models::{EnhancedText, Entry};
use crate::ports::{ImageRenderer, TextEnhancer};
use crate::stats::StatsStore;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));

/// Longest description sent to the enhancer.
pub const MAX_ENHANCER_INPUT_CHARS: usize = 3000;

/// Longest description shown in a post.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Headline used when the entry has none.
pub const FALLBACK_TITLE: &str = "No title";

/// Label of the link back to the article.
pub const READ_MORE_LABEL: &str = "🔗 Read more";

/// A message ready for the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedPost {
    /// HTML message or caption.
    pub message: String,
    /// Rendered headline image, owned by the caller.
    pub image: Option<PathBuf>,
}

/// Remove markup tags.
pub fn strip_tags(text: &str) -> String {
    TAG_REGEX.replace_all(text, "").into_owned()
}

/// Feed markup to plain text: tags removed, character references decoded,
/// surrounding whitespace trimmed.
pub fn plain_text(text: &str) -> String {
    let stripped = strip_tags(text);
    ::html_escape::decode_html_entities(&stripped).trim().to_string()
}

/// Truncate to `max` characters, appending `...` when something was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Escape HTML special characters for Telegram HTML mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Whether an enhancer proposal is plausible enough to replace the original.
pub fn is_acceptable(candidate: &EnhancedText) -> bool {
    let title_len = candidate.title.chars().count();
    let description_len = candidate.description.chars().count();
    title_len > 10 && title_len < 120 && description_len > 30 && description_len < 600
}

/// Compose the final HTML message.
pub fn compose_message(title: &str, description: &str, link: &str) -> String {
    format!(
        "<b>{}</b>\n\n{}\n\n<a href=\"{}\">{}</a>",
        html_escape(title),
        html_escape(description),
        html_escape(link),
        READ_MORE_LABEL
    )
}

/// Entry formatter with optional enhancement and rendering.
#[derive(Clone)]
pub struct Formatter {
    enhancer: Option<Arc<dyn TextEnhancer>>,
    renderer: Option<Arc<dyn ImageRenderer>>,
    stats: Arc<StatsStore>,
}

impl Formatter {
    /// Creates a formatter that updates `stats`.
    pub fn new(
        enhancer: Option<Arc<dyn TextEnhancer>>,
        renderer: Option<Arc<dyn ImageRenderer>>,
        stats: Arc<StatsStore>,
    ) -> Self {
        Self {
            enhancer,
            renderer,
            stats,
        }
    }

    /// Build the post for an entry.
    pub async fn format(&self, entry: &Entry) -> FormattedPost {
        let mut title = plain_text(entry.title.as_deref().unwrap_or_default());
        if title.is_empty() {
            title = FALLBACK_TITLE.to_string();
        }
        let mut description = plain_text(entry.description.as_deref().unwrap_or_default());

        if let Some(enhanced) = self.enhance(&title, &description).await {
            title = enhanced.title;
            description = enhanced.description;
        }

        let description = truncate_chars(&description, MAX_DESCRIPTION_CHARS);
        let image = self.render(&title).await;
        let message = compose_message(&title, &description, entry.link.as_deref().unwrap_or_default());

        FormattedPost { message, image }
    }

    async fn enhance(&self, title: &str, description: &str) -> Option<EnhancedText> {
        let enhancer = self.enhancer.as_ref()?;
        let input = truncate_chars(description, MAX_ENHANCER_INPUT_CHARS);

        match enhancer.enhance(title, &input).await {
            Ok(Some(candidate)) if is_acceptable(&candidate) => {
                self.stats.record_enhancement();
                info!("Enhancement applied");
                Some(candidate)
            }
            Ok(Some(candidate)) => {
                self.stats.record_enhancement_error();
                warn!(
                    title_len = candidate.title.chars().count(),
                    description_len = candidate.description.chars().count(),
                    "Enhancement output failed validation, keeping original text"
                );
                None
            }
            Ok(None) => {
                debug!("No enhancement available");
                None
            }
            Err(e) => {
                self.stats.record_enhancement_error();
                warn!(error = %e, "Enhancement failed, keeping original text");
                None
            }
        }
    }

    async fn render(&self, title: &str) -> Option<PathBuf> {
        let renderer = self.renderer.as_ref()?;
        match renderer.render(title).await {
            Some(path) => {
                self.stats.record_image();
                info!(path = %path.display(), "Image generated");
                Some(path)
            }
            None => {
                warn!("Image generation returned no path, posting text only");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnhanceError;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    struct FixedEnhancer {
        reply: Result<Option<EnhancedText>, ()>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl FixedEnhancer {
        fn new(reply: Result<Option<EnhancedText>, ()>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextEnhancer for FixedEnhancer {
        async fn enhance(
            &self,
            title: &str,
            description: &str,
        ) -> Result<Option<EnhancedText>, EnhanceError> {
            self.seen
                .lock()
                .unwrap()
                .push((title.to_string(), description.to_string()));
            self.reply
                .clone()
                .map_err(|_| EnhanceError::Request("connection refused".to_string()))
        }
    }

    struct FixedRenderer(Option<PathBuf>);

    #[async_trait]
    impl ImageRenderer for FixedRenderer {
        async fn render(&self, _title: &str) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    fn entry() -> Entry {
        Entry::new("https://example.com/news/1", "<i>Original</i> headline")
            .with_description("<p>Body of the <b>story</b>.</p>")
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_tags("no markup"), "no markup");
        assert_eq!(strip_tags("a < b"), "a < b");
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("привет мир", 6), "привет...");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }

    #[test]
    fn test_is_acceptable_bounds() {
        let ok = EnhancedText {
            title: "A".repeat(11),
            description: "B".repeat(31),
        };
        assert!(is_acceptable(&ok));

        let short_title = EnhancedText {
            title: "A".repeat(10),
            ..ok.clone()
        };
        assert!(!is_acceptable(&short_title));

        let long_title = EnhancedText {
            title: "A".repeat(120),
            ..ok.clone()
        };
        assert!(!is_acceptable(&long_title));

        let long_description = EnhancedText {
            description: "B".repeat(600),
            ..ok.clone()
        };
        assert!(!is_acceptable(&long_description));
    }

    #[test]
    fn test_compose_message_escapes() {
        let message = compose_message("Tom & Jerry", "1 < 2", "https://example.com/?a=1&b=2");
        assert_eq!(
            message,
            "<b>Tom &amp; Jerry</b>\n\n1 &lt; 2\n\n<a href=\"https://example.com/?a=1&amp;b=2\">🔗 Read more</a>"
        );
    }

    #[test]
    fn test_plain_text_decodes_entities() {
        assert_eq!(plain_text("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(
            plain_text("<p>Banks&nbsp;say &laquo;hold&raquo;</p>"),
            "Banks\u{a0}say «hold»"
        );
        assert_eq!(plain_text("&lt;b&gt; is bold"), "<b> is bold");
        assert_eq!(plain_text("  &nbsp;padded&#32; "), "padded");
    }

    #[tokio::test]
    async fn test_entities_are_escaped_once() {
        let formatter = Formatter::new(None, None, Arc::new(StatsStore::new()));
        let entry = Entry::new("https://example.com/news/2", "Tom &amp; Jerry &laquo;live&raquo;")
            .with_description("<p>Rates&nbsp;hold &quot;steady&quot;</p>");

        let post = formatter.format(&entry).await;
        assert!(post
            .message
            .starts_with("<b>Tom &amp; Jerry «live»</b>\n\nRates\u{a0}hold &quot;steady&quot;"));
        assert!(!post.message.contains("&amp;amp;"));
        assert!(!post.message.contains("&amp;nbsp;"));
    }

    #[tokio::test]
    async fn test_enhancer_sees_decoded_text() {
        let enhancer = Arc::new(FixedEnhancer::new(Ok(None)));
        let formatter = Formatter::new(Some(enhancer.clone()), None, Arc::new(StatsStore::new()));
        let entry = Entry::new("https://example.com/news/3", "Tom &amp; Jerry")
            .with_description("&laquo;Quoted&raquo; body");

        formatter.format(&entry).await;
        let seen = enhancer.seen.lock().unwrap();
        assert_eq!(seen[0], ("Tom & Jerry".to_string(), "«Quoted» body".to_string()));
    }

    #[tokio::test]
    async fn test_format_without_collaborators() {
        let stats = Arc::new(StatsStore::new());
        let formatter = Formatter::new(None, None, Arc::clone(&stats));

        let post = formatter.format(&entry()).await;
        assert!(post.message.starts_with("<b>Original headline</b>"));
        assert!(post.message.contains("Body of the story."));
        assert!(post.message.contains("https://example.com/news/1"));
        assert!(post.image.is_none());
        assert_eq!(stats.snapshot(), crate::stats::RunStats::default());
    }

    #[tokio::test]
    async fn test_missing_title_uses_fallback() {
        let formatter = Formatter::new(None, None, Arc::new(StatsStore::new()));
        let entry = Entry {
            link: Some("https://example.com/x".to_string()),
            ..Entry::default()
        };
        let post = formatter.format(&entry).await;
        assert!(post.message.starts_with("<b>No title</b>"));
    }

    #[tokio::test]
    async fn test_enhancement_accepted() {
        let stats = Arc::new(StatsStore::new());
        let enhancer = Arc::new(FixedEnhancer::new(Ok(Some(EnhancedText {
            title: "A much better headline".to_string(),
            description: "A rewritten description that is long enough.".to_string(),
        }))));
        let formatter = Formatter::new(Some(enhancer.clone()), None, Arc::clone(&stats));

        let post = formatter.format(&entry()).await;
        assert!(post.message.contains("A much better headline"));
        assert!(!post.message.contains("Original headline"));
        assert_eq!(stats.snapshot().yagpt_used, 1);
        assert_eq!(stats.snapshot().yagpt_errors, 0);

        let seen = enhancer.seen.lock().unwrap();
        assert_eq!(seen[0].0, "Original headline");
        assert_eq!(seen[0].1, "Body of the story.");
    }

    #[tokio::test]
    async fn test_enhancement_rejected_keeps_original() {
        let stats = Arc::new(StatsStore::new());
        let enhancer = Arc::new(FixedEnhancer::new(Ok(Some(EnhancedText {
            title: "Short".to_string(),
            description: "A rewritten description that is long enough.".to_string(),
        }))));
        let formatter = Formatter::new(Some(enhancer), None, Arc::clone(&stats));

        let post = formatter.format(&entry()).await;
        assert!(post.message.contains("Original headline"));
        assert_eq!(stats.snapshot().yagpt_used, 0);
        assert_eq!(stats.snapshot().yagpt_errors, 1);
    }

    #[tokio::test]
    async fn test_enhancement_error_keeps_original() {
        let stats = Arc::new(StatsStore::new());
        let enhancer = Arc::new(FixedEnhancer::new(Err(())));
        let formatter = Formatter::new(Some(enhancer), None, Arc::clone(&stats));

        let post = formatter.format(&entry()).await;
        assert!(post.message.contains("Original headline"));
        assert_eq!(stats.snapshot().yagpt_errors, 1);
    }

    #[tokio::test]
    async fn test_enhancer_input_is_truncated() {
        let enhancer = Arc::new(FixedEnhancer::new(Ok(None)));
        let formatter = Formatter::new(Some(enhancer.clone()), None, Arc::new(StatsStore::new()));
        let long = Entry::new("https://example.com/long", "Headline").with_description("x".repeat(5000));

        formatter.format(&long).await;

        let seen = enhancer.seen.lock().unwrap();
        assert_eq!(seen[0].1.chars().count(), MAX_ENHANCER_INPUT_CHARS + 3);
    }

    #[tokio::test]
    async fn test_description_truncated_for_display() {
        let formatter = Formatter::new(None, None, Arc::new(StatsStore::new()));
        let long = Entry::new("https://example.com/long", "Headline").with_description("y".repeat(800));

        let post = formatter.format(&long).await;
        assert!(post.message.contains(&format!("{}...", "y".repeat(MAX_DESCRIPTION_CHARS))));
        assert!(!post.message.contains(&"y".repeat(MAX_DESCRIPTION_CHARS + 1)));
    }

    #[tokio::test]
    async fn test_image_counted() {
        let stats = Arc::new(StatsStore::new());
        let renderer = Arc::new(FixedRenderer(Some(Path::new("/tmp/post.jpg").to_path_buf())));
        let formatter = Formatter::new(None, Some(renderer), Arc::clone(&stats));

        let post = formatter.format(&entry()).await;
        assert_eq!(post.image, Some(PathBuf::from("/tmp/post.jpg")));
        assert_eq!(stats.snapshot().images_generated, 1);
    }

    #[tokio::test]
    async fn test_image_failure_is_text_only() {
        let stats = Arc::new(StatsStore::new());
        let formatter = Formatter::new(None, Some(Arc::new(FixedRenderer(None))), Arc::clone(&stats));

        let post = formatter.format(&entry()).await;
        assert!(post.image.is_none());
        assert_eq!(stats.snapshot().images_generated, 0);
    }
}
