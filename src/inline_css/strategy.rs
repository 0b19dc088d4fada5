//! Async loading rewrites applied to individual stylesheet links
//!
//! Each eligible link is visited once and ends in exactly one of the states
//! below; nothing mixes attributes from two strategies.

use crate::config::{InlineOptions, Strategy};
use crate::dom::{Document, Element};
use crate::utils::PRELOAD_ONLOAD;

/// Terminal rewrite chosen for every link of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncRewrite {
    /// `rel=preload as=style` promoted to a stylesheet from `onload`
    PreloadSwap,
    /// `media=print` switched back to the real media from `onload`
    MediaToggle,
    /// Preload in place plus a blocking copy queued before `</body>`
    ///
    /// With `drop_original` the in-place preload is removed and the body copy
    /// is the only reference left.
    BodyAppend { drop_original: bool },
}

impl AsyncRewrite {
    #[must_use]
    pub fn from_options(options: &InlineOptions) -> Self {
        if options.uses_preload_swap() {
            AsyncRewrite::PreloadSwap
        } else if options.strategy == Some(Strategy::Media) {
            AsyncRewrite::MediaToggle
        } else {
            AsyncRewrite::BodyAppend {
                drop_original: options.strategy == Some(Strategy::Body),
            }
        }
    }

    /// Rewrite one live link in place
    pub fn apply(self, document: &mut Document, link: &Element) {
        match self {
            AsyncRewrite::PreloadSwap => {
                link.set_attr("rel", "preload");
                link.set_attr("as", "style");
                link.set_attr("onload", PRELOAD_ONLOAD);
            }
            AsyncRewrite::MediaToggle => {
                let media = link
                    .attr("media")
                    .filter(|media| !media.trim().is_empty())
                    .unwrap_or_else(|| "all".to_string());
                link.set_attr("rel", "stylesheet");
                link.set_attr("media", "print");
                link.set_attr("onload", format!("this.media='{}'", media.replace('\'', "\\'")));
            }
            AsyncRewrite::BodyAppend { drop_original } => {
                let media = link.attr("media");
                let kind = link.attr("type");
                let integrity = link.attr("integrity");
                let href = link.attr("href").unwrap_or_default();

                link.set_attr("rel", "preload");
                link.set_attr("as", "style");
                link.remove_attr("media");
                if kind.is_some() {
                    link.remove_attr("type");
                }

                match document.create_element("link") {
                    Some(body_link) => {
                        body_link.set_attr("rel", "stylesheet");
                        if let Some(media) = media {
                            body_link.set_attr("media", media);
                        }
                        if let Some(integrity) = integrity {
                            body_link.set_attr("integrity", integrity);
                        }
                        if let Some(kind) = kind {
                            body_link.set_attr("type", kind);
                        }
                        body_link.set_attr("href", href);
                        document.add_element_to_body(&body_link);
                    }
                    None => log::warn!("Unable to create body <link> for {href}"),
                }

                if drop_original {
                    document.remove(link);
                }
            }
        }
    }
}
