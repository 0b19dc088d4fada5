//! Critical CSS inlining orchestration
//!
//! This module drives one inlining run: it loads the document, computes the
//! critical rules that are not inlined yet, places them, then rewrites or
//! replaces the blocking stylesheet links and serializes the result.

use std::path::PathBuf;

use super::extract::{extract_stylesheet, resolve_source};
use super::strategy::AsyncRewrite;
use super::types::{InlineError, InlineResult};
use crate::config::InlineOptions;
use crate::css::{compute_missing, compute_missing_pretty};
use crate::dom::{Document, Element};
use crate::utils::{NON_BLOCKING_MEDIA, STYLESHEET_SELECTOR, TARGET_FALLBACK_SELECTORS};

/// Inline critical CSS into an HTML document given as bytes
///
/// Both payloads must be UTF-8. Returns the rewritten document as UTF-8 bytes.
///
/// # Errors
///
/// Returns `InlineError::InputDecode` for non UTF-8 input, plus everything
/// [`inline_str`] can return.
pub fn inline<H, C>(html: H, css: C, options: &InlineOptions) -> InlineResult<Vec<u8>>
where
    H: AsRef<[u8]>,
    C: AsRef<[u8]>,
{
    let html = std::str::from_utf8(html.as_ref())
        .map_err(|source| InlineError::InputDecode { input: "HTML", source })?;
    let css = std::str::from_utf8(css.as_ref())
        .map_err(|source| InlineError::InputDecode { input: "CSS", source })?;

    inline_str(html, css, options).map(String::into_bytes)
}

/// Inline critical CSS into an HTML document
///
/// # Errors
///
/// Returns `InlineError::Configuration` or `InlineError::MissingResource` when
/// extraction cannot locate a stylesheet, and `InlineError::Io` when reading or
/// writing an extracted stylesheet fails. Nothing is written to disk unless
/// every stylesheet selected for extraction resolved.
pub fn inline_str(html: &str, css: &str, options: &InlineOptions) -> InlineResult<String> {
    let mut document = Document::load(html, options.noscript());

    let inline_styles = document.inline_styles();
    let external_styles = document.external_styles();
    log::debug!(
        "Found {} inline style block(s) and {} external stylesheet(s)",
        inline_styles.len(),
        external_styles.len()
    );

    let missing = if options.minify() {
        compute_missing(css, &inline_styles)
    } else {
        compute_missing_pretty(css, &inline_styles)
    };

    let mut inlined = inline_styles;
    inlined.push(missing.clone());

    let links: Vec<Element> = external_styles
        .into_iter()
        .filter(|link| is_stylesheet(link))
        .filter(|link| {
            let href = link.attr("href").unwrap_or_default();
            let ignored = options.is_ignored(&href);
            if ignored {
                log::debug!("Ignoring stylesheet {href}");
            }
            !ignored
        })
        .collect();

    let replacements = options.replace_stylesheets().filter(|_| !links.is_empty());

    let sources = match replacements {
        None if options.extract() => plan_extraction(&links, options)?,
        _ => vec![None; links.len()],
    };

    let target = find_target(&document, options);

    if missing.trim().is_empty() {
        log::debug!("Critical CSS already present, no <style> block inserted");
    } else {
        document.add_inline_styles(&missing, target.as_ref());
    }

    let fallback = options.uses_noscript_fallback();
    if options.needs_loader() && document.maybe_add_loadcss() {
        log::debug!("Added loadCSS polyfill");
    }

    let rewrite = AsyncRewrite::from_options(options);

    match replacements {
        Some(hrefs) => replace_stylesheets(&mut document, &links, hrefs, rewrite, fallback, options),
        None => {
            for (link, source) in links.iter().zip(sources) {
                if is_non_blocking(link) {
                    continue;
                }

                if let Some(source) = source {
                    let href = link.attr("href").unwrap_or_default();
                    let revisioned = extract_stylesheet(&source, &href, &inlined, options.minify())?;
                    link.set_attr("href", revisioned);
                }

                if fallback {
                    document.add_noscript(link);
                }

                rewrite.apply(&mut document, link);
            }
            log::info!("Rewrote {} stylesheet link(s) as {rewrite:?}", links.len());
        }
    }

    Ok(document.serialize())
}

fn is_stylesheet(link: &Element) -> bool {
    link.attr("rel")
        .is_some_and(|rel| rel.trim().eq_ignore_ascii_case("stylesheet"))
}

fn is_non_blocking(link: &Element) -> bool {
    link.attr("media").is_some_and(|media| {
        let media = media.trim();
        NON_BLOCKING_MEDIA
            .iter()
            .any(|value| media.eq_ignore_ascii_case(value))
    })
}

/// Resolve every extraction source before anything is written
fn plan_extraction(links: &[Element], options: &InlineOptions) -> InlineResult<Vec<Option<PathBuf>>> {
    links
        .iter()
        .map(|link| {
            if is_non_blocking(link) {
                return Ok(None);
            }
            let href = link.attr("href").unwrap_or_default();
            resolve_source(&href, options.base_path())
        })
        .collect()
}

/// Element the critical `<style>` block is inserted in front of
fn find_target(document: &Document, options: &InlineOptions) -> Option<Element> {
    if let Some(selector) = options.selector() {
        match document.query_selector(&[selector]) {
            Some(found) => return Some(found),
            None => log::debug!("Selector {selector:?} matched nothing, using fallback target"),
        }
    }
    document.query_selector(&TARGET_FALLBACK_SELECTORS)
}

/// Swap every eligible stylesheet for the configured replacement hrefs
fn replace_stylesheets(
    document: &mut Document,
    links: &[Element],
    hrefs: &[String],
    rewrite: AsyncRewrite,
    fallback: bool,
    options: &InlineOptions,
) {
    let stale: Vec<Element> = document
        .query_selector_all(&[STYLESHEET_SELECTOR])
        .into_iter()
        .filter(|link| !options.is_ignored(&link.attr("href").unwrap_or_default()))
        .collect();

    if let Some(anchor) = links.first() {
        for href in hrefs {
            let Some(link) = document.create_element("link") else {
                log::warn!("Unable to create <link> for {href}");
                continue;
            };
            link.set_attr("rel", "stylesheet");
            link.set_attr("href", href.as_str());
            document.insert_before(&link, anchor);

            if fallback {
                document.add_noscript(&link);
            }
            rewrite.apply(document, &link);
        }
    }

    for link in &stale {
        match link.parent_element().filter(|parent| parent.is("noscript")) {
            Some(wrapper) => document.remove(&wrapper),
            None => document.remove(link),
        }
    }

    log::info!(
        "Replaced {} stylesheet link(s) with {} replacement(s)",
        stale.len(),
        hrefs.len()
    );
}
