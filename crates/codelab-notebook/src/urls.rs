//! Rewrites relative links and images in markdown so they resolve outside the
//! repository the codelab was written in.
//!
//! The rewrite runs as a fixed sequence of passes. Each pass sees the output of
//! the previous one:
//!
//! 1. HTML comments are removed, so commented-out markup is never converted.
//! 2. `<img>` tags become markdown images with an already resolved url.
//! 3. Markdown images are resolved, including the ones produced by pass 2.
//! 4. Markdown links are resolved. Image syntax is skipped here.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use url::Url;

lazy_static! {
    static ref HTML_COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").expect("invalid regex expression");
    static ref HTML_IMG: Regex = Regex::new(r"(?i)<img[^>]*>").expect("invalid regex expression");
    static ref IMG_SRC: Regex =
        Regex::new(r#"(?i)\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("invalid regex expression");
    static ref IMG_ALT: Regex =
        Regex::new(r#"(?i)\salt\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("invalid regex expression");
    static ref IMG_TITLE: Regex =
        Regex::new(r#"(?i)\stitle\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("invalid regex expression");
    static ref MD_IMAGE: Regex = Regex::new(r#"!\[([^\]]*)\]\(([^\s)]+)(?:\s+"([^"]*)")?\)"#)
        .expect("invalid regex expression");
    static ref MD_LINK: Regex = Regex::new(r#"(!?)\[([^\]]+)\]\(([^\s)]+)(?:\s+"([^"]*)")?\)"#)
        .expect("invalid regex expression");
}

/// A single rewrite step: `(text, base_url) -> text`.
type Pass = fn(&str, &str) -> String;

const PASSES: [Pass; 4] = [
    strip_comments,
    convert_html_images,
    rewrite_images,
    rewrite_links,
];

/// Applies every pass in order.
pub fn rewrite_urls(text: &str, base_url: &str) -> String {
    PASSES
        .iter()
        .fold(text.to_string(), |acc, pass| pass(&acc, base_url))
}

fn is_absolute(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Resolves a single url against `base_url`.
///
/// Absolute http(s) urls, `mailto:` links, fragments and site-rooted paths are
/// left alone, as is everything when the base is empty. A leading `./` is
/// replaced by the base, any other relative path is appended to it.
pub fn resolve_url(url: &str, base_url: &str) -> String {
    if url.is_empty() || base_url.is_empty() {
        return url.to_string();
    }
    let url = url.trim();
    if is_absolute(url)
        || url.starts_with(base_url)
        || url.starts_with("mailto:")
        || url.starts_with('#')
        || url.starts_with('/')
    {
        return url.to_string();
    }

    match url.strip_prefix("./") {
        Some(rest) => format!("{}{}", base_url, rest),
        None => format!("{}{}", base_url, url),
    }
}

fn title_suffix(title: Option<&str>) -> String {
    match title {
        Some(t) if !t.is_empty() => format!(" \"{}\"", t),
        _ => String::new(),
    }
}

fn attribute<'t>(re: &Regex, tag: &'t str) -> Option<&'t str> {
    re.captures(tag)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str())
}

pub fn strip_comments(text: &str, _base_url: &str) -> String {
    HTML_COMMENT.replace_all(text, "").into_owned()
}

/// Tags without a non-empty `src` are kept verbatim.
pub fn convert_html_images(text: &str, base_url: &str) -> String {
    HTML_IMG
        .replace_all(text, |caps: &Captures| {
            let tag = &caps[0];
            match attribute(&IMG_SRC, tag) {
                Some(src) if !src.is_empty() => {
                    let alt = attribute(&IMG_ALT, tag).unwrap_or("image");
                    let title = attribute(&IMG_TITLE, tag).unwrap_or("Image");
                    format!("![{}]({} \"{}\")", alt, resolve_url(src, base_url), title)
                }
                _ => tag.to_string(),
            }
        })
        .into_owned()
}

pub fn rewrite_images(text: &str, base_url: &str) -> String {
    MD_IMAGE
        .replace_all(text, |caps: &Captures| {
            format!(
                "![{}]({}{})",
                &caps[1],
                resolve_url(&caps[2], base_url),
                title_suffix(caps.get(3).map(|m| m.as_str()))
            )
        })
        .into_owned()
}

pub fn rewrite_links(text: &str, base_url: &str) -> String {
    MD_LINK
        .replace_all(text, |caps: &Captures| {
            if &caps[1] == "!" {
                return caps[0].to_string();
            }
            format!(
                "[{}]({}{})",
                &caps[2],
                resolve_url(&caps[3], base_url),
                title_suffix(caps.get(4).map(|m| m.as_str()))
            )
        })
        .into_owned()
}
