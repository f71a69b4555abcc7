//! `207 Multi-Status` response parsing.
//!
//! Only the `href` of each response is used. Elements are matched by local
//! name so any namespace prefix works (`d:href`, `D:href`, `href`). Parsing
//! is tolerant: hrefs read before a syntax error or a truncated body are
//! kept and the error is reported alongside them.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;

/// Hrefs read from a multistatus body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HrefListing {
    /// XML-unescaped, still percent-encoded hrefs in document order.
    pub hrefs: Vec<String>,
    /// Set when parsing stopped early.
    pub error: Option<String>,
}

/// Read every `href` element from a multistatus document.
pub fn parse_hrefs(xml: &str) -> HrefListing {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut listing = HrefListing::default();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"href" => {
                current = Some(String::new());
            }
            Ok(Event::Text(text)) => {
                if let Some(href) = current.as_mut() {
                    match text.unescape() {
                        Ok(value) => href.push_str(&value),
                        Err(e) => {
                            listing.error = Some(format!("invalid href text: {}", e));
                            break;
                        }
                    }
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(href) = current.as_mut() {
                    href.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"href" => {
                if let Some(href) = current.take() {
                    if !href.is_empty() {
                        listing.hrefs.push(href);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                listing.error = Some(format!(
                    "malformed XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ));
                break;
            }
            _ => {}
        }
    }

    listing
}

/// Percent-decode an href; undecodable input is returned unchanged.
pub fn decode_href(href: &str) -> String {
    urlencoding::decode(href)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| href.to_string())
}

/// Final path segment of a decoded href (`/a/b/IMG_1.jpg` → `IMG_1.jpg`).
pub fn base_name(decoded_href: &str) -> &str {
    decoded_href
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
}

/// Names of the children listed in a `Depth: 1` multistatus body.
///
/// `self_path` is the decoded path of the listed collection relative to the
/// DAV root (`files/alice/Photos/Backup`); the entry describing the
/// collection itself is skipped.
pub fn child_names(xml: &str, self_path: &str) -> (HashSet<String>, Option<String>) {
    let listing = parse_hrefs(xml);
    let self_suffix = format!("/{}", self_path.trim_matches('/'));

    let names = listing
        .hrefs
        .iter()
        .map(|href| decode_href(href))
        .filter(|decoded| !decoded.trim_end_matches('/').ends_with(&self_suffix))
        .map(|decoded| base_name(&decoded).to_string())
        .filter(|name| !name.is_empty())
        .collect();

    (names, listing.error)
}
