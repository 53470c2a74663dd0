//! Adapter layer: Convert YouTube Data API DTOs to [`VideoCandidate`]s

use super::dto;
use crate::model::VideoCandidate;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Convert search results to candidates, keeping only videos, in API order.
pub fn to_candidates(response: dto::SearchListResponse) -> Vec<VideoCandidate> {
    response
        .items
        .into_iter()
        .filter_map(|item| {
            let video_id = item.id.video_id.filter(|id| !id.is_empty())?;
            let snippet = item.snippet?;

            Some(VideoCandidate {
                url: format!("{}{}", WATCH_URL, video_id),
                title: unescape_html(&snippet.title),
                description: Some(unescape_html(&snippet.description)).filter(|d| !d.is_empty()),
                thumbnail_url: best_thumbnail(snippet.thumbnails),
            })
        })
        .collect()
}

fn best_thumbnail(thumbnails: dto::Thumbnails) -> Option<String> {
    thumbnails
        .maxres
        .or(thumbnails.standard)
        .or(thumbnails.high)
        .or(thumbnails.medium)
        .or(thumbnails.default)
        .map(|t| t.url)
}

/// Snippet text comes HTML-escaped (`&amp;`, `&#39;`, `&#x27;`, `&quot;`).
///
/// Single pass, so `&amp;lt;` decodes to `&lt;`. Unknown entities are kept
/// verbatim.
fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Decode the body of one entity (between `&` and `;`).
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}
