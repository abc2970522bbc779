use serde::Deserialize;

use super::types::Video;
use crate::util::decode_html;

// Only the fields the grid needs are modelled; serde ignores the rest of the
// (very large) post object.

#[derive(Debug, Deserialize)]
struct Envelope {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link_flair_text: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    media: Option<Media>,
    #[serde(default)]
    secure_media: Option<Media>,
    #[serde(default)]
    media_embed: Option<MediaEmbed>,
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(default)]
    oembed: Option<Oembed>,
}

#[derive(Debug, Deserialize)]
struct Oembed {
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    html: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaEmbed {
    #[serde(default)]
    content: Option<String>,
}

/// Result of parsing one listing page.
#[derive(Debug)]
pub struct ParseResult {
    pub videos: Vec<Video>,
    /// Entries dropped because they carried no media object.
    pub skipped: usize,
}

/// Parse a listing response body into videos.
///
/// Entries without a `media` object are dropped before ids are assigned, so
/// ids are dense and follow response order.
pub fn parse_listing(bytes: &[u8]) -> Result<ParseResult, serde_json::Error> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    let total = envelope.data.children.len();

    let videos: Vec<Video> = envelope
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .filter(|post| post.media.is_some())
        .enumerate()
        .map(|(id, post)| normalize(id, post))
        .collect();

    Ok(ParseResult {
        skipped: total - videos.len(),
        videos,
    })
}

fn normalize(id: usize, post: Post) -> Video {
    let media_oembed = post.media.and_then(|m| m.oembed);
    let secure_oembed = post.secure_media.and_then(|m| m.oembed);

    let thumbnail_url = secure_oembed
        .as_ref()
        .and_then(|o| o.thumbnail_url.clone())
        .or_else(|| media_oembed.as_ref().and_then(|o| o.thumbnail_url.clone()))
        .filter(|u| !u.is_empty());

    let embed_html = post
        .media_embed
        .and_then(|e| e.content)
        .filter(|c| !c.is_empty())
        .or_else(|| media_oembed.and_then(|o| o.html))
        .filter(|c| !c.is_empty());

    Video {
        id,
        title: decode_html(&post.title),
        flair: post
            .link_flair_text
            .map(|f| decode_html(&f))
            .unwrap_or_default(),
        thumbnail_url,
        embed_html,
        direct_url: post.url.filter(|u| !u.is_empty()),
    }
}
