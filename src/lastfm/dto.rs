//! Last.fm API Data Transfer Objects
//!
//! These types match what the Last.fm JSON API returns.
//! DO NOT use these types outside the lastfm module - convert to domain types.
//!
//! Quirks worth knowing:
//! - Numbers are strings (`"uts": "1000"`, `"totalPages": "3"`).
//! - A list with a single element is serialized as a bare object, so list
//!   fields go through [`OneOrMany`].
//! - Text values live under a `#text` key.
//! - Errors may arrive with HTTP 200 as `{"error": 6, "message": "..."}`.

use serde::{Deserialize, Serialize};

/// A JSON field that is either a single object or an array of them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Error body returned by every method
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: i64,
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// user.getRecentTracks
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecentTracksResponse {
    pub recenttracks: RecentTracks,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecentTracks {
    #[serde(default)]
    pub track: OneOrMany<RecentTrack>,
    #[serde(rename = "@attr")]
    pub attr: Option<PageAttr>,
}

/// Paging info
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAttr {
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub total_pages: String,
    #[serde(default)]
    pub total: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecentTrack {
    #[serde(default)]
    pub name: String,
    pub artist: Option<TextField>,
    pub album: Option<TextField>,
    /// Absent on the currently playing entry
    pub date: Option<PlayDate>,
    #[serde(rename = "@attr")]
    pub attr: Option<TrackAttr>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextField {
    #[serde(rename = "#text", default)]
    pub text: String,
    #[serde(default)]
    pub mbid: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayDate {
    pub uts: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackAttr {
    #[serde(default)]
    pub nowplaying: Option<String>,
}

// ============================================================================
// track.getInfo
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackInfoResponse {
    pub track: TrackInfo,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackInfo {
    #[serde(default)]
    pub name: String,
    pub album: Option<TrackAlbum>,
    pub toptags: Option<TopTags>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackAlbum {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TopTags {
    #[serde(default)]
    pub tag: OneOrMany<Tag>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tag {
    pub name: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_recent_tracks_with_now_playing() {
        let json = r##"{
            "recenttracks": {
                "track": [
                    {
                        "artist": {"mbid": "", "#text": "Massive Attack"},
                        "album": {"mbid": "", "#text": "Mezzanine"},
                        "name": "Teardrop",
                        "@attr": {"nowplaying": "true"}
                    },
                    {
                        "artist": {"mbid": "", "#text": "Air"},
                        "album": {"mbid": "", "#text": "Moon Safari"},
                        "name": "La Femme D'Argent",
                        "date": {"uts": "1000", "#text": "01 Jan 1970, 00:16"}
                    }
                ],
                "@attr": {"user": "listener", "totalPages": "1", "page": "1", "perPage": "50", "total": "1"}
            }
        }"##;

        let response: RecentTracksResponse =
            serde_json::from_str(json).expect("Should parse recent tracks");
        let tracks = response.recenttracks.track.into_vec();

        assert_eq!(tracks.len(), 2);
        assert!(tracks[0].date.is_none());
        assert_eq!(tracks[0].attr.as_ref().unwrap().nowplaying.as_deref(), Some("true"));
        assert_eq!(tracks[1].date.as_ref().unwrap().uts, "1000");
        assert_eq!(response.recenttracks.attr.unwrap().total_pages, "1");
    }

    #[test]
    fn test_parse_single_track_as_object() {
        let json = r##"{
            "recenttracks": {
                "track": {
                    "artist": {"#text": "Air"},
                    "name": "Sexy Boy",
                    "date": {"uts": "2000"}
                },
                "@attr": {"totalPages": "1", "page": "1", "total": "1"}
            }
        }"##;

        let response: RecentTracksResponse =
            serde_json::from_str(json).expect("Should parse single object");
        let tracks = response.recenttracks.track.into_vec();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "Sexy Boy");
        assert!(tracks[0].album.is_none());
    }

    #[test]
    fn test_parse_empty_history() {
        let json = r#"{
            "recenttracks": {
                "track": [],
                "@attr": {"totalPages": "0", "page": "1", "total": "0"}
            }
        }"#;

        let response: RecentTracksResponse = serde_json::from_str(json).unwrap();
        assert!(response.recenttracks.track.into_vec().is_empty());
    }

    #[test]
    fn test_parse_track_info() {
        let json = r#"{
            "track": {
                "name": "La Femme D'Argent",
                "album": {"artist": "Air", "title": "Moon Safari"},
                "toptags": {"tag": [
                    {"name": "electronic", "url": "https://www.last.fm/tag/electronic"},
                    {"name": "downtempo", "url": "https://www.last.fm/tag/downtempo"}
                ]}
            }
        }"#;

        let response: TrackInfoResponse = serde_json::from_str(json).unwrap();
        let tags = response.track.toptags.unwrap().tag.into_vec();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "electronic");
        assert_eq!(response.track.album.unwrap().title, "Moon Safari");
    }

    #[test]
    fn test_parse_track_info_without_tags() {
        let json = r#"{"track": {"name": "Obscure", "toptags": {"tag": []}}}"#;
        let response: TrackInfoResponse = serde_json::from_str(json).unwrap();
        assert!(response.track.toptags.unwrap().tag.into_vec().is_empty());
        assert!(response.track.album.is_none());
    }

    #[test]
    fn test_parse_api_error() {
        let json = r#"{"error": 6, "message": "Track not found", "links": []}"#;
        let error: ApiError = serde_json::from_str(json).unwrap();
        assert_eq!(error.error, 6);
        assert_eq!(error.message, "Track not found");
    }
}
