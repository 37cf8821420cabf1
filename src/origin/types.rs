//! Origin metadata records.
//!
//! Shapes of the `/Items` query response. Emby and Jellyfin both emit
//! PascalCase keys and may send `null` for any field, so every field is optional
//! on the wire and defaults when missing or null.

use serde::{Deserialize, Deserializer};

/// Response body of `GET /Items`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<MediaItem>,
}

/// A library item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaItem {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,

    /// Origin-local file path. Empty when the origin omitted it.
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,

    #[serde(default, deserialize_with = "nullable")]
    pub media_sources: Vec<MediaSource>,
}

/// One playable representation of an item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaSource {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,

    #[serde(default, deserialize_with = "nullable")]
    pub protocol: MediaProtocol,

    /// Absolute URL or origin path.
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum MediaProtocol {
    File,
    Http,
    #[default]
    #[serde(other)]
    Other,
}

impl MediaItem {
    /// The source with `id`, else the first one.
    pub fn select_source(&self, id: Option<&str>) -> Option<&MediaSource> {
        id.and_then(|id| self.media_sources.iter().find(|s| s.id == id))
            .or_else(|| self.media_sources.first())
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_items() {
        let body = r#"{"Items":[{"Id":"18464","Path":"/strm/http/movie.strm","MediaSources":[{"Id":"mediasource_1","Protocol":"Http","Path":"https://origin.example/first.mp4"},{"Id":"mediasource_2","Protocol":"File","Path":"/mnt/second.mkv"}]}],"TotalRecordCount":1}"#;
        let parsed: ItemsResponse = serde_json::from_str(body).unwrap();
        let item = &parsed.items[0];
        assert_eq!(item.id, "18464");
        assert_eq!(item.path, "/strm/http/movie.strm");
        assert_eq!(item.media_sources[0].protocol, MediaProtocol::Http);
        assert_eq!(item.media_sources[1].protocol, MediaProtocol::File);
    }

    #[test]
    fn test_nulls_and_missing_fields() {
        let body = r#"{"Items":[{"Path":null,"MediaSources":null},{"MediaSources":[{"Protocol":"Rtmp"}]}]}"#;
        let parsed: ItemsResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.items[0].path.is_empty());
        assert!(parsed.items[0].media_sources.is_empty());
        assert_eq!(parsed.items[1].media_sources[0].protocol, MediaProtocol::Other);

        let empty: ItemsResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_select_source() {
        let item = MediaItem {
            id: "1".into(),
            path: "/a.strm".into(),
            media_sources: vec![
                MediaSource { id: "a".into(), protocol: MediaProtocol::Http, path: "1".into() },
                MediaSource { id: "b".into(), protocol: MediaProtocol::Http, path: "2".into() },
            ],
        };
        assert_eq!(item.select_source(Some("b")).unwrap().path, "2");
        assert_eq!(item.select_source(Some("zzz")).unwrap().path, "1");
        assert_eq!(item.select_source(None).unwrap().path, "1");
        assert!(MediaItem::default().select_source(Some("a")).is_none());
    }
}
