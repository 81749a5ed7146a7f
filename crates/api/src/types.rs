use serde::{Deserialize, Serialize};

/// A video resource as returned by the API.
///
/// Only the fields the upsert flow reads are typed; `snippet` and `status`
/// stay opaque because the tool passes them through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<serde_json::Value>,
}

/// Response envelope for `videos.list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoResource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_resource_missing_id_is_none() {
        let parsed: VideoResource =
            serde_json::from_str(r#"{"snippet":{"title":"T"}}"#).unwrap();
        assert!(parsed.id.is_none());
        assert_eq!(parsed.snippet.unwrap()["title"], "T");
    }

    #[test]
    fn video_resource_json_roundtrip() {
        let resource = VideoResource {
            id: Some("abc123".into()),
            snippet: Some(serde_json::json!({"title": "Demo"})),
            status: None,
        };
        let json = serde_json::to_string(&resource).unwrap();
        assert!(!json.contains("status"));
        let parsed: VideoResource = serde_json::from_str(&json).unwrap();
        assert_eq!(resource, parsed);
    }

    #[test]
    fn video_list_defaults_to_empty() {
        let parsed: VideoListResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }
}
