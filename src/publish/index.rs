// Feed index maintenance - reels.json, newest entry first

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::PublishError;
use super::github::GithubClient;

/// One published item in the feed index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelEntry {
    pub id: u64,
    pub src: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub datetime: String,
}

/// Parse the remote index, degrading to an empty feed when the file is
/// malformed or not an array. Existing entries pass through untouched even
/// when their shape drifted from ours.
pub fn decode_entries(raw: &[u8]) -> Vec<Value> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Next id: one past the highest seen, starting at 1. Ids stored as strings
/// by older writers still count.
pub fn next_id(entries: &[Value]) -> u64 {
    entries
        .iter()
        .filter_map(|entry| entry.get("id"))
        .filter_map(|id| id.as_u64().or_else(|| id.as_str().and_then(|s| s.parse().ok())))
        .max()
        .map(|highest| highest + 1)
        .unwrap_or(1)
}

/// Read-modify-write of the feed index: prepend the new entry under a fresh
/// id and push the result back with the version token we read
pub async fn record_entry(
    github: &GithubClient,
    file_name: &str,
    src: String,
    caption: String,
    hashtags: Vec<String>,
    datetime: String,
) -> Result<ReelEntry, PublishError> {
    let index_path = github.config().index_path.clone();
    let remote = github.get_file(&index_path).await?;
    let (mut entries, sha) = match remote {
        Some(file) => (decode_entries(&file.content), Some(file.sha)),
        None => (Vec::new(), None),
    };

    let entry = ReelEntry {
        id: next_id(&entries),
        src,
        caption,
        hashtags,
        datetime,
    };
    let value =
        serde_json::to_value(&entry).map_err(|e| PublishError::InvalidResponse(e.to_string()))?;
    entries.insert(0, value);

    let body = serde_json::to_vec_pretty(&entries)
        .map_err(|e| PublishError::InvalidResponse(e.to_string()))?;
    let message = format!("feat(reels): add {} to {}", file_name, index_path);
    github
        .put_file(&index_path, &message, &body, sha.as_deref())
        .await?;

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_garbage_index_degrades_to_empty() {
        assert!(decode_entries(b"not json at all").is_empty());
        assert!(decode_entries(b"{\"id\": 1}").is_empty());
        assert!(decode_entries(b"").is_empty());
    }

    #[test]
    fn test_next_id_starts_at_one() {
        assert_eq!(next_id(&[]), 1);
    }

    #[test]
    fn test_next_id_skips_malformed_entries() {
        let entries = vec![
            json!({"id": 3, "src": "a"}),
            json!({"id": "7", "src": "b"}),
            json!({"src": "no id at all"}),
            json!({"id": null}),
        ];
        assert_eq!(next_id(&entries), 8);
    }

    #[test]
    fn test_decoded_entries_keep_their_order() {
        let raw = br#"[{"id": 2, "src": "b"}, {"id": 1, "src": "a"}]"#;
        let entries = decode_entries(raw);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id"], 2);
    }
}
