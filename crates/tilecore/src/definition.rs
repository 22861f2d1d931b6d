use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel left behind by scaffolding tools when a descriptor has never
/// been saved. Treated as "no id assigned yet".
pub const PLACEHOLDER_ID: &str = "{{{definition_id}}}";

/// Storage category a definition is routed to, selected by the descriptor's
/// `style` field. Anything that is not an activity stream is a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DefinitionStyle {
    Activity,
    #[default]
    Tile,
}

impl From<String> for DefinitionStyle {
    fn from(s: String) -> Self {
        if s == "ACTIVITY" {
            DefinitionStyle::Activity
        } else {
            DefinitionStyle::Tile
        }
    }
}

impl From<DefinitionStyle> for String {
    fn from(style: DefinitionStyle) -> Self {
        match style {
            DefinitionStyle::Activity => "ACTIVITY".to_string(),
            DefinitionStyle::Tile => "TILE".to_string(),
        }
    }
}

/// A definition descriptor as read from `definition.json`, and the record
/// shape both stores persist.
///
/// `definition_dir_name` is the linkage back to the directory the descriptor
/// came from. The loader always overwrites it with the real directory name;
/// the value inside the file is never trusted, because reconciliation uses it
/// to decide which stored records are still backed by the filesystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub style: DefinitionStyle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_dir_name: Option<String>,

    /// Stamped by the store on every save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// All other descriptor fields, passed through unchanged.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Definition {
    /// Reset a literal placeholder id to absent so the store treats the
    /// record as "create new" rather than updating a record literally named
    /// with the placeholder token.
    pub fn normalize_placeholder_id(&mut self) {
        if self.id.as_deref() == Some(PLACEHOLDER_ID) {
            self.id = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_defaults_to_tile() {
        let def: Definition = serde_json::from_str(r#"{"name": "my-tile"}"#).unwrap();
        assert_eq!(def.style, DefinitionStyle::Tile);
    }

    #[test]
    fn activity_style_is_recognized() {
        let def: Definition = serde_json::from_str(r#"{"style": "ACTIVITY"}"#).unwrap();
        assert_eq!(def.style, DefinitionStyle::Activity);
    }

    #[test]
    fn unknown_style_falls_back_to_tile() {
        let def: Definition = serde_json::from_str(r#"{"style": "CAROUSEL"}"#).unwrap();
        assert_eq!(def.style, DefinitionStyle::Tile);
    }

    #[test]
    fn placeholder_id_is_normalized_to_none() {
        let mut def: Definition =
            serde_json::from_str(r#"{"id": "{{{definition_id}}}"}"#).unwrap();
        def.normalize_placeholder_id();
        assert!(def.id.is_none());
    }

    #[test]
    fn real_id_survives_normalization() {
        let mut def: Definition = serde_json::from_str(r#"{"id": "abc-123"}"#).unwrap();
        def.normalize_placeholder_id();
        assert_eq!(def.id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn extra_fields_pass_through() {
        let def: Definition = serde_json::from_str(
            r#"{"name": "weather", "displayName": "Weather Tile", "style": "ACTIVITY"}"#,
        )
        .unwrap();
        assert_eq!(
            def.extra.get("displayName").and_then(|v| v.as_str()),
            Some("Weather Tile")
        );

        let round = serde_json::to_value(&def).unwrap();
        assert_eq!(round["name"], "weather");
        assert_eq!(round["style"], "ACTIVITY");
    }
}
