use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel used when a badge carries no earned date.
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// A badge normalized to one shape regardless of which site reported it.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BadgeRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hover_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub creation_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub medal: Medal,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Medal {
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: MedalConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedalConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon_gif: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon_gif_background: String,
}

// GraphQL answers `null` for unset fields, which serde's `default` alone does not cover.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
