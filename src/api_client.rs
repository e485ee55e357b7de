use crate::error::AppError;
use crate::models::{BadgeRecord, Medal, MedalConfig, UNKNOWN_DATE, null_as_default};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const LEETCODE_BASE_URL: &str = "https://leetcode.com";
pub const LEETCODE_CN_BASE_URL: &str = "https://leetcode.cn";

const GRAPHQL_ENDPOINT: &str = "/graphql";
const STATIC_PATH_PREFIX: &str = "/static/";
const CN_MEDAL_PAGE_SIZE: u32 = 100;

const USER_BADGES_QUERY: &str = r#"
query userBadges($username: String!) {
  matchedUser(username: $username) {
    badges {
      id
      name
      shortName
      displayName
      icon
      hoverText
      creationDate
      medal {
        slug
        config {
          iconGif
          iconGifBackground
        }
      }
    }
  }
}
"#;

const USER_MEDALS_CN_QUERY: &str = r#"
query userBadges($userSlug: String!, $limit: Int, $skip: Int) {
  userProfileUserMedals(userSlug: $userSlug, limit: $limit, skip: $skip) {
    ...medalNodeFragment
  }
  userProfileUserNextMedal(userSlug: $userSlug) {
    ...medalNodeFragment
  }
}

fragment medalNodeFragment on MedalNodeV2 {
  slug
  name
  obtainDate
  category
  config {
    icon
    iconGif
    iconGifBackground
  }
  progress
  id
  year
  month
}
"#;

// --- Data Structures for API Communication ---

#[derive(Serialize)]
struct GraphQlRequest<'a, V: Serialize> {
    query: &'a str,
    variables: V,
}

#[derive(Serialize)]
struct UserBadgesVariables<'a> {
    username: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserMedalsVariables<'a> {
    user_slug: &'a str,
    limit: u32,
    skip: u32,
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Value>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct MatchedUserData {
    matched_user: Option<MatchedUser>,
}

#[derive(Deserialize, Debug)]
struct MatchedUser {
    #[serde(default, deserialize_with = "null_as_default")]
    badges: Vec<BadgeRecord>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UserMedalsData {
    #[serde(default, deserialize_with = "null_as_default")]
    user_profile_user_medals: Vec<MedalNode>,
    user_profile_user_next_medal: Option<MedalNode>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct MedalNode {
    #[serde(default)]
    id: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    slug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    obtain_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    config: MedalNodeConfig,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct MedalNodeConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    icon: String,
    #[serde(default, deserialize_with = "null_as_default")]
    icon_gif: String,
    icon_gif_background: Option<String>,
}

// --- Badge Sources ---

/// Anything that can list the badges earned by an account.
#[async_trait]
pub trait BadgeSource: Send + Sync {
    async fn fetch_badges(&self, username: &str) -> Result<Vec<BadgeRecord>, AppError>;

    /// Site root, used to resolve relative icon paths.
    fn base_url(&self) -> &str;
}

/// Run a fetch and degrade any failure to an empty list after reporting it.
pub async fn fetch_or_report(source: &dyn BadgeSource, username: &str) -> Vec<BadgeRecord> {
    match source.fetch_badges(username).await {
        Ok(badges) => badges,
        Err(e) => {
            println!("{}", e);
            tracing::debug!(error = ?e, "badge query failed");
            Vec::new()
        }
    }
}

async fn post_graphql<V, T>(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
    variables: V,
) -> Result<T, AppError>
where
    V: Serialize + Send,
    T: DeserializeOwned + Send,
{
    let url = format!("{}{}", base_url, GRAPHQL_ENDPOINT);
    let request_body = GraphQlRequest { query, variables };

    tracing::debug!(%url, "sending badge query");
    let response = client
        .post(&url)
        .header(reqwest::header::REFERER, base_url)
        .json(&request_body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::HttpStatus(response.status()));
    }

    let body: GraphQlResponse<T> = serde_json::from_slice(&response.bytes().await?)?;
    if let Some(errors) = body.errors {
        return Err(AppError::GraphQlError(errors.to_string()));
    }
    body.data
        .ok_or_else(|| AppError::GraphQlError("response carried no data".to_string()))
}

/// Client for the international site.
pub struct LeetCodeClient {
    client: reqwest::Client,
    base_url: String,
}

impl LeetCodeClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BadgeSource for LeetCodeClient {
    async fn fetch_badges(&self, username: &str) -> Result<Vec<BadgeRecord>, AppError> {
        let data: MatchedUserData = post_graphql(
            &self.client,
            &self.base_url,
            USER_BADGES_QUERY,
            UserBadgesVariables { username },
        )
        .await?;

        let user = data
            .matched_user
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;
        Ok(user
            .badges
            .into_iter()
            .map(|badge| normalize_badge(badge, &self.base_url))
            .collect())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn resolve_static_path(url: String, base_url: &str) -> String {
    if url.starts_with(STATIC_PATH_PREFIX) {
        format!("{}{}", base_url, url)
    } else {
        url
    }
}

fn normalize_badge(mut badge: BadgeRecord, base_url: &str) -> BadgeRecord {
    badge.icon = resolve_static_path(badge.icon, base_url);
    badge.medal.config.icon_gif = resolve_static_path(badge.medal.config.icon_gif, base_url);
    if badge.creation_date.is_empty() {
        badge.creation_date = UNKNOWN_DATE.to_string();
    }
    badge
}

/// Client for the China site, whose medal schema differs from the international one.
pub struct LeetCodeCnClient {
    client: reqwest::Client,
    base_url: String,
}

impl LeetCodeCnClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BadgeSource for LeetCodeCnClient {
    async fn fetch_badges(&self, username: &str) -> Result<Vec<BadgeRecord>, AppError> {
        let data: UserMedalsData = post_graphql(
            &self.client,
            &self.base_url,
            USER_MEDALS_CN_QUERY,
            UserMedalsVariables {
                user_slug: username,
                limit: CN_MEDAL_PAGE_SIZE,
                skip: 0,
            },
        )
        .await?;

        if let Some(next) = &data.user_profile_user_next_medal {
            tracing::debug!(medal = %next.name, "next medal (not rendered)");
        }

        Ok(data
            .user_profile_user_medals
            .into_iter()
            .map(|node| medal_to_badge(node, &self.base_url))
            .collect())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn absolutize(url: String, base_url: &str) -> String {
    if url.starts_with("http") {
        url
    } else {
        format!("{}{}", base_url, url)
    }
}

fn id_to_string(id: Value) -> String {
    match id {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn medal_to_badge(node: MedalNode, base_url: &str) -> BadgeRecord {
    let creation_date = node
        .obtain_date
        .filter(|date| !date.is_empty())
        .map(|date| date.split('T').next().unwrap_or_default().to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string());
    let icon_gif_background = node
        .config
        .icon_gif_background
        .filter(|url| url.starts_with("http"))
        .unwrap_or_default();

    BadgeRecord {
        id: id_to_string(node.id),
        short_name: node.name.clone(),
        display_name: node.name.clone(),
        hover_text: node.name.clone(),
        name: node.name,
        icon: absolutize(node.config.icon, base_url),
        creation_date,
        medal: Medal {
            slug: node.slug,
            config: MedalConfig {
                icon_gif: absolutize(node.config.icon_gif, base_url),
                icon_gif_background,
            },
        },
    }
}
