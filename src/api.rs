use serde::{Deserialize, Serialize};

use crate::errors::GuideError;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Category {
    #[serde(deserialize_with = "id_string")]
    pub category_id: String,
    pub category_name: String,
    #[serde(default)]
    pub parent_id: serde_json::Value, // frequent null or 0
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Stream {
    #[serde(default)]
    pub num: Option<serde_json::Value>, // Sometimes int, sometimes string, sometimes missing
    #[serde(default)]
    pub name: String,

    #[serde(alias = "series_id", default)]
    pub stream_id: serde_json::Value, // Can be int or string

    #[serde(alias = "cover")]
    pub stream_icon: Option<String>,

    pub epg_channel_id: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub category_id: Option<String>,
    pub container_extension: Option<String>,
}

impl Stream {
    /// Provider channel number, when it is numeric
    pub fn number(&self) -> Option<i64> {
        match self.num.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Render a provider id (number, string or null) as a string
pub fn get_id_str(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    Ok(get_id_str(&v))
}

fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(v.map(|v| get_id_str(&v)).filter(|s| !s.is_empty()))
}

#[derive(Debug, Clone)]
pub struct XtreamClient {
    pub base_url: String,
    pub username: String,
    pub password: String,
    client: reqwest::Client,
}

impl XtreamClient {
    pub fn new(base_url: String, username: String, password: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .user_agent("FibreTV")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url,
            username,
            password,
            client,
        }
    }

    fn action_url(&self, action: &str) -> String {
        format!(
            "{}/player_api.php?username={}&password={}&action={}",
            self.base_url, self.username, self.password, action
        )
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, anyhow::Error> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GuideError::Http(status.as_u16(), url.to_string()).into());
        }
        Ok(resp.json().await?)
    }

    pub async fn get_live_categories(&self) -> Result<Vec<Category>, anyhow::Error> {
        self.get_json(&self.action_url("get_live_categories")).await
    }

    pub async fn get_vod_categories(&self) -> Result<Vec<Category>, anyhow::Error> {
        self.get_json(&self.action_url("get_vod_categories")).await
    }

    pub async fn get_series_categories(&self) -> Result<Vec<Category>, anyhow::Error> {
        self.get_json(&self.action_url("get_series_categories")).await
    }

    pub async fn get_live_streams(&self) -> Result<Vec<Stream>, anyhow::Error> {
        self.get_json(&self.action_url("get_live_streams")).await
    }

    pub async fn get_vod_streams(&self) -> Result<Vec<Stream>, anyhow::Error> {
        self.get_json(&self.action_url("get_vod_streams")).await
    }

    // Series listings come back as loosely-shaped objects; callers only display them.
    pub async fn get_series(&self) -> Result<Vec<serde_json::Value>, anyhow::Error> {
        self.get_json(&self.action_url("get_series")).await
    }

    pub fn xmltv_url(&self) -> String {
        format!(
            "{}/xmltv.php?username={}&password={}",
            self.base_url, self.username, self.password
        )
    }

    /// Download the full XMLTV document as text
    pub async fn fetch_xmltv(&self) -> Result<String, anyhow::Error> {
        let url = self.xmltv_url();
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GuideError::Http(status.as_u16(), url).into());
        }
        Ok(resp.text().await?)
    }

    pub fn get_stream_url(&self, stream_id: &str) -> String {
        format!(
            "{}/live/{}/{}/{}.m3u8",
            self.base_url, self.username, self.password, stream_id
        )
    }

    pub fn get_vod_url(&self, stream_id: &str, extension: &str) -> String {
        format!(
            "{}/movie/{}/{}/{}.{}",
            self.base_url, self.username, self.password, stream_id, extension
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trailing_slash_stripped() {
        let c = XtreamClient::new("http://host:8080/".into(), "u".into(), "p".into());
        assert_eq!(c.xmltv_url(), "http://host:8080/xmltv.php?username=u&password=p");
        assert_eq!(c.get_stream_url("42"), "http://host:8080/live/u/p/42.m3u8");
        assert_eq!(c.get_vod_url("7", "mkv"), "http://host:8080/movie/u/p/7.mkv");
    }

    #[test]
    fn test_stream_flexible_fields() {
        let raw = json!([
            {"num": 3, "name": "A", "stream_id": 101, "epg_channel_id": "a.uk", "category_id": "5"},
            {"num": "1", "name": "B", "stream_id": "102", "epg_channel_id": null, "category_id": 5},
            {"name": "C", "stream_id": 103}
        ]);
        let streams: Vec<Stream> = serde_json::from_value(raw).unwrap();
        assert_eq!(streams[0].number(), Some(3));
        assert_eq!(streams[1].number(), Some(1));
        assert_eq!(streams[2].number(), None);
        assert_eq!(get_id_str(&streams[0].stream_id), "101");
        assert_eq!(get_id_str(&streams[1].stream_id), "102");
        assert_eq!(streams[1].category_id.as_deref(), Some("5"));
        assert_eq!(streams[2].category_id, None);
    }

    #[test]
    fn test_category_numeric_id() {
        let cats: Vec<Category> =
            serde_json::from_value(json!([{"category_id": 9, "category_name": "News", "parent_id": 0}])).unwrap();
        assert_eq!(cats[0].category_id, "9");
    }
}
