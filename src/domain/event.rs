use serde::Deserialize;

/// Slack Events API envelope, dispatched on the `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    #[serde(rename = "url_verification")]
    UrlVerification {
        token: Option<String>,
        challenge: String,
    },
    #[serde(rename = "event_callback")]
    EventCallback {
        token: Option<String>,
        event_id: String,
        #[serde(default)]
        event_time: i64,
        event: CallbackEvent,
    },
    /// Envelope types the pipeline does not act on (e.g. `app_rate_limited`).
    #[serde(other)]
    Other,
}

/// Inner event of an `event_callback` envelope. Only `file_share` message
/// events carry files; everything else is acknowledged and dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub subtype: Option<String>,
    pub channel: Option<String>,
    pub ts: Option<String>,
    pub user: Option<String>,
    #[serde(default)]
    pub files: Vec<FileInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub id: String,
    pub mimetype: Option<String>,
    pub size: Option<u64>,
    pub url_private: Option<String>,
}

impl CallbackEvent {
    pub fn is_file_share(&self) -> bool {
        self.kind == "message" && self.subtype.as_deref() == Some("file_share")
    }
}
