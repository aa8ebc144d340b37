use thiserror::Error;

/// Error type for catalog and guide operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GuideError {
    /// Server answered with a non-success status
    #[error("Server returned {0} for {1}")]
    Http(u16, String),

    /// Request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The owning load was cancelled before completion
    #[error("Load cancelled")]
    Cancelled,

    /// Key-value store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Stored settings are unreadable
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GuideError {
    /// Get detailed diagnostic information about the error
    pub fn diagnostics(&self) -> String {
        match self {
            GuideError::Http(status, url) => {
                format!("Server Error\nStatus: {}\nURL: {}\nSuggestion: Check the server address and try again later", status, url)
            }
            GuideError::Network(source) => {
                format!("Network Error\nError: {}\nSuggestion: Check your internet connection", source)
            }
            GuideError::Parse(source) => {
                format!("Parse Error\nError: {}\nSuggestion: Provider response is invalid", source)
            }
            GuideError::Cancelled => "Cancelled\nA newer load replaced this one".to_string(),
            GuideError::Storage(source) => {
                format!("Storage Error\nError: {}\nSuggestion: Check disk space and permissions", source)
            }
            GuideError::Config(source) => {
                format!("Configuration Error\nError: {}\nSuggestion: Re-enter your settings", source)
            }
        }
    }

    /// Whether this error should be shown to the user at all
    pub fn is_silent(&self) -> bool {
        matches!(self, GuideError::Cancelled)
    }
}

impl From<anyhow::Error> for GuideError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(GuideError::Http(status, url)) = err.downcast_ref::<GuideError>() {
            return GuideError::Http(*status, url.clone());
        }
        if let Some(req) = err.downcast_ref::<reqwest::Error>() {
            if req.is_decode() {
                return GuideError::Parse(req.to_string());
            }
            if let Some(status) = req.status() {
                let url = req.url().map(|u| u.to_string()).unwrap_or_default();
                return GuideError::Http(status.as_u16(), url);
            }
            return GuideError::Network(req.to_string());
        }
        GuideError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GuideError {
    fn from(err: serde_json::Error) -> Self {
        GuideError::Config(err.to_string())
    }
}

impl From<std::io::Error> for GuideError {
    fn from(err: std::io::Error) -> Self {
        GuideError::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GuideError>;

/// Catalog loading progress, as shown in the status line
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingProgress {
    pub stage: LoadingStage,
    pub percent: u8,
}

impl LoadingProgress {
    pub fn new(stage: LoadingStage) -> Self {
        let percent = stage.percent();
        Self { stage, percent }
    }

    pub fn to_message(&self) -> String {
        format!("{} [{}%]", self.stage.display_name(), self.percent)
    }
}

/// Loading stages of a catalog load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadingStage {
    Authenticating,
    DownloadingChannels,
    Processing,
    Ready,
    NoChannels,
    ConnectionFailed,
}

impl LoadingStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            LoadingStage::Authenticating => "Authenticating...",
            LoadingStage::DownloadingChannels => "Downloading Channels...",
            LoadingStage::Processing => "Processing...",
            LoadingStage::Ready => "Ready",
            LoadingStage::NoChannels => "No channels found",
            LoadingStage::ConnectionFailed => "Connection Failed",
        }
    }

    pub fn percent(&self) -> u8 {
        match self {
            LoadingStage::Authenticating => 20,
            LoadingStage::DownloadingChannels => 50,
            LoadingStage::Processing => 80,
            LoadingStage::Ready => 100,
            LoadingStage::NoChannels | LoadingStage::ConnectionFailed => 0,
        }
    }
}
