use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Where the TakeNotes API lives. The base URL may be a bare origin or
/// carry a path prefix; request paths are appended to it either way.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
}

impl ClientConfig {
    pub fn new(mut base_url: Url) -> Self {
        // Keep a trailing slash on the base path so joining request paths
        // appends to a prefix like https://host/takenotes instead of
        // replacing it.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { base_url }
    }

    /// Read `TAKENOTES_API_BASE`, falling back to the localhost dev server.
    /// The base may carry a path prefix; request paths are appended to it.
    pub fn from_env() -> Result<Self, url::ParseError> {
        let raw =
            std::env::var("TAKENOTES_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        Ok(Self::new(Url::parse(&raw)?))
    }
}
