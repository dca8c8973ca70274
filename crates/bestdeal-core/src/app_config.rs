use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How each scrape session gets its browser.
#[derive(Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    /// DevTools websocket URL of an already-running browser. When set, sessions
    /// connect instead of launching a local process.
    pub remote_url: Option<String>,
    pub user_agent: String,
}

impl std::fmt::Debug for BrowserSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSettings")
            .field("headless", &self.headless)
            .field("chrome_executable", &self.chrome_executable)
            .field("remote_url", &self.remote_url.as_ref().map(|_| "[redacted]"))
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Site keys enabled for every search, in registry order.
    pub sources: Vec<String>,
    pub worker_pool_size: usize,
    pub browser: BrowserSettings,
    pub element_timeout_secs: u64,
    pub typing_delay_ms: u64,
    pub recovery_max_clicks: u32,
    pub recovery_settle_ms: u64,
    pub empty_results_is_error: bool,
    pub geo_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("sources", &self.sources)
            .field("worker_pool_size", &self.worker_pool_size)
            .field("browser", &self.browser)
            .field("element_timeout_secs", &self.element_timeout_secs)
            .field("typing_delay_ms", &self.typing_delay_ms)
            .field("recovery_max_clicks", &self.recovery_max_clicks)
            .field("recovery_settle_ms", &self.recovery_settle_ms)
            .field("empty_results_is_error", &self.empty_results_is_error)
            .field("geo_timeout_secs", &self.geo_timeout_secs)
            .finish()
    }
}
