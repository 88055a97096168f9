use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Environment variable holding an explicit host executable path.
    #[serde(default = "default_host_path_var")]
    pub host_path_var: String,

    /// Host looked up on the search path when no override is set.
    #[serde(default = "default_host")]
    pub default_host: String,

    /// Command line used for the version probe.
    #[serde(default = "default_probe_argument")]
    pub probe_argument: String,
}

fn default_host_path_var() -> String {
    "DOTNET_HOST_PATH".to_string()
}

fn default_host() -> String {
    "dotnet".to_string()
}

fn default_probe_argument() -> String {
    "--info".to_string()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            host_path_var: default_host_path_var(),
            default_host: default_host(),
            probe_argument: default_probe_argument(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Log file; logs go to stderr when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_filter() -> String {
    "off".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}
