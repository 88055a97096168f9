use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("failed to spawn process: {program}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for process: {program}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl LauncherError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LauncherError::Launch { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Cannot determine SDK version!")]
    UnknownVersion,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("io error while relaying: {stream}")]
    Io {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {encoding} sequence on {stream}")]
    Decode {
        stream: &'static str,
        encoding: &'static str,
    },

    #[error("relay task for {stream} did not complete")]
    Join {
        stream: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("config read error: {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error")]
    Parse(#[source] toml::de::Error),
}
