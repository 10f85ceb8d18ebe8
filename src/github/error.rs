/// Classification of GitHub API failures
///
/// Requests are never retried; the classification only decides how a failure
/// is logged and reported to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Rate limiting (429, or 403 with a rate limit message)
    RateLimit(String),
    /// Network, TLS or timeout failures before a response arrived
    Transport(String),
    /// 5xx responses
    Server(String),
    /// 4xx responses other than rate limiting
    Client(String),
    /// A response arrived but could not be understood
    InvalidResponse(String),
}

impl ApiError {
    /// Convert octocrab error to the matching category
    pub fn from_octocrab_error(error: octocrab::Error) -> Self {
        tracing::debug!("Raw octocrab error: {:?}", error);

        let result = match &error {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                let detailed_error = format!(
                    "GitHub API error - Status: {}, Message: {:?}, Documentation: {:?}",
                    status, source.message, source.documentation_url
                );

                match status {
                    429 => {
                        tracing::warn!("Rate limit (429) detected for GitHub API request");
                        Self::RateLimit(detailed_error)
                    }
                    403 if source.message.to_lowercase().contains("rate limit") => {
                        tracing::warn!(
                            "Rate limit (403) detected for GitHub API request: {}",
                            source.message
                        );
                        Self::RateLimit(detailed_error)
                    }
                    400..=499 => {
                        tracing::error!("Client error ({}): {}", status, detailed_error);
                        Self::Client(detailed_error)
                    }
                    500..=599 => {
                        tracing::error!("Server error ({}): {}", status, detailed_error);
                        Self::Server(detailed_error)
                    }
                    _ => {
                        tracing::error!("Unexpected status code ({}): {}", status, detailed_error);
                        Self::InvalidResponse(detailed_error)
                    }
                }
            }
            octocrab::Error::Http { .. } => {
                let error_msg = format!("HTTP layer error: {}", error);
                tracing::error!("{}", error_msg);
                Self::Transport(error_msg)
            }
            octocrab::Error::Hyper { .. } => {
                let error_msg = format!("Hyper HTTP error: {}", error);
                tracing::error!("{}", error_msg);
                Self::Transport(error_msg)
            }
            octocrab::Error::Service { .. } => {
                let error_msg = format!("HTTP service error: {}", error);
                tracing::error!("{}", error_msg);
                Self::Transport(error_msg)
            }
            octocrab::Error::Json { .. } => {
                let error_msg = format!("JSON parsing error: {}", error);
                tracing::error!("{}", error_msg);
                Self::InvalidResponse(error_msg)
            }
            octocrab::Error::Uri { .. } => {
                let error_msg = format!("URI parsing error: {}", error);
                tracing::error!("{}", error_msg);
                Self::Client(error_msg)
            }
            _ => {
                let error_msg = format!("Unknown error type: {}", error);
                tracing::error!("{}", error_msg);
                Self::Transport(error_msg)
            }
        };

        tracing::debug!("Error classification result: {:?}", result);
        result
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimit(_))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit(msg) => write!(f, "GitHub rate limit exceeded: {}", msg),
            Self::Transport(msg) => write!(f, "Transport error: {}", msg),
            Self::Server(msg) => write!(f, "GitHub server error: {}", msg),
            Self::Client(msg) => write!(f, "GitHub request rejected: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid GitHub response: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
