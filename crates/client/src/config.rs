use std::path::PathBuf;

/// Path of the login page on the public site.
pub const LOGIN_PATH: &str = "/login";

/// Path of the order page the login page sends the customer back to.
pub const ORDER_PAGE_PATH: &str = "/commander";

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against the
/// platform running on its dev ports.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the platform API (default: `http://localhost:3000`).
    pub api_base_url: String,
    /// Base URL of the public site, used for login redirects
    /// (default: `http://localhost:5173`).
    pub frontend_url: String,
    /// File holding the session token.
    pub session_file: PathBuf,
    /// Token taken from the environment; wins over `session_file`.
    pub session_token: Option<String>,
    /// File holding an order parked until login.
    pub pending_order_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                              |
    /// |----------------------|--------------------------------------|
    /// | `API_BASE_URL`       | `http://localhost:3000`              |
    /// | `FRONTEND_URL`       | `http://localhost:5173`              |
    /// | `SESSION_FILE`       | `.vitegourmand/session.token`        |
    /// | `SESSION_TOKEN`      | unset                                |
    /// | `PENDING_ORDER_FILE` | `.vitegourmand/pending-order.json`   |
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        let session_file = std::env::var("SESSION_FILE")
            .unwrap_or_else(|_| ".vitegourmand/session.token".into())
            .into();

        let session_token = std::env::var("SESSION_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let pending_order_file = std::env::var("PENDING_ORDER_FILE")
            .unwrap_or_else(|_| ".vitegourmand/pending-order.json".into())
            .into();

        Self {
            api_base_url,
            frontend_url,
            session_file,
            session_token,
            pending_order_file,
        }
    }

    /// Login URL that brings the customer back to the order page.
    pub fn auth_redirect(&self) -> String {
        format!(
            "{}{LOGIN_PATH}?redirect={ORDER_PAGE_PATH}",
            self.frontend_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_redirect_points_back_to_order_page() {
        let config = ClientConfig {
            api_base_url: "http://localhost:3000".into(),
            frontend_url: "https://vite-gourmand.fr".into(),
            session_file: "session.token".into(),
            session_token: None,
            pending_order_file: "pending.json".into(),
        };
        assert_eq!(
            config.auth_redirect(),
            "https://vite-gourmand.fr/login?redirect=/commander"
        );
    }
}
