//! Runtime configuration

/// Storefront configuration, read from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub backend_anon_key: String,
    /// Account granted admin access regardless of its profile row
    pub admin_email: String,
    pub postal_api_url: String,
    pub environment: String,
}

impl Config {
    /// Load `.env` (if present) and read configuration
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self {
            backend_url: std::env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:54321".into()),
            backend_anon_key: std::env::var("BACKEND_ANON_KEY").unwrap_or_default(),
            admin_email: std::env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@mixmagazine.com".into()),
            postal_api_url: std::env::var("POSTAL_API_URL")
                .unwrap_or_else(|_| "https://viacep.com.br".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_env();
        assert_eq!(config.backend_url, "http://localhost:54321");
        assert_eq!(config.admin_email, "admin@mixmagazine.com");
        assert_eq!(config.postal_api_url, "https://viacep.com.br");
        assert!(!config.is_production());
    }

    #[test]
    fn test_production_flag() {
        let mut config = Config::from_env();
        config.environment = "production".into();
        assert!(config.is_production());
    }
}
