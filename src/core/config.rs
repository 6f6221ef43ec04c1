mod parsing;
mod secret;
mod settings;
mod types;

pub(crate) use types::Settings;

#[cfg(test)]
mod tests {
    use super::types::{ConfigError, Environment};
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn load_uses_defaults_in_development() {
        let _guard = test_support::env_lock().await;
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::remove_var("COLLEGE_ENV");
        std::env::remove_var("COLLEGE_STRICT_CONFIG");
        std::env::remove_var("UPLOAD_DIR");
        std::env::remove_var("API_PREFIX");

        let settings = Settings::load().expect("settings");

        assert_eq!(settings.runtime().environment, Environment::Development);
        assert_eq!(settings.api().api_prefix, "/api");
        assert_eq!(settings.storage().upload_dir, "uploads");
        assert_eq!(settings.security().secret_key, "test-secret");
    }

    #[tokio::test]
    async fn strict_config_requires_superuser_password() {
        let _guard = test_support::env_lock().await;
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::set_var("COLLEGE_STRICT_CONFIG", "1");
        std::env::set_var("DATABASE_URL", "postgresql://u:p@localhost/db");
        std::env::remove_var("FIRST_SUPERUSER_PASSWORD");

        let result = Settings::load();

        std::env::remove_var("COLLEGE_STRICT_CONFIG");
        std::env::remove_var("DATABASE_URL");
        assert!(matches!(result, Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"))));
    }

    #[tokio::test]
    async fn rejects_zero_upload_limit() {
        let _guard = test_support::env_lock().await;
        std::env::set_var("SECRET_KEY", "test-secret");
        std::env::set_var("MAX_UPLOAD_SIZE_MB", "0");

        let result = Settings::load();

        std::env::remove_var("MAX_UPLOAD_SIZE_MB");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field: "MAX_UPLOAD_SIZE_MB", .. })
        ));
    }
}
