//! Forum configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `REDDITCLONE_*` environment variables, or a
//! configuration file, in OrthoConfig's usual precedence.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::auth::DEFAULT_TOKEN_TTL_HOURS;

/// Settings for the in-memory forum core.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REDDITCLONE")]
pub struct ForumSettings {
    /// Secret used to sign bearer tokens. Required.
    pub token_secret: Option<String>,
    /// Bearer token lifetime in hours.
    #[ortho_config(default = 168)]
    pub token_ttl_hours: u64,
}

impl std::fmt::Debug for ForumSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForumSettings")
            .field(
                "token_secret",
                &self.token_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

impl ForumSettings {
    /// Settings with the given secret and the default lifetime.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            token_secret: Some(secret.into()),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        }
    }

    /// The signing secret, if one is configured and not blank.
    pub fn token_secret(&self) -> Option<&str> {
        self.token_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for forum configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ForumSettings {
        ForumSettings::load_from_iter([OsString::from("redditclone")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("REDDITCLONE_TOKEN_SECRET", None::<String>),
            ("REDDITCLONE_TOKEN_TTL_HOURS", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.token_secret().is_none());
        assert_eq!(settings.token_ttl_hours, DEFAULT_TOKEN_TTL_HOURS);
    }

    #[rstest]
    fn attribute_default_matches_the_issuer_default() {
        let _guard = lock_env([("REDDITCLONE_TOKEN_TTL_HOURS", None::<String>)]);

        let loaded = load_from_empty_args().token_ttl_hours;
        let constructed = ForumSettings::with_secret("s3cret").token_ttl_hours;

        assert_eq!(loaded, DEFAULT_TOKEN_TTL_HOURS);
        assert_eq!(loaded, constructed);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("REDDITCLONE_TOKEN_SECRET", Some("s3cret".to_owned())),
            ("REDDITCLONE_TOKEN_TTL_HOURS", Some("2".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.token_secret(), Some("s3cret"));
        assert_eq!(settings.token_ttl_hours, 2);
    }

    #[rstest]
    #[case(Some("   "))]
    #[case(Some(""))]
    #[case(None)]
    fn blank_secrets_count_as_missing(#[case] secret: Option<&str>) {
        let settings = ForumSettings {
            token_secret: secret.map(str::to_owned),
            token_ttl_hours: 1,
        };

        assert!(settings.token_secret().is_none());
    }

    #[rstest]
    fn debug_output_redacts_the_secret() {
        let rendered = format!("{:?}", ForumSettings::with_secret("s3cret"));

        assert!(!rendered.contains("s3cret"));
    }
}
