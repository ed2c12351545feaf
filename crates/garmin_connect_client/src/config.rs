use crate::{Credentials, GarminError};
use secrecy::SecretString;

pub const DEFAULT_BASE_URL: &str = "https://connect.garmin.com";
pub const DEFAULT_SSO_URL: &str = "https://sso.garmin.com/sso";

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub sso_url: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl Config {
    pub fn from_env() -> Result<Self, GarminError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, GarminError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url = get("GARMIN_CONNECT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let sso_url = get("GARMIN_CONNECT_SSO_URL").unwrap_or_else(|| DEFAULT_SSO_URL.into());
        for (name, url) in [
            ("GARMIN_CONNECT_BASE_URL", &base_url),
            ("GARMIN_CONNECT_SSO_URL", &sso_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(GarminError::Config(format!(
                    "{name} is not an http(s) URL: {url}"
                )));
            }
        }
        Ok(Self {
            base_url,
            sso_url,
            username: get("GARMIN_CONNECT_USERNAME").filter(|u| !u.is_empty()),
            password: get("GARMIN_CONNECT_PASSWORD").map(|p| SecretString::new(p.into())),
        })
    }

    /// Combine values given explicitly (e.g. on the command line) with the
    /// environment; explicit values win.
    pub fn credentials(
        &self,
        username: Option<String>,
        password: Option<SecretString>,
    ) -> Result<Credentials, GarminError> {
        let username = username
            .or_else(|| self.username.clone())
            .ok_or_else(|| GarminError::Config("GARMIN_CONNECT_USERNAME missing".into()))?;
        let password = password
            .or_else(|| self.password.clone())
            .ok_or_else(|| GarminError::Config("GARMIN_CONNECT_PASSWORD missing".into()))?;
        Ok(Credentials::new(username, password))
    }
}
