/// Trait for loading service configuration from environment variables.
///
/// Implementors should derive `serde::Deserialize` and then call
/// `Config::from_env()` to load configuration at startup. Field names map to
/// upper-cased env vars (`database_url` ← `DATABASE_URL`).
///
/// # Panics
///
/// Panics if any required env var is missing or cannot be deserialized.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Self {
        envy::from_env().expect("failed to load config from environment")
    }

    /// Fallible variant of [`Config::from_env`] reading from an explicit iterator.
    fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }
}
