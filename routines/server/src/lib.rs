pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Config {
        pub db_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        pub jwt_secret: String,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default().try_parsing(true))
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_port() -> u16 {
        8080
    }

    #[cfg(test)]
    mod tests {
        #[test]
        fn port_defaults_to_8080() {
            let settings = config::Config::builder()
                .set_override("db_url", "sqlite::memory:")
                .unwrap()
                .set_override("jwt_secret", "secret")
                .unwrap()
                .build()
                .unwrap();

            let config: super::Config = settings.try_deserialize().unwrap();
            assert_eq!(config.port, 8080);
            assert_eq!(config.jwt_secret, "secret");
        }
    }
}
pub mod auth;
pub mod entities;
pub mod routine;
pub mod user;
pub mod web;
