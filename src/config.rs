use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub jwt_secret: String,
    pub jwt_access_ttl_secs: i64,
    pub jwt_refresh_ttl_secs: i64,

    // Race search provider
    pub race_search_base_url: String,
    pub race_search_api_key: String,
    pub race_search_radius_miles: u32,
    pub race_search_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://runfree.db?mode=rwc".into()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_access_ttl_secs: env::var("JWT_ACCESS_TTL_SECS")
                .unwrap_or_else(|_| "900".into())
                .parse()
                .expect("JWT_ACCESS_TTL_SECS must be a number"),
            jwt_refresh_ttl_secs: env::var("JWT_REFRESH_TTL_SECS")
                .unwrap_or_else(|_| "604800".into())
                .parse()
                .expect("JWT_REFRESH_TTL_SECS must be a number"),

            race_search_base_url: env::var("RACE_SEARCH_BASE_URL")
                .unwrap_or_else(|_| "http://api.amp.active.com/v2/search".into()),
            race_search_api_key: env::var("RACE_SEARCH_API_KEY").unwrap_or_else(|_| String::new()),
            race_search_radius_miles: env::var("RACE_SEARCH_RADIUS_MILES")
                .unwrap_or_else(|_| "50".into())
                .parse()
                .unwrap_or(50),
            race_search_timeout_secs: env::var("RACE_SEARCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            jwt_secret: "test-secret".into(),
            jwt_access_ttl_secs: 900,
            jwt_refresh_ttl_secs: 3600,
            race_search_base_url: "http://races.test/v2/search".into(),
            race_search_api_key: "key".into(),
            race_search_radius_miles: 25,
            race_search_timeout_secs: 5,
        }
    }
}
