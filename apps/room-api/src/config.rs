/// Room API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Places API key used by the live candidate source.
    pub google_api_key: String,
    /// Default nearby-search radius in meters.
    pub places_radius_m: u32,
    /// Port the HTTP server binds to.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Panics with a descriptive message if a required variable is missing.
    pub fn from_env() -> Self {
        Self {
            google_api_key: required_var("GOOGLE_API_KEY"),
            places_radius_m: std::env::var("PLACES_RADIUS_M")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4010),
        }
    }
}

fn required_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{name} env var is required"))
}
