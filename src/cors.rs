use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};

/// CORS policy letting the desktop UI call the game API from its own origin.
pub fn create_cors(allowed_origins: &[String]) -> rocket_cors::Cors {
    CorsOptions {
        allowed_origins: AllowedOrigins::some_exact(allowed_origins),
        allowed_methods: [Method::Get, Method::Post, Method::Delete, Method::Options]
            .into_iter()
            .map(|m| m.into())
            .collect(),
        allowed_headers: AllowedHeaders::some(&["Accept", "Content-Type", "X-Requested-With"]),
        allow_credentials: false,
        ..Default::default()
    }
    .to_cors()
    .expect("Failed to create CORS configuration")
}
