use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};

use crate::config::Config;
use crate::model::role::Role;
use crate::models::{Claims, TokenType};

pub const SECRET: &str = "test-secret";

pub fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        database_url: None,
        jwt_secret: SECRET.into(),
        api_prefix: "/api".into(),
        rate_api_per_min: 1000,
        rate_actions_per_min: 120,
        annual_leave_days: 25,
        log_dir: "logs".into(),
        log_level: tracing::Level::DEBUG,
        run_migrations: false,
    }
}

pub fn mint_token(user_id: u64, role: u8, employee_id: Option<u64>, token_type: TokenType, ttl_secs: i64) -> String {
    let claims = Claims {
        user_id,
        sub: format!("user{user_id}"),
        role,
        exp: (Utc::now().timestamp() + ttl_secs) as usize,
        jti: format!("test-{user_id}"),
        token_type,
        employee_id,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

pub fn bearer(user_id: u64, role: Role, employee_id: Option<u64>) -> (&'static str, String) {
    let token = mint_token(user_id, role as u8, employee_id, TokenType::Access, 600);
    ("Authorization", format!("Bearer {token}"))
}

/// Test service over `$store` (an `Arc` of any `LeaveStore`), without rate limiting.
macro_rules! leave_app {
    ($store:expr) => {{
        let store: std::sync::Arc<dyn $crate::store::LeaveStore> = $store;
        let config = $crate::test_support::test_config();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::from(store))
                .app_data(actix_web::web::Data::new(config.clone()))
                .configure(|cfg| $crate::routes::configure(cfg, &config, false)),
        )
        .await
    }};
}

pub(crate) use leave_app;
