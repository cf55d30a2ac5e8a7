use actix_session::{config::PersistentSession, storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::http::header;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use env_logger::Env;
use groupportal::app_config;
use groupportal::db::{get_db_pool, init_db};
use groupportal::middleware::ClientCtx;
use groupportal::web::error::error_handlers;
use rand::{distributions::Alphanumeric, Rng};

/// Minimum length `Key::from` accepts.
const MIN_SECRET_KEY_LENGTH: usize = 64;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_lib_mods();
    app_config::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.");
    if let Err(err) = init_db(database_url).await {
        log::error!("Failed to connect to the database: {}", err);
        return Err(std::io::Error::new(std::io::ErrorKind::Other, err.to_string()));
    }

    let secret_key = load_secret_key();
    let server = app_config::server();
    log::info!("Listening on {}", server.bind);

    HttpServer::new(move || {
        // Order of middleware IS IMPORTANT and is in REVERSE EXECUTION ORDER.
        App::new()
            .app_data(Data::new(get_db_pool()))
            .wrap(
                DefaultHeaders::new()
                    .add((header::X_FRAME_OPTIONS, "DENY"))
                    .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .add(("X-XSS-Protection", "0"))
                    .add(("Referrer-Policy", "strict-origin-when-cross-origin")),
            )
            .wrap(error_handlers())
            .wrap(ClientCtx::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_same_site(SameSite::Lax)
                    .cookie_secure(server.secure_cookies)
                    .session_lifecycle(PersistentSession::default())
                    .build(),
            )
            .wrap(Logger::new("%a %r %s %T"))
            .configure(groupportal::web::configure)
    })
    .bind(app_config::server().bind)?
    .run()
    .await
}

/// Initialize third party crates we rely on but don't have control over.
fn init_lib_mods() {
    if let Err(err) = dotenv::dotenv() {
        eprintln!("No .env loaded: {}", err);
    }
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

fn load_secret_key() -> Key {
    let reason = match std::env::var("SECRET_KEY") {
        Ok(key) if key.len() >= MIN_SECRET_KEY_LENGTH => return Key::from(key.as_bytes()),
        Ok(key) => format!("key is {} bytes long", key.len()),
        Err(err) => err.to_string(),
    };

    let random_string: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect();
    log::warn!(
        "SECRET_KEY was invalid. Reason: {}\r\nThis means the key used for signing session cookies will invalidate every time the application is restarted. A secret key must be at least {} bytes to be accepted.\r\n\r\nNeed a key? How about:\r\n{}",
        reason,
        MIN_SECRET_KEY_LENGTH,
        random_string
    );
    Key::from(random_string.as_bytes())
}
