//! Request-level tests that need no database rows

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use groupportal::middleware::ClientCtx;

macro_rules! test_app {
    () => {
        test::init_service(
            App::new()
                .wrap(ClientCtx::default())
                .wrap(SessionMiddleware::new(
                    CookieSessionStore::default(),
                    Key::generate(),
                ))
                .configure(groupportal::web::configure),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_index_redirects_to_forums() {
    groupportal::app_config::init();
    let app = test_app!();

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        "/forums/"
    );
}

#[actix_rt::test]
async fn test_guest_is_sent_to_login() {
    groupportal::app_config::init();
    let app = test_app!();

    let req = test::TestRequest::get().uri("/create-thread/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    assert!(location.starts_with("/login/?next="));
}
