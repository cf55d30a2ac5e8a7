use crate::db::get_db_pool;
use crate::orm::users;
use actix_session::{Session, SessionExt};
use actix_web::dev::{self, Extensions, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::error::{ErrorForbidden, InternalError};
use actix_web::http::header;
use actix_web::{web::Data, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Session key holding the id of the signed-in user.
///
/// Written by the authentication service in front of this application.
pub const SESSION_USER_KEY: &str = "user_id";

/// Client data stored for a single request cycle.
/// Distinct from ClientCtx because it is defined through request data.
#[derive(Clone, Debug)]
pub struct ClientCtxInner {
    /// User data. Optional. None is a guest user.
    pub client: Option<users::Model>,
    /// CSRF token for form protection
    pub csrf_token: String,
    /// Path and query of the current request, used as the login `next`.
    pub path: String,
    /// Time the request started for page load statistics.
    pub request_start: Instant,
}

impl Default for ClientCtxInner {
    fn default() -> Self {
        Self {
            client: None,
            csrf_token: String::new(),
            path: "/".to_owned(),
            request_start: Instant::now(),
        }
    }
}

impl ClientCtxInner {
    pub async fn from_session(session: &Session, path: String) -> Self {
        use crate::middleware::csrf::get_or_create_csrf_token;

        let client = authenticate_client_by_session(session).await;
        let csrf_token = get_or_create_csrf_token(session).unwrap_or_else(|_| String::new());

        ClientCtxInner {
            client,
            csrf_token,
            path,
            ..Default::default()
        }
    }
}

/// Loads the user named by the session, if any.
async fn authenticate_client_by_session(session: &Session) -> Option<users::Model> {
    let user_id = match session.get::<i32>(SESSION_USER_KEY) {
        Ok(Some(user_id)) => user_id,
        Ok(None) => return None,
        Err(err) => {
            log::warn!("Unreadable {} in session: {}", SESSION_USER_KEY, err);
            return None;
        }
    };

    match crate::user::get_active_user(get_db_pool(), user_id).await {
        Ok(user) => user,
        Err(err) => {
            log::error!("Failed to load session user {}: {}", user_id, err);
            None
        }
    }
}

/// Client context passed to routes.
/// Wraps ClientCtxInner, which is set at the beginning of the request.
#[derive(Clone, Debug)]
pub struct ClientCtx(Data<ClientCtxInner>);

impl Default for ClientCtx {
    fn default() -> Self {
        Self(Data::new(ClientCtxInner::default()))
    }
}

impl ClientCtx {
    /// Builds a context around a known user. Used by tests and tools.
    pub fn from_user(user: Option<users::Model>) -> Self {
        Self(Data::new(ClientCtxInner {
            client: user,
            ..Default::default()
        }))
    }

    pub fn get_or_default_from_extensions(extensions: &mut Extensions) -> Self {
        match extensions.get::<Data<ClientCtxInner>>() {
            // Existing record in extensions; pull it and return clone.
            Some(cbox) => Self(cbox.clone()),
            // No existing record; create and insert it.
            None => {
                let cbox = Data::new(ClientCtxInner::default());
                extensions.insert(cbox.clone());
                Self(cbox)
            }
        }
    }

    /// Returns either the user's id or None.
    pub fn get_id(&self) -> Option<i32> {
        self.0.client.as_ref().map(|u| u.id)
    }

    /// Returns either the user's name or the word for guest.
    pub fn get_name(&self) -> String {
        crate::user::visitor_name(self.get_user())
    }

    pub fn get_user(&self) -> Option<&users::Model> {
        self.0.client.as_ref()
    }

    pub fn get_csrf_token(&self) -> &str {
        &self.0.csrf_token
    }

    pub fn is_user(&self) -> bool {
        self.0.client.is_some()
    }

    /// Staff or superuser.
    pub fn is_admin(&self) -> bool {
        self.get_user().map(crate::user::is_admin).unwrap_or(false)
    }

    /// True when the current user authored the resource.
    pub fn owns(&self, resource_user_id: Option<i32>) -> bool {
        match (self.get_id(), resource_user_id) {
            (Some(user_id), Some(owner_id)) => user_id == owner_id,
            _ => false,
        }
    }

    pub fn site_name(&self) -> String {
        crate::app_config::site().name
    }

    /// Returns Duration representing request time.
    pub fn request_time(&self) -> Duration {
        Instant::now() - self.0.request_start
    }

    /// Returns human readable representing request time.
    pub fn request_time_as_string(&self) -> String {
        let us = self.request_time().as_micros();
        if us > 5000 {
            format!("{}ms", us / 1000)
        } else {
            format!("{}μs", us)
        }
    }

    /// Login page URL that returns to the current request afterwards.
    pub fn login_redirect_url(&self) -> String {
        let next = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("next", &self.0.path)
            .finish();
        format!("{}?{}", crate::app_config::site().login_url, next)
    }

    /// Require user to be logged in. Returns user_id or a redirect to the login page.
    pub fn require_login(&self) -> Result<i32, Error> {
        match self.get_id() {
            Some(user_id) => Ok(user_id),
            None => Err(InternalError::from_response(
                "Login required",
                HttpResponse::Found()
                    .append_header((header::LOCATION, self.login_redirect_url()))
                    .finish(),
            )
            .into()),
        }
    }

    /// Require a staff or superuser account. Returns user_id or ErrorForbidden.
    pub fn require_admin(&self) -> Result<i32, Error> {
        let user_id = self.require_login()?;
        if !self.is_admin() {
            return Err(ErrorForbidden(
                "You do not have permission to perform this action.",
            ));
        }
        Ok(user_id)
    }

    /// Require ownership of a resource. Returns user_id or ErrorForbidden.
    pub fn require_ownership(&self, resource_user_id: Option<i32>) -> Result<i32, Error> {
        let user_id = self.require_login()?;
        if !self.owns(resource_user_id) {
            return Err(ErrorForbidden("You don't own this resource."));
        }
        Ok(user_id)
    }
}

/// This implementation is what actually provides the `client: ClientCtx` in the parameters of route functions.
impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(ClientCtx::get_or_default_from_extensions(
            &mut req.extensions_mut(),
        )))
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for ClientCtx
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientCtxMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientCtxMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Client context middleware
pub struct ClientCtxMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ClientCtxMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let session = req.get_session();
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| "/".to_owned());

        Box::pin(async move {
            let inner = ClientCtxInner::from_session(&session, path).await;
            req.extensions_mut().insert(Data::new(inner));

            svc.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, is_staff: bool) -> users::Model {
        users::Model {
            id,
            username: format!("user{}", id),
            email: None,
            is_staff,
            is_superuser: false,
            is_active: true,
            date_joined: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_guest_context() {
        let client = ClientCtx::default();
        assert!(!client.is_user());
        assert!(!client.is_admin());
        assert_eq!(client.get_name(), crate::constants::GUEST_USERNAME);
        assert!(!client.owns(None));
        assert!(client.require_login().is_err());
    }

    #[test]
    fn test_ownership() {
        let client = ClientCtx::from_user(Some(user(7, false)));
        assert!(client.owns(Some(7)));
        assert!(!client.owns(Some(8)));
        assert!(!client.owns(None));
        assert_eq!(client.require_ownership(Some(7)).ok(), Some(7));
        assert!(client.require_ownership(Some(8)).is_err());
    }

    #[test]
    fn test_admin_requires_staff() {
        assert!(ClientCtx::from_user(Some(user(1, false)))
            .require_admin()
            .is_err());
        assert_eq!(
            ClientCtx::from_user(Some(user(2, true))).require_admin().ok(),
            Some(2)
        );
    }

    #[test]
    fn test_login_redirect_keeps_path() {
        let client = ClientCtx(Data::new(ClientCtxInner {
            path: "/thread/3/edit/?x=1".to_owned(),
            ..Default::default()
        }));
        assert_eq!(
            client.login_redirect_url(),
            "/login/?next=%2Fthread%2F3%2Fedit%2F%3Fx%3D1"
        );
    }
}
