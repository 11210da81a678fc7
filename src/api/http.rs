//! Authenticated HTTP adapter shared by every resource module

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::storage::{SessionStore, ACCESS_TOKEN_KEY};

use super::error::{ApiError, ApiResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The services the client talks to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Spotify,
    Library,
    Movie,
    Lyrics,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::Spotify => "spotify",
            Backend::Library => "library",
            Backend::Movie => "movie",
            Backend::Lyrics => "lyrics",
        }
    }

    /// The Spotify token goes to Spotify and our own backends only; Happi
    /// authenticates with its API key.
    fn takes_session_token(self) -> bool {
        !matches!(self, Backend::Lyrics)
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

#[derive(Clone, Debug)]
pub struct BaseUrls {
    pub spotify: String,
    pub library: String,
    pub movie: String,
    pub lyrics: String,
}

impl BaseUrls {
    pub fn from_config(config: &Config) -> Self {
        Self {
            spotify: config.spotify.api_base.clone(),
            library: config.backends.library_base.clone(),
            movie: config.backends.movie_base.clone(),
            lyrics: config.backends.lyrics_base.clone(),
        }
    }

    fn for_backend(&self, backend: Backend) -> &str {
        match backend {
            Backend::Spotify => &self.spotify,
            Backend::Library => &self.library,
            Backend::Movie => &self.movie,
            Backend::Lyrics => &self.lyrics,
        }
    }
}

/// Cheap to clone; clones share the connection pool and session storage.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    bases: Arc<BaseUrls>,
    session: SessionStore,
}

impl HttpClient {
    pub fn new(bases: BaseUrls, session: SessionStore) -> ApiResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            bases: Arc::new(bases),
            session,
        })
    }

    /// Resolve `path` against the backend base. Absolute URLs pass through.
    pub fn url(&self, backend: Backend, path: &str) -> String {
        if is_absolute(path) {
            return path.to_string();
        }
        let base = self.bases.for_backend(backend).trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn request(&self, method: Method, backend: Backend, path: &str) -> RequestBuilder {
        let url = self.url(backend, path);
        let authenticated = backend.takes_session_token() && !is_absolute(path);
        tracing::trace!(backend = backend.name(), %method, %url, authenticated, "Building request");

        let builder = self.client.request(method, url);
        if !authenticated {
            return builder;
        }
        // Read per request so a refreshed token is picked up immediately
        match self.session.get(ACCESS_TOKEN_KEY) {
            Some(token) if !token.is_empty() => builder.bearer_auth(token),
            _ => builder,
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        backend: Backend,
        path: &str,
        params: &[(&str, String)],
    ) -> ApiResult<T> {
        let builder = self.request(Method::GET, backend, path).query(params);
        Self::send(builder).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        backend: Backend,
        path: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> ApiResult<T> {
        let builder = self.request(Method::PUT, backend, path).query(params);
        let builder = match body {
            Some(body) => builder.json(body),
            // Spotify rejects bodiless PUTs without an explicit length
            None => builder.header(CONTENT_LENGTH, "0"),
        };
        Self::send(builder).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        backend: Backend,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let builder = self.request(Method::POST, backend, path).json(body);
        Self::send(builder).await
    }

    pub async fn del<T: DeserializeOwned>(&self, backend: Backend, path: &str) -> ApiResult<T> {
        let builder = self.request(Method::DELETE, backend, path);
        Self::send(builder).await
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).trim().to_string(),
            });
        }

        // 204 and friends carry no body; decode them as JSON null
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use serde::de::IgnoredAny;
    use std::collections::HashMap;
    use tempfile::tempdir;

    async fn echo(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Json(serde_json::json!({ "authorization": auth, "query": query }))
    }

    async fn spawn_server() -> String {
        let app = Router::new()
            .route("/echo", get(echo))
            .route("/empty", put(|| async { StatusCode::NO_CONTENT }).delete(|| async { StatusCode::NO_CONTENT }))
            .route("/fail", get(|| async { (StatusCode::NOT_FOUND, "no device") }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str, session: SessionStore) -> HttpClient {
        let bases = BaseUrls {
            spotify: base.to_string(),
            library: base.to_string(),
            movie: base.to_string(),
            lyrics: base.to_string(),
        };
        HttpClient::new(bases, session).unwrap()
    }

    #[test]
    fn url_joins_base_and_path() {
        let dir = tempdir().unwrap();
        let session = SessionStore::open(dir.path().join("s.json"));
        let http = client("https://api.example.com/v1/", session);

        assert_eq!(http.url(Backend::Spotify, "/albums/1"), "https://api.example.com/v1/albums/1");
        assert_eq!(http.url(Backend::Library, "my-songs"), "https://api.example.com/v1/my-songs");
        assert_eq!(http.url(Backend::Lyrics, "https://other.example/lyrics"), "https://other.example/lyrics");
    }

    #[tokio::test]
    async fn attaches_bearer_token_from_session() {
        let base = spawn_server().await;
        let dir = tempdir().unwrap();
        let session = SessionStore::open(dir.path().join("s.json"));
        session.set(ACCESS_TOKEN_KEY, "tok-1").unwrap();
        let http = client(&base, session.clone());

        let body: Value = http
            .get(Backend::Spotify, "/echo", &[("limit", "10".to_string())])
            .await
            .unwrap();
        assert_eq!(body["authorization"], "Bearer tok-1");
        assert_eq!(body["query"]["limit"], "10");

        session.set(ACCESS_TOKEN_KEY, "tok-2").unwrap();
        let body: Value = http.get(Backend::Spotify, "/echo", &[]).await.unwrap();
        assert_eq!(body["authorization"], "Bearer tok-2");
    }

    #[tokio::test]
    async fn token_stays_off_lyrics_and_absolute_urls() {
        let base = spawn_server().await;
        let dir = tempdir().unwrap();
        let session = SessionStore::open(dir.path().join("s.json"));
        session.set(ACCESS_TOKEN_KEY, "secret").unwrap();
        let http = client(&base, session);

        let body: Value = http.get(Backend::Lyrics, "/echo", &[]).await.unwrap();
        assert!(body["authorization"].is_null());

        let absolute = format!("{}/echo", base);
        let body: Value = http.get(Backend::Spotify, &absolute, &[]).await.unwrap();
        assert!(body["authorization"].is_null());

        let body: Value = http.get(Backend::Library, "/echo", &[]).await.unwrap();
        assert_eq!(body["authorization"], "Bearer secret");
    }

    #[tokio::test]
    async fn omits_authorization_without_token() {
        let base = spawn_server().await;
        let dir = tempdir().unwrap();
        let http = client(&base, SessionStore::open(dir.path().join("s.json")));

        let body: Value = http.get(Backend::Movie, "/echo", &[]).await.unwrap();
        assert!(body["authorization"].is_null());
    }

    #[tokio::test]
    async fn empty_response_decodes_as_null() {
        let base = spawn_server().await;
        let dir = tempdir().unwrap();
        let http = client(&base, SessionStore::open(dir.path().join("s.json")));

        let _: IgnoredAny = http.put(Backend::Spotify, "/empty", &[], None).await.unwrap();
        let nothing: Option<Value> = http.put(Backend::Spotify, "/empty", &[], None).await.unwrap();
        assert!(nothing.is_none());
        let _: IgnoredAny = http.del(Backend::Library, "/empty").await.unwrap();
    }

    #[tokio::test]
    async fn error_status_carries_body() {
        let base = spawn_server().await;
        let dir = tempdir().unwrap();
        let http = client(&base, SessionStore::open(dir.path().join("s.json")));

        let err = http.get::<Value>(Backend::Spotify, "/fail", &[]).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("no device"));
    }
}
