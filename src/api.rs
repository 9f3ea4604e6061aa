// API client module: a small blocking HTTP client for the SERP platform.
// One method per resource operation; responses are returned as untyped
// JSON documents since the CLI only prints them.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;

use crate::models::{
    AsmRequest, CompareRequest, CreateTokenRequest, LivenessRequest, OriginCreateRequest,
    OriginUpdateRequest, PartialUpdateUserRequest, Photo, ProfileCreateRequest,
    ProfileReinitRequest, ProfileSearchRequest, StatsSourcesRequest, UpdateUserRequest,
};
use crate::query::Query;

/// Blocking API client holding the reqwest client, the base URL and an
/// optional token for authenticated calls.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

/// Which family of tokens a token operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Stream,
}

impl TokenKind {
    fn segment(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Stream => "streams",
        }
    }
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("serptech-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(t) = &self.token {
            let val = HeaderValue::from_str(&format!("Token {t}"))
                .context("Token contains characters not allowed in a header")?;
            headers.insert(AUTHORIZATION, val);
        }
        Ok(headers)
    }

    /// Endpoint URL under the base URL, one path segment per element and a
    /// trailing slash. Segments are percent-encoded, so an identifier can
    /// never reach another resource or add a query.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("Base URL {} cannot carry a path", self.base_url))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        log::debug!("{method} {url}");
        Ok(self.client.request(method, url).headers(self.auth_headers()?))
    }

    /// Send and fail on non-success status with the server's response body.
    fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
        let res = req
            .send()
            .with_context(|| format!("Failed to send {what} request"))?;
        log::debug!("{what}: {}", res.status());
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_default();
            anyhow::bail!("{what} failed: {status} - {txt}");
        }
        Ok(res)
    }

    /// Decode a JSON body; an empty body is `null`.
    fn send_json(&self, req: RequestBuilder, what: &str) -> Result<Value> {
        let res = self.send(req, what)?;
        let body = res
            .text()
            .with_context(|| format!("Reading {what} response"))?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).with_context(|| format!("Parsing {what} response json"))
    }

    fn get(&self, path: &[&str], query: Option<&Query>, what: &str) -> Result<Value> {
        let mut req = self.request(Method::GET, path)?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            req = req.query(&query.to_pairs());
        }
        self.send_json(req, what)
    }

    fn send_body<B: Serialize>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
        what: &str,
    ) -> Result<Value> {
        let req = self.request(method, path)?.json(body);
        self.send_json(req, what)
    }

    fn post_form(&self, path: &[&str], form: multipart::Form, what: &str) -> Result<Value> {
        let req = self.request(Method::POST, path)?.multipart(form);
        self.send_json(req, what)
    }

    fn delete(&self, path: &[&str], what: &str) -> Result<()> {
        let req = self.request(Method::DELETE, path)?;
        self.send(req, what)?;
        Ok(())
    }

    // --- entries ---

    pub fn list_entries(&self, query: &Query) -> Result<Value> {
        self.get(&["entries"], Some(query), "List entries")
    }

    pub fn delete_entry(&self, id: u64) -> Result<()> {
        self.delete(&["entries", &id.to_string()], "Delete entry")
    }

    pub fn entry_stats_sources(&self, req: &StatsSourcesRequest) -> Result<Value> {
        self.get(
            &["entries", "stats", "sources"],
            Some(&req.to_query()),
            "Entry statistics",
        )
    }

    // --- origins ---

    pub fn list_origins(&self, query: &Query) -> Result<Value> {
        self.get(&["origins"], Some(query), "List origins")
    }

    pub fn get_origin(&self, id: u64) -> Result<Value> {
        self.get(&["origins", &id.to_string()], None, "Get origin")
    }

    pub fn create_origin(&self, req: &OriginCreateRequest) -> Result<Value> {
        self.send_body(Method::POST, &["origins"], req, "Create origin")
    }

    pub fn update_origin(&self, req: &OriginUpdateRequest) -> Result<Value> {
        let id = req.id.to_string();
        self.send_body(Method::PATCH, &["origins", &id], req, "Update origin")
    }

    pub fn delete_origin(&self, id: u64) -> Result<()> {
        self.delete(&["origins", &id.to_string()], "Delete origin")
    }

    // --- profiles ---

    pub fn create_profile(&self, req: &ProfileCreateRequest) -> Result<Value> {
        let mut form = multipart::Form::new()
            .part("photo", photo_part(&req.photo)?)
            .text("origin_id", req.origin_id.to_string());
        form = text_opt(form, "create_min_facesize", req.create_min_facesize);
        form = text_opt(form, "create_ha", req.create_ha);
        form = text_opt(form, "create_junk", req.create_junk);
        self.post_form(&["profiles"], form, "Create profile")
    }

    pub fn search_profiles(&self, req: &ProfileSearchRequest) -> Result<Value> {
        let mut form = multipart::Form::new().part("photo", photo_part(&req.photo)?);
        if let Some(second) = &req.second_photo {
            form = form.part("photo2", photo_part(second)?);
        }
        self.post_form(&["profiles", "search"], form, "Search profiles")
    }

    pub fn delete_profile(&self, id: &str) -> Result<()> {
        self.delete(&["profiles", id], "Delete profile")
    }

    pub fn reinit_profile(&self, id: &str, req: &ProfileReinitRequest) -> Result<Value> {
        let mut form = multipart::Form::new().part("photo", photo_part(&req.photo)?);
        form = text_opt(form, "create_min_facesize", req.create_min_facesize);
        form = text_opt(form, "min_conf", req.min_conf);
        self.post_form(&["profiles", id, "reinit"], form, "Reinit profile")
    }

    // --- tokens ---

    pub fn list_tokens(&self, kind: TokenKind, query: Option<&Query>) -> Result<Value> {
        self.get(&["tokens", kind.segment()], query, "List tokens")
    }

    pub fn create_token(&self, kind: TokenKind, req: &CreateTokenRequest) -> Result<Value> {
        self.send_body(Method::POST, &["tokens", kind.segment()], req, "Create token")
    }

    pub fn delete_token(&self, kind: TokenKind, key: &str) -> Result<()> {
        self.delete(&["tokens", kind.segment(), key], "Delete token")
    }

    // --- users ---

    pub fn me(&self) -> Result<Value> {
        self.get(&["users", "me"], None, "Current user")
    }

    pub fn user_statistics(&self) -> Result<Value> {
        self.get(&["users", "statistics"], None, "User statistics")
    }

    pub fn list_users(&self, query: &Query) -> Result<Value> {
        self.get(&["users"], Some(query), "List users")
    }

    pub fn get_user(&self, id: u64) -> Result<Value> {
        self.get(&["users", &id.to_string()], None, "Get user")
    }

    pub fn update_user(&self, id: u64, req: &UpdateUserRequest) -> Result<Value> {
        let id = id.to_string();
        self.send_body(Method::PUT, &["users", &id], req, "Update user")
    }

    pub fn patch_user(&self, id: u64, req: &PartialUpdateUserRequest) -> Result<Value> {
        let id = id.to_string();
        self.send_body(Method::PATCH, &["users", &id], req, "Patch user")
    }

    pub fn version(&self) -> Result<Value> {
        self.get(&["version"], None, "Version")
    }

    // --- utility ---

    pub fn health(&self) -> Result<Value> {
        self.get(&["health"], None, "Health check")
    }

    /// Metrics are served as plain text.
    pub fn metrics(&self) -> Result<String> {
        let req = self.request(Method::GET, &["metrics"])?;
        let res = self.send(req, "Metrics")?;
        res.text().context("Reading metrics response")
    }

    pub fn asm(&self, req: &AsmRequest) -> Result<Value> {
        let form = multipart::Form::new().part("photo", photo_part(&req.photo)?);
        self.post_form(&["asm"], form, "Age/sex/mood")
    }

    pub fn liveness(&self, req: &LivenessRequest) -> Result<Value> {
        let form = multipart::Form::new()
            .part("photo1", photo_part(&req.photo1)?)
            .part("photo2", photo_part(&req.photo2)?);
        self.post_form(&["liveness"], form, "Liveness")
    }

    pub fn compare(&self, req: &CompareRequest) -> Result<Value> {
        let mut form = multipart::Form::new()
            .part("photo1", photo_part(&req.photo1)?)
            .part("photo2", photo_part(&req.photo2)?)
            .text("liveness_photo1", req.liveness_photo1.to_string())
            .text("liveness_photo2", req.liveness_photo2.to_string());
        form = text_opt(form, "conf", req.conf.map(|c| c.code()));
        self.post_form(&["compare"], form, "Compare")
    }
}

fn photo_part(photo: &Photo) -> Result<multipart::Part> {
    multipart::Part::bytes(photo.data.clone())
        .file_name(photo.name.clone())
        .mime_str(photo.mime())
        .context("Invalid photo mime type")
}

fn text_opt<T: ToString>(form: multipart::Form, name: &'static str, value: Option<T>) -> multipart::Form {
    match value {
        Some(v) => form.text(name, v.to_string()),
        None => form,
    }
}
