//! Endpoint handles built from path segments.

use std::fmt::Display;
use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::Api;
use crate::error::ApiError;

/// One REST endpoint, such as `/api/v1/streamer/report/`.
///
/// URLs always end in `/`. Query parameters added with [`Resource::query`]
/// go out with whichever verb is sent next.
#[derive(Debug, Clone)]
pub struct Resource<'a> {
    api: &'a Api,
    url: String,
    query: Vec<(String, String)>,
}

impl<'a> Resource<'a> {
    pub(crate) fn new(api: &'a Api, url: String) -> Self {
        Self {
            api,
            url,
            query: Vec::new(),
        }
    }

    /// Appends a nested path segment: `.../test/` becomes `.../test/action/`.
    #[must_use]
    pub fn child(mut self, name: &str) -> Self {
        self.ensure_trailing_slash();
        self.url.push_str(name.trim_matches('/'));
        self.url.push('/');
        self
    }

    /// Selects one object by id or slug. An empty id leaves the URL as is.
    #[must_use]
    pub fn id(mut self, id: impl Display) -> Self {
        self.ensure_trailing_slash();
        let id = id.to_string();
        if !id.is_empty() {
            self.url.push_str(&id);
            self.url.push('/');
        }
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn ensure_trailing_slash(&mut self) {
        if !self.url.ends_with('/') {
            self.url.push('/');
        }
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let request = self.api.request(method, &self.url);
        if self.query.is_empty() {
            request
        } else {
            request.query(&self.query)
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        self.process_response(response).await
    }

    /// Maps error statuses and decodes the body.
    ///
    /// 204/205 and empty bodies give `Null`; a body that is not JSON comes
    /// back as a JSON string.
    async fn process_response(&self, response: Response) -> Result<Value, ApiError> {
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        if let Some(err) =
            ApiError::from_status(status, &self.url, String::from_utf8_lossy(&body).into_owned())
        {
            return Err(err);
        }

        if !(200..=299).contains(&status) || status == 204 || status == 205 || body.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned())))
    }

    pub async fn get(&self) -> Result<Value, ApiError> {
        self.send(self.request(Method::GET)).await
    }

    /// GET and decode the body into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = self.get().await?;
        serde_json::from_value(value).map_err(|err| {
            ApiError::ImproperlyConfigured(format!("unexpected response from {}: {err}", self.url))
        })
    }

    pub async fn post<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value, ApiError> {
        self.send(self.request(Method::POST).json(data)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value, ApiError> {
        self.send(self.request(Method::PATCH).json(data)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value, ApiError> {
        self.send(self.request(Method::PUT).json(data)).await
    }

    /// DELETE; returns whether the server answered 2xx.
    pub async fn delete(&self) -> Result<bool, ApiError> {
        let response = self.request(Method::DELETE).send().await?;
        Ok(response.status().is_success())
    }

    /// DELETE with a JSON body.
    pub async fn delete_with<B: Serialize + ?Sized>(&self, data: &B) -> Result<bool, ApiError> {
        let response = self.request(Method::DELETE).json(data).send().await?;
        Ok(response.status().is_success())
    }

    /// Posts `bytes` as the multipart field `file`.
    pub async fn upload_bytes(
        &self,
        filename: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Value, ApiError> {
        self.upload_form(filename, bytes, &[]).await
    }

    /// Posts `bytes` as the multipart field `file` next to extra text fields.
    pub async fn upload_form(
        &self,
        filename: impl Into<String>,
        bytes: Vec<u8>,
        fields: &[(&str, &str)],
    ) -> Result<Value, ApiError> {
        let filename = filename.into();
        tracing::debug!(url = %self.url, %filename, size = bytes.len(), "uploading file");

        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(filename));
        for (name, value) in fields {
            form = form.text(name.to_string(), value.to_string());
        }

        self.send(self.request(Method::POST).multipart(form)).await
    }

    /// Reads a file from disk and uploads it under its own file name.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<Value, ApiError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        self.upload_bytes(filename, bytes).await
    }
}
