//! HTTP access for the rating sources.
//!
//! Sources talk to the network only through [`HttpFetch`], so tests can
//! substitute canned pages and count requests.

use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use reqwest::Client;

use crate::errors::{RatingError, Result};

/// User agent some rating sites require before they answer.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Raw HTTP response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// Charset declared in `Content-Type`, if any.
    pub charset: Option<String>,
}

impl FetchResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            charset: None,
        }
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Body decoded with the declared charset, UTF-8 when none is declared
    /// or the label is unknown. Invalid sequences are replaced.
    pub fn text(&self) -> String {
        let encoding = self
            .charset
            .as_deref()
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        let (text, _, _) = encoding.decode(&self.body);
        text.into_owned()
    }

    /// Fails with [`RatingError::Status`] unless the status is 200.
    pub fn require_ok(self, url: &str) -> Result<Self> {
        if self.status == 200 {
            Ok(self)
        } else {
            Err(RatingError::Status {
                url: url.to_string(),
                status: self.status,
            })
        }
    }
}

#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// GET `url` with extra request headers.
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchResponse>;

    /// POST `form` as `application/x-www-form-urlencoded`.
    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<FetchResponse>;
}

/// [`HttpFetch`] backed by a shared reqwest client.
#[derive(Clone, Debug)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Builds the client. Some rating sites serve broken certificate chains,
    /// which `accept_invalid_certs` tolerates.
    pub fn new(timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| RatingError::request("<client>", e))?;
        Ok(Self { client })
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<FetchResponse> {
        let status = response.status().as_u16();
        let charset = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_of);
        let body = response
            .bytes()
            .await
            .map_err(|e| RatingError::request(url, e))?;
        debug!("{} -> HTTP {} ({} bytes)", url, status, body.len());
        Ok(FetchResponse {
            status,
            body: body.to_vec(),
            charset,
        })
    }
}

/// `charset` parameter of a `Content-Type` value.
fn charset_of(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if name.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request
            .send()
            .await
            .map_err(|e| RatingError::request(url, e))?;
        Self::read(url, response).await
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<FetchResponse> {
        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| RatingError::request(url, e))?;
        Self::read(url, response).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned-response fetcher shared by the source tests.

    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct StubFetcher {
        responses: Mutex<HashMap<String, FetchResponse>>,
        calls: Mutex<Vec<String>>,
        forms: Mutex<Vec<Vec<(String, String)>>>,
        headers: Mutex<Vec<Vec<(String, String)>>>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(self, url: &str, response: FetchResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), response);
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn forms(&self) -> Vec<Vec<(String, String)>> {
            self.forms.lock().unwrap().clone()
        }

        pub fn headers(&self) -> Vec<Vec<(String, String)>> {
            self.headers.lock().unwrap().clone()
        }

        fn respond(&self, url: &str) -> Result<FetchResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| RatingError::request(url, "connection refused"))
        }
    }

    fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[async_trait]
    impl HttpFetch for StubFetcher {
        async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchResponse> {
            self.headers.lock().unwrap().push(owned(headers));
            self.respond(url)
        }

        async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<FetchResponse> {
            self.forms.lock().unwrap().push(owned(form));
            self.respond(url)
        }
    }
}
