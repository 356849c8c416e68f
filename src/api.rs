//! `window.fetch` wrappers for the game backend. No retries, no cancellation.

use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, Response};

use crate::dom::window;
use crate::error::ClientError;
use crate::protocol::{decode, CitySnapshot, FooBar, UpgradeRequest};

#[derive(Debug, Clone)]
pub struct Api {
    base: String,
}

impl Api {
    pub fn new(base: &str) -> Api {
        Api { base: base.to_string() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn fetch_city(&self) -> Result<CitySnapshot, ClientError> {
        let resp = self.send("GET", "/api/city", None).await?;
        if !resp.ok() {
            return Err(rejected(&resp, resp.status_text()));
        }
        get_json(&resp).await
    }

    /// Any 2xx is success and the body is ignored. Otherwise the body is the
    /// error message.
    pub async fn upgrade_building(&self, req: &UpgradeRequest) -> Result<(), ClientError> {
        let body = serde_json::to_string(req)?;
        let resp = self.send("POST", "/api/city/building", Some(body)).await?;
        if resp.ok() {
            return Ok(());
        }
        let message = get_text(&resp).await?;
        Err(rejected(&resp, message))
    }

    pub async fn fetch_foobar(&self) -> Result<FooBar, ClientError> {
        let resp = self.send("GET", "/api/foobar", None).await?;
        if !resp.ok() {
            return Err(rejected(&resp, resp.status_text()));
        }
        get_json(&resp).await
    }

    pub async fn train_foo(&self) -> Result<(), ClientError> {
        self.post_empty("/api/foo").await
    }

    pub async fn build_bar(&self) -> Result<(), ClientError> {
        self.post_empty("/api/bar").await
    }

    async fn post_empty(&self, path: &str) -> Result<(), ClientError> {
        let resp = self.send("POST", path, None).await?;
        if resp.ok() {
            Ok(())
        } else {
            Err(rejected(&resp, resp.status_text()))
        }
    }

    async fn send(&self, method: &str, path: &str, json: Option<String>) -> Result<Response, ClientError> {
        let opts = RequestInit::new();
        opts.set_method(method);
        if method == "GET" {
            opts.set_cache(RequestCache::NoStore);
        }
        if let Some(json) = &json {
            opts.set_body(&JsValue::from_str(json));
        }

        let request = Request::new_with_str_and_init(&self.url(path), &opts)?;
        if json.is_some() {
            request.headers().set("Content-Type", "application/json")?;
        }

        let value = JsFuture::from(window().fetch_with_request(&request)).await?;
        let resp: Response = value.dyn_into()?;
        log::debug!("{} {} -> {}", method, path, resp.status());
        Ok(resp)
    }
}

fn rejected(resp: &Response, message: String) -> ClientError {
    ClientError::Rejected { status: resp.status(), message }
}

async fn get_text(resp: &Response) -> Result<String, ClientError> {
    let text = JsFuture::from(resp.text()?).await?;
    Ok(text.as_string().unwrap_or_default())
}

async fn get_json<T: DeserializeOwned>(resp: &Response) -> Result<T, ClientError> {
    decode(&get_text(resp).await?)
}
