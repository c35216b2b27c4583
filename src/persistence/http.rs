//! Lore endpoint client
//!
//! `GET {endpoint}` lists records oldest first, `POST {endpoint}` with a
//! JSON body creates one (201) or reports a duplicate (409).

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use super::lore::{LoreEntry, LoreError, NewLore, parse_create_response, parse_list_response};

#[derive(Debug, Clone)]
pub struct HttpLoreStore {
    endpoint: String,
}

impl HttpLoreStore {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub async fn list_lore(&self) -> Result<Vec<LoreEntry>, LoreError> {
        let (status, body) = self.send("GET", None).await?;
        parse_list_response(status, &body)
    }

    pub async fn create_lore(&self, lore: &NewLore) -> Result<LoreEntry, LoreError> {
        let payload = serde_json::to_string(lore).map_err(LoreError::Encode)?;
        let (status, body) = self.send("POST", Some(&payload)).await?;
        parse_create_response(status, &body)
    }

    async fn send(&self, method: &str, body: Option<&str>) -> Result<(u16, String), LoreError> {
        let window =
            web_sys::window().ok_or_else(|| LoreError::Network("no window".to_string()))?;

        let opts = RequestInit::new();
        opts.set_method(method);
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&self.endpoint, &opts).map_err(js_error)?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
        }

        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_error)?;
        let response: Response = response.dyn_into().map_err(js_error)?;
        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?;

        Ok((response.status(), text.as_string().unwrap_or_default()))
    }
}

fn js_error(value: JsValue) -> LoreError {
    LoreError::Network(format!("{value:?}"))
}
