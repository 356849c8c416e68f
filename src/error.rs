use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (network down, CORS, JS exception).
    #[error("{0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
    /// The backend answered with a non-2xx status.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid config: {0}")]
    Config(String),
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Parse(_))
    }

    /// Text shown to the player when a building upgrade fails.
    pub fn alert_message(&self) -> String {
        match self {
            ClientError::Rejected { message, .. } => format!("Upgrade failed: {}", message),
            _ => "Upgrade failed: Network error".to_string(),
        }
    }
}

impl From<JsValue> for ClientError {
    fn from(value: JsValue) -> Self {
        let message = value
            .dyn_ref::<js_sys::Error>()
            .map(|e| String::from(e.message()))
            .or_else(|| value.as_string())
            .unwrap_or_else(|| format!("{:?}", value));
        ClientError::Transport(message)
    }
}

impl From<ClientError> for JsValue {
    fn from(err: ClientError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
