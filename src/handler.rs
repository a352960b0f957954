use std::sync::Arc;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::{
    auth::{authorize, provided_api_key},
    config::Config,
    model::Payload,
    store::{Credentials, DynamoStore, Store},
    sync::update_invite_links,
    util::{
        resp_json, GatewayResponse, MSG_ERROR, MSG_UNAUTHORIZED, MSG_UPDATED, MSG_UPDATE_FAILED,
    },
};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("malformed body: {0}")]
    Body(#[source] serde_json::Error),
    #[error("malformed credentials: {0}")]
    Credentials(#[source] serde_json::Error),
}

impl GatewayError {
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Body(_) | GatewayError::Credentials(_) => 500,
        }
    }
}

#[derive(Clone)]
pub struct Ctx {
    pub config: Config,
    pub sdk: SdkConfig,
}

impl Ctx {
    pub async fn new(config: Config) -> Self {
        let sdk = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;
        Self { config, sdk }
    }

    pub fn store(&self, credentials: Option<&Credentials>) -> Arc<dyn Store> {
        Arc::new(DynamoStore::new(&self.sdk, &self.config.table, credentials))
    }
}

pub async fn router(event: JsonValue, ctx: &Ctx) -> GatewayResponse {
    handle(event, ctx.config.api_key.as_deref(), |c| ctx.store(c)).await
}

/// Authenticates, then runs one sync against the store `connect` builds.
/// `connect` is not called for rejected requests.
pub async fn handle<F>(
    event: JsonValue,
    expected_key: Option<&str>,
    connect: F,
) -> GatewayResponse
where
    F: FnOnce(Option<&Credentials>) -> Arc<dyn Store>,
{
    if expected_key.is_none() {
        tracing::warn!("API_KEY environment variable is not set");
    }
    if let Err(e) = authorize(provided_api_key(&event), expected_key) {
        tracing::warn!(reason = %e, "rejected invite link update");
        return resp_json(401, MSG_UNAUTHORIZED);
    }

    match run(&event, connect).await {
        Ok(true) => resp_json(200, MSG_UPDATED),
        Ok(false) => resp_json(200, MSG_UPDATE_FAILED),
        Err(e) => {
            tracing::error!(error = %e, "{MSG_ERROR}");
            resp_json(e.status_code(), MSG_ERROR)
        }
    }
}

async fn run<F>(event: &JsonValue, connect: F) -> Result<bool, GatewayError>
where
    F: FnOnce(Option<&Credentials>) -> Arc<dyn Store>,
{
    let payload = parse_payload(event.get("body"))?;
    let credentials = match event.get("credentials") {
        None | Some(JsonValue::Null) => None,
        Some(v) => Some(
            serde_json::from_value::<Credentials>(v.clone())
                .map_err(GatewayError::Credentials)?,
        ),
    };

    let store = connect(credentials.as_ref());
    Ok(update_invite_links(store, &payload).await)
}

/// `body` may be a JSON string (proxy events) or an object (direct invokes).
pub fn parse_payload(body: Option<&JsonValue>) -> Result<Payload, GatewayError> {
    let value = match body {
        None | Some(JsonValue::Null) => return Ok(Payload::default()),
        Some(JsonValue::String(s)) if s.is_empty() => return Ok(Payload::default()),
        Some(JsonValue::String(s)) => serde_json::from_str(s).map_err(GatewayError::Body)?,
        Some(other) => other.clone(),
    };
    if value.is_null() {
        return Ok(Payload::default());
    }
    serde_json::from_value(value).map_err(GatewayError::Body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, PK_GROUPS, PK_INVITE_LINKS};
    use crate::store::memory::MemoryStore;
    use aws_sdk_dynamodb::types::AttributeValue as Av;
    use serde_json::json;
    use std::sync::Mutex;

    const KEY: &str = "test-key";

    fn group(sk: &str, domain: &str) -> Item {
        Item::from([
            ("PK".to_string(), Av::S(PK_GROUPS.into())),
            ("SK".to_string(), Av::S(sk.into())),
            ("Name".to_string(), Av::S(sk.to_uppercase())),
            ("Domain".to_string(), Av::S(domain.into())),
            ("Publishable".to_string(), Av::Bool(true)),
            ("InviteCode".to_string(), Av::S(format!("code-{sk}"))),
        ])
    }

    fn seeded() -> Arc<MemoryStore> {
        let store = MemoryStore::default();
        store.seed(group("g1", "dev"));
        store.seed(group("g2", "design"));
        Arc::new(store)
    }

    async fn call(event: JsonValue, store: Arc<MemoryStore>) -> GatewayResponse {
        handle(event, Some(KEY), move |_| store as Arc<dyn Store>).await
    }

    #[tokio::test]
    async fn updates_with_api_key_field() {
        let store = seeded();
        let resp = call(json!({"apiKey": KEY, "body": "{}"}), store.clone()).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.message().as_deref(), Some(MSG_UPDATED));
        assert_eq!(store.partition(PK_INVITE_LINKS).len(), 2);
    }

    #[tokio::test]
    async fn updates_with_header_key_and_domain_filter() {
        let store = seeded();
        let event = json!({
            "headers": {"X-Api-Key": KEY},
            "body": r#"{"domain":"dev"}"#,
        });
        let resp = call(event, store.clone()).await;
        assert_eq!(resp.status_code, 200);
        assert!(store.get(PK_INVITE_LINKS, "DEV").is_some());
        assert!(store.get(PK_INVITE_LINKS, "DESIGN").is_none());
    }

    #[tokio::test]
    async fn object_body_is_accepted() {
        let store = seeded();
        let event = json!({"apiKey": KEY, "body": {"domain": "design"}});
        let resp = call(event, store.clone()).await;
        assert_eq!(resp.status_code, 200);
        assert!(store.get(PK_INVITE_LINKS, "DESIGN").is_some());
        assert!(store.get(PK_INVITE_LINKS, "DEV").is_none());
    }

    #[tokio::test]
    async fn wrong_key_is_rejected_before_any_store_call() {
        let store = seeded();
        let connected = Mutex::new(false);
        let resp = handle(json!({"apiKey": "wrong-key", "body": "{}"}), Some(KEY), |_| {
            *connected.lock().unwrap() = true;
            store.clone() as Arc<dyn Store>
        })
        .await;
        assert_eq!(resp.status_code, 401);
        assert_eq!(resp.message().as_deref(), Some(MSG_UNAUTHORIZED));
        assert!(!*connected.lock().unwrap());
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn missing_key_is_rejected() {
        let store = seeded();
        let resp = call(json!({"body": "{}"}), store.clone()).await;
        assert_eq!(resp.status_code, 401);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn unconfigured_key_rejects_everyone() {
        let store = seeded();
        let resp = handle(json!({"apiKey": KEY}), None, |_| {
            store.clone() as Arc<dyn Store>
        })
        .await;
        assert_eq!(resp.status_code, 401);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_reported_with_200() {
        let store = Arc::new(MemoryStore::default().failing_query(PK_GROUPS));
        let resp = call(json!({"apiKey": KEY}), store).await;
        assert_eq!(resp.status_code, 200);
        assert_eq!(resp.message().as_deref(), Some(MSG_UPDATE_FAILED));
    }

    #[tokio::test]
    async fn malformed_body_is_a_500() {
        let store = seeded();
        let resp = call(json!({"apiKey": KEY, "body": "{not json"}), store.clone()).await;
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.message().as_deref(), Some(MSG_ERROR));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn credentials_are_handed_to_connect() {
        let store = seeded();
        let seen = Mutex::new(None);
        let event = json!({
            "apiKey": KEY,
            "credentials": {"accessKeyId": "AKIA", "secretAccessKey": "shh"},
        });
        let resp = handle(event, Some(KEY), |c| {
            *seen.lock().unwrap() = c.cloned();
            store.clone() as Arc<dyn Store>
        })
        .await;
        assert_eq!(resp.status_code, 200);
        let seen = seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.access_key_id, "AKIA");
    }

    #[tokio::test]
    async fn partial_credentials_are_a_500() {
        let store = seeded();
        let event = json!({"apiKey": KEY, "credentials": {"accessKeyId": "AKIA"}});
        let resp = call(event, store).await;
        assert_eq!(resp.status_code, 500);
    }

    #[test]
    fn payload_variants() {
        assert_eq!(parse_payload(None).unwrap(), Payload::default());
        assert_eq!(parse_payload(Some(&json!(""))).unwrap(), Payload::default());
        assert_eq!(parse_payload(Some(&json!("null"))).unwrap(), Payload::default());
        assert_eq!(
            parse_payload(Some(&json!(r#"{"domain":"dev","extra":1}"#)))
                .unwrap()
                .domain
                .as_deref(),
            Some("dev")
        );
        assert!(parse_payload(Some(&json!("[1,2]"))).is_err());
    }
}
