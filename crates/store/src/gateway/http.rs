#![forbid(unsafe_code)]

use super::Gateway;
use crate::config::ApiConfig;
use crate::error::GatewayError;
use fm_core::{Entity, EntityId, EntityKind};
use serde::de::DeserializeOwned;

/// REST gateway: `{base}/{collection}` and `{base}/{collection}/{id}`.
#[derive(Debug)]
pub struct HttpGateway {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.timeout)
            .timeout_read(config.timeout)
            .timeout_write(config.timeout)
            .build();
        Ok(Self { agent, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.base_url, kind.collection())
    }

    /// Ids are free text; the segment is percent-encoded so `%` and spaces survive.
    fn item_url(&self, kind: EntityKind, id: &EntityId) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            kind.collection(),
            urlencoding::encode(id.as_str())
        )
    }
}

fn normalize_base_url(raw: &str) -> Result<String, GatewayError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"));
    match host {
        Some(host) if !host.is_empty() && !host.contains(char::is_whitespace) => {
            Ok(trimmed.to_string())
        }
        _ => Err(GatewayError::InvalidBaseUrl(raw.to_string())),
    }
}

fn read_json<T: DeserializeOwned>(response: ureq::Response) -> Result<T, GatewayError> {
    response
        .into_json::<T>()
        .map_err(|err| GatewayError::Decode(err.to_string()))
}

impl<E: Entity> Gateway<E> for HttpGateway {
    fn list(&self) -> Result<Vec<E>, GatewayError> {
        let url = self.collection_url(E::KIND);
        tracing::debug!(%url, "GET");
        read_json(self.agent.get(&url).call()?)
    }

    fn create(&self, draft: &E::Draft) -> Result<E, GatewayError> {
        let url = self.collection_url(E::KIND);
        tracing::debug!(%url, "POST");
        read_json(self.agent.post(&url).send_json(draft)?)
    }

    fn update(&self, id: &EntityId, patch: &E::Patch) -> Result<E, GatewayError> {
        let url = self.item_url(E::KIND, id);
        let method = E::KIND.update_method().as_str();
        tracing::debug!(%url, method, "update");
        read_json(self.agent.request(method, &url).send_json(patch)?)
    }

    fn delete(&self, id: &EntityId) -> Result<EntityId, GatewayError> {
        let url = self.item_url(E::KIND, id);
        tracing::debug!(%url, "DELETE");
        self.agent.delete(&url).call()?;
        Ok(id.clone())
    }
}
