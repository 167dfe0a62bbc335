//! HTTPS/SOAP protocol client (C4, §4.4): the transport client shared
//! across the three government endpoints. Owns TLS, timeouts, the
//! maintenance check, and the retry loop; envelope framing (C1) is a
//! separate, pure concern callers apply on either side of [`ProtocolClient::send`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cancellation::CancellationToken;
use crate::envelope::{decode_envelope, encode_envelope};
use crate::error::ProtocolError;
use crate::maintenance::MaintenanceSchedule;
use crate::retry::retry_send;
use crate::tls::ClientIdentity;

/// Default total per-call timeout (§4.4); the connection timeout
/// shares this same budget rather than having one of its own.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The client is immutable after construction and safe to share across
/// concurrent callers (§4.4): no per-call mutable state outlives a
/// single `send`.
#[derive(Clone)]
pub struct ProtocolClient {
    http: reqwest::Client,
    endpoint: String,
    maintenance: Arc<MaintenanceSchedule>,
}

pub struct ProtocolClientConfig {
    pub endpoint: String,
    pub identity: Option<ClientIdentity>,
    pub maintenance: MaintenanceSchedule,
    /// Overrides [`DEFAULT_TIMEOUT`] when set.
    pub timeout: Option<Duration>,
}

impl ProtocolClient {
    pub fn new(config: ProtocolClientConfig) -> Result<Self, ProtocolError> {
        let mut builder = reqwest::Client::builder()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .connect_timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT));

        if let Some(identity) = config.identity {
            builder = builder.identity(identity.identity);
        }

        let http = builder.build().map_err(|e| ProtocolError::Connection(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint,
            maintenance: Arc::new(config.maintenance),
        })
    }

    /// Send raw SOAP bytes with the full §4.4 policy: maintenance
    /// check, bounded retry on retryable errors only, cancellation
    /// observed at every sleep boundary. Returns the raw response
    /// bytes of a successful (2xx) call.
    pub async fn send(&self, cancellation: &CancellationToken, soap_action: &str, body: Vec<u8>) -> Result<Vec<u8>, ProtocolError> {
        if self.maintenance.is_in_maintenance(Utc::now()) {
            return Err(ProtocolError::Maintenance);
        }

        retry_send(cancellation, || {
            let body = body.clone();
            async move { self.send_once(soap_action, body).await }
        })
        .await
    }

    async fn send_once(&self, soap_action: &str, body: Vec<u8>) -> Result<Vec<u8>, ProtocolError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action)
            .body(body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ProtocolError::ServerError(status.as_u16()));
        }
        if !status.is_success() {
            return Err(ProtocolError::ServerError(status.as_u16()));
        }

        response.bytes().await.map(|b| b.to_vec()).map_err(classify_transport_error)
    }

    /// Convenience wrapper combining C1 encode/decode with [`ProtocolClient::send`],
    /// for callers that do not need the raw envelope bytes.
    pub async fn call<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        cancellation: &CancellationToken,
        soap_action: &str,
        request: &Req,
    ) -> Result<Resp, ProtocolError> {
        let body = encode_envelope(request)?;
        let response_bytes = self.send(cancellation, soap_action, body).await?;
        decode_envelope(&response_bytes).map_err(ProtocolError::from)
    }
}

fn classify_transport_error(e: reqwest::Error) -> ProtocolError {
    if e.is_timeout() {
        ProtocolError::Timeout
    } else {
        ProtocolError::Connection(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Serialize)]
    #[serde(rename = "Ping")]
    struct PingRequest {
        #[serde(rename = "Value")]
        value: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename = "PongResponse")]
    struct PongResponse {
        #[serde(rename = "Echo")]
        echo: String,
    }

    fn envelope_with_body(inner: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\"><soap:Body>{inner}</soap:Body></soap:Envelope>"
        )
    }

    #[tokio::test]
    async fn successful_call_round_trips_through_envelope_and_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(envelope_with_body("<PongResponse><Echo>hi</Echo></PongResponse>")))
            .mount(&server)
            .await;

        let client = ProtocolClient::new(ProtocolClientConfig {
            endpoint: server.uri(),
            identity: None,
            maintenance: MaintenanceSchedule::default(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap();

        let cancellation = CancellationToken::new();
        let response: PongResponse = client
            .call(&cancellation, "urn:ping", &PingRequest { value: "hi".into() })
            .await
            .unwrap();
        assert_eq!(response.echo, "hi");
    }

    #[tokio::test]
    async fn server_error_is_classified_and_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).and(path("/")).respond_with(ResponseTemplate::new(501)).mount(&server).await;

        let client = ProtocolClient::new(ProtocolClientConfig {
            endpoint: server.uri(),
            identity: None,
            maintenance: MaintenanceSchedule::default(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap();

        let cancellation = CancellationToken::new();
        let err = client
            .call::<_, PongResponse>(&cancellation, "urn:ping", &PingRequest { value: "hi".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::ServerError(501)));
    }
}
