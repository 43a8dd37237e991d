//! Generic external forwarder.

use crate::forward::client::UpstreamClient;
use crate::forward::error::GatewayError;
use crate::forward::outbound::{InboundRequest, OutboundRequest};
use crate::forward::relay::RelayResponse;

/// Forwards caller-described requests to caller-chosen upstreams.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: UpstreamClient,
}

impl Forwarder {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    /// Derive, perform and relay one outbound call.
    ///
    /// Target errors are returned before any network activity.
    pub async fn forward(&self, inbound: &InboundRequest) -> Result<RelayResponse, GatewayError> {
        let outbound = OutboundRequest::from_inbound(inbound)?;

        tracing::debug!(
            method = %outbound.method,
            host = outbound.url.host_str().unwrap_or_default(),
            path = outbound.url.path(),
            has_body = outbound.body.is_some(),
            "Forwarding request"
        );

        let upstream = self.client.execute(outbound).await?;
        Ok(RelayResponse::from_upstream(upstream))
    }
}
