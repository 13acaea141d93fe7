use anyhow::Result;
use async_trait::async_trait;
use http::{Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{connect::HttpConnector, Client as HttpClient};
use hyper_util::rt::TokioExecutor;

use crate::provider::{ProviderClient, ProviderRequest, ProviderResponse};

/// Production provider client: hyper with rustls and the system trust roots.
/// Plain http is also accepted, for lab setups talking to a local Keycloak.
pub struct HttpsClient {
    http: HttpClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HttpsClient {
    pub fn new() -> Result<Self> {
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();
        let http = HttpClient::builder(TokioExecutor::new()).build(connector);
        Ok(Self { http })
    }
}

#[async_trait]
impl ProviderClient for HttpsClient {
    async fn exchange(&self, request: ProviderRequest) -> Result<ProviderResponse> {
        let uri: Uri = request.url.parse()?;

        let mut req = Request::builder().method(request.method).uri(uri);
        if let Some(content_type) = request.content_type {
            req = req.header("content-type", content_type);
        }
        if let Some(authorization) = &request.authorization {
            req = req.header("authorization", authorization.as_str());
        }
        let req = req.body(Full::new(Bytes::from(request.body.unwrap_or_default())))?;

        let rsp = self.http.request(req).await?;
        let status = rsp.status();
        let body = rsp.into_body().collect().await?.to_bytes();

        Ok(ProviderResponse { status, body })
    }
}
