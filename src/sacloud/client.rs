use std::collections::BTreeMap;

use bytes::Bytes;
use headers::{Authorization, HeaderMapExt};
use http::header::{ACCEPT, USER_AGENT};
use http::{HeaderValue, Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{ConfigBuilderExt, HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rustls::{ClientConfig, RootCertStore};
use serde::Serialize;

use super::server::{FindResponse, Server};
use super::Inventory;
use crate::config::SecretString;

pub const DEFAULT_API_ROOT_URL: &str = "https://secure.sakura.ad.jp/cloud/zone";

/// Servers requested per page
const PAGE_SIZE: usize = 100;

/// Max length of the response body kept in error messages
const MAX_ERROR_BODY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("build request failed, {0}")]
    BuildRequest(#[from] http::Error),
    #[error("send request failed, {0}")]
    CallRequest(#[from] hyper_util::client::legacy::Error),
    #[error("read response failed, {0}")]
    ReadIncoming(#[from] hyper::Error),
    #[error("unexpected status code {status}, {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
    #[error("decode response failed, {0}")]
    Decode(#[from] serde_json::Error),
}

/// `FindCondition` of the Sakura Cloud API, it is sent as the JSON encoded
/// query string.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct FindCondition<'a> {
    from: usize,
    count: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    filter: BTreeMap<&'static str, &'a [String]>,
}

impl<'a> FindCondition<'a> {
    fn new(from: usize, tags: &'a [String]) -> Self {
        let mut filter = BTreeMap::new();
        if !tags.is_empty() {
            // servers must have every tag listed
            filter.insert("Tags.Name", tags);
        }

        FindCondition {
            from,
            count: PAGE_SIZE,
            filter,
        }
    }

    fn to_query(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(utf8_percent_encode(&json, NON_ALPHANUMERIC).to_string())
    }
}

/// Client of the Sakura Cloud IaaS API
#[derive(Clone)]
pub struct Client {
    client: HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
    endpoint: String,
    token: SecretString,
    secret: SecretString,
    user_agent: HeaderValue,
}

fn tls_config() -> ClientConfig {
    match ClientConfig::builder().with_native_roots() {
        Ok(builder) => builder.with_no_client_auth(),
        Err(err) => {
            // plain http endpoints still work
            warn!(message = "load native root certificates failed", %err);

            ClientConfig::builder()
                .with_root_certificates(RootCertStore::empty())
                .with_no_client_auth()
        }
    }
}

impl Client {
    /// `endpoint` is the API root, e.g. `https://secure.sakura.ad.jp/cloud/zone`
    pub fn new(endpoint: &str, token: SecretString, secret: SecretString) -> Self {
        let https = HttpsConnectorBuilder::new()
            .with_tls_config(tls_config())
            .https_or_http()
            .enable_http1()
            .build();
        let client = HyperClient::builder(TokioExecutor::new()).build(https);
        let user_agent = HeaderValue::from_str(&format!("sacloud-sd/{}", crate::get_version()))
            .expect("Invalid header value for version!");

        Client {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
            secret,
            user_agent,
        }
    }

    async fn find_page(
        &self,
        zone: &str,
        condition: &FindCondition<'_>,
    ) -> Result<FindResponse, Error> {
        let uri = format!(
            "{}/{}/api/cloud/1.1/server?{}",
            self.endpoint,
            zone,
            condition.to_query()?
        );

        let mut req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(USER_AGENT, self.user_agent.clone())
            .header(ACCEPT, "application/json")
            .body(Full::default())?;
        req.headers_mut()
            .typed_insert(Authorization::basic(&self.token, &self.secret));

        let resp = self.client.request(req).await?;
        let (parts, incoming) = resp.into_parts();
        let body = incoming.collect().await?.to_bytes();

        if !parts.status.is_success() {
            let body = String::from_utf8_lossy(&body[..body.len().min(MAX_ERROR_BODY)]);

            return Err(Error::UnexpectedStatus {
                status: parts.status,
                body: body.trim().to_string(),
            });
        }

        serde_json::from_slice(&body).map_err(Into::into)
    }
}

#[async_trait::async_trait]
impl Inventory for Client {
    async fn find_servers(&self, zone: &str, tags: &[String]) -> Result<Vec<Server>, Error> {
        let mut servers = Vec::new();

        loop {
            let condition = FindCondition::new(servers.len(), tags);
            let page = self.find_page(zone, &condition).await?;

            trace!(
                message = "server page fetched",
                zone,
                from = page.from,
                count = page.count,
                total = ?page.total
            );

            if page.servers.is_empty() {
                break;
            }

            servers.extend(page.servers);
            if let Some(total) = page.total
                && servers.len() >= total
            {
                break;
            }
        }

        debug!(message = "servers found", zone, ?tags, found = servers.len());

        Ok(servers)
    }
}
