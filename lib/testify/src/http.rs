use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::HeaderMap;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

/// What the mock server saw, body is not captured.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

/// A HTTP/1 server listening on a random local port, every request is
/// answered by the handler passed to [`serve`].
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    /// `http://127.0.0.1:<port>`
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

pub async fn serve<F>(handler: F) -> MockServer
where
    F: Fn(&Request<Incoming>) -> Response<Full<Bytes>> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("local address of mock server");
    let handler = Arc::new(handler);
    let requests = Arc::new(Mutex::new(Vec::new()));

    let recorded = Arc::clone(&requests);
    tokio::spawn(async move {
        while let Ok((stream, _peer)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            let recorded = Arc::clone(&recorded);

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    recorded.lock().unwrap().push(RecordedRequest {
                        method: req.method().clone(),
                        path: req.uri().path().to_string(),
                        query: req.uri().query().map(ToString::to_string),
                        headers: req.headers().clone(),
                    });

                    let resp = handler(&req);
                    async move { Ok::<_, Infallible>(resp) }
                });

                if let Err(err) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await
                {
                    panic!("failed to serve connection: {err}")
                }
            });
        }
    });

    MockServer { addr, requests }
}

/// HTTP status code 200 with a JSON body
pub fn json(body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json; charset=UTF-8")
        .body(Full::new(body.into()))
        .unwrap()
}

pub fn unauthorized() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .body(Full::new(
            r#"{"is_fatal":true,"status":"401 Unauthorized","error_code":"unauthorized","error_msg":"error-unauthorized"}"#.into(),
        ))
        .unwrap()
}

/// HTTP status code 404
pub fn not_found() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Full::new("Not Found".into()))
        .unwrap()
}
