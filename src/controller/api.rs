use anyhow::{anyhow, Result};
use http::{header, Request, Response, StatusCode};
use hyper::service::{make_service_fn, service_fn};
use hyper::body::HttpBody;
use hyper::Body;
use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Instant;
use tokio::runtime::{Builder, Runtime};
use tracing::{error, info, warn};

use super::response::{Empty, Envelope};
use super::routes::Route;
use super::{ControllerError, TaskService};
use crate::model::NewTask;

pub const BANNER: &str = "Task Tracker Backend is Running!";

/// Largest JSON body accepted on a request.
pub const BODY_LIMIT: usize = 100 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

pub struct Server {
    config: ServerConfig,
    service: TaskService,
}

impl Server {
    pub fn new(config: ServerConfig, service: TaskService) -> Server {
        Server { config, service }
    }

    /// Binds the listener and returns the address plus the serving future.
    /// Must be called from within a tokio runtime.
    pub fn bind(self) -> Result<(SocketAddr, impl Future<Output = hyper::Result<()>>)> {
        let addr = (self.config.host.as_str(), self.config.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow!("cannot resolve listen address {}", self.config.host))?;

        let service = self.service;
        let make_svc = make_service_fn(move |_conn| {
            let service = service.clone();
            async move {
                Ok::<_, Infallible>(service_fn(move |req| handle(service.clone(), req)))
            }
        });

        let server = hyper::Server::try_bind(&addr)?.serve(make_svc);
        let local_addr = server.local_addr();
        info!(addr = %local_addr, "Listening for task requests.");
        Ok((local_addr, server))
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tasktracker_http_server")
    }
}

/// Resolves the route, runs the matching operation and renders the
/// envelope. Never fails: every error becomes a response.
pub async fn handle(service: TaskService, req: Request<Body>) -> Result<Response<Body>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match Route::resolve(&method, &path) {
        None => json_response(
            StatusCode::NOT_FOUND,
            &Envelope::<()>::failure("Route not found"),
        ),
        Some(route) => match dispatch(&service, route, req).await {
            Ok(response) => response,
            Err(err) => error_response(&err),
        },
    };

    let status = response.status();
    let latency = format!("{:?}", started.elapsed());
    if status.is_server_error() {
        error!(%method, %path, status = status.as_u16(), %latency, "Request failed.");
    } else if status.is_client_error() {
        warn!(%method, %path, status = status.as_u16(), %latency, "Request rejected.");
    } else {
        info!(%method, %path, status = status.as_u16(), %latency, "Request served.");
    }
    Ok(response)
}

async fn dispatch(
    service: &TaskService,
    route: Route,
    req: Request<Body>,
) -> Result<Response<Body>, ControllerError> {
    let response = match route {
        Route::Banner => text_response(StatusCode::OK, BANNER),
        Route::ListAll => json_response(
            StatusCode::OK,
            &Envelope::ok("Tasks retrieved successfully", service.list_all().await?),
        ),
        Route::Add => {
            let new_task = read_json::<NewTask>(req).await?;
            json_response(
                StatusCode::CREATED,
                &Envelope::ok("Task added successfully", service.add(new_task).await?),
            )
        }
        Route::ListPending => json_response(
            StatusCode::OK,
            &Envelope::ok(
                "Pending tasks retrieved successfully",
                service.list_pending().await?,
            ),
        ),
        Route::ListCompleted => json_response(
            StatusCode::OK,
            &Envelope::ok(
                "Completed tasks retrieved successfully",
                service.list_completed().await?,
            ),
        ),
        Route::Complete(id) => json_response(
            StatusCode::OK,
            &Envelope::ok("Task marked as completed", service.complete(&id).await?),
        ),
        Route::Delete(id) => {
            service.delete(&id).await?;
            json_response(
                StatusCode::OK,
                &Envelope::ok("Task deleted successfully", Empty {}),
            )
        }
    };
    Ok(response)
}

// An empty body reads as an empty object. Bodies over `BODY_LIMIT` are
// refused before they are fully buffered.
async fn read_json<T>(req: Request<Body>) -> Result<T, ControllerError>
where
    T: serde::de::DeserializeOwned + Default,
{
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.map_or(false, |len| len > BODY_LIMIT) {
        return Err(ControllerError::PayloadTooLarge(BODY_LIMIT));
    }

    let mut body = req.into_body();
    let mut bytes = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(|err| ControllerError::MalformedBody(err.to_string()))?;
        if bytes.len() + chunk.len() > BODY_LIMIT {
            return Err(ControllerError::PayloadTooLarge(BODY_LIMIT));
        }
        bytes.extend_from_slice(&chunk);
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&bytes).map_err(|err| ControllerError::MalformedBody(err.to_string()))
}

fn error_response(err: &ControllerError) -> Response<Body> {
    if let ControllerError::Storage(reason) = err {
        error!(%reason, "Task store failure.");
    }
    json_response(err.status(), &Envelope::from(err))
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    let response = match serde_json::to_vec(body) {
        Ok(bytes) => Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes)),
        Err(err) => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(err.to_string())),
    };
    response.unwrap_or_else(|_| Response::new(Body::empty()))
}

fn text_response(status: StatusCode, text: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

/// Starts the HTTP API on its own runtime. The listener is bound before
/// returning so address errors surface to the caller.
pub fn build_runtime(cfg: ServerConfig, service: TaskService) -> Result<(Runtime, SocketAddr)> {
    let runtime = Builder::new_multi_thread()
        .thread_name("http-api")
        .enable_all()
        .build()?;

    let (addr, serving) = {
        let _guard = runtime.enter();
        Server::new(cfg, service).bind()?
    };
    runtime.spawn(async move {
        if let Err(err) = serving.await {
            error!(reason = %err, "HTTP API stopped.");
        }
    });
    Ok((runtime, addr))
}
