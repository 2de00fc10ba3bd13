//! HTTP surface for [`GradingService`].
//!
//! `tiny_http` accepts connections on a blocking thread; each request is
//! handed to its own tokio task so slow grading calls never hold up others.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::error::GradeError;
use crate::service::{GradingService, Reply};

const ACCEPT_POLL: Duration = Duration::from_millis(100);

pub struct GradingServer {
    server: Arc<tiny_http::Server>,
    service: Arc<GradingService>,
}

impl GradingServer {
    /// Bind to `addr`. Port 0 picks a free port; see [`Self::local_addr`].
    ///
    /// # Errors
    ///
    /// Returns [`GradeError::Server`] if the address cannot be bound.
    pub fn bind(addr: &str, service: GradingService) -> Result<Self, GradeError> {
        let server = tiny_http::Server::http(addr)
            .map_err(|e| GradeError::Server(format!("failed to bind {addr}: {e}")))?;
        Ok(Self {
            server: Arc::new(server),
            service: Arc::new(service),
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve until `cancel` fires.
    ///
    /// Requests already accepted keep running on their own tasks.
    ///
    /// # Errors
    ///
    /// Returns [`GradeError::Server`] if accepting connections fails.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), GradeError> {
        if let Some(addr) = self.local_addr() {
            tracing::info!(%addr, "grading server listening");
        }
        let runtime = Handle::current();
        let server = Arc::clone(&self.server);
        let service = Arc::clone(&self.service);
        let stop = cancel.clone();

        tokio::task::spawn_blocking(move || accept_loop(&server, &service, &runtime, &stop))
            .await
            .map_err(|e| GradeError::Server(format!("accept loop join: {e}")))??;

        tracing::info!("grading server stopped");
        Ok(())
    }
}

fn accept_loop(
    server: &tiny_http::Server,
    service: &Arc<GradingService>,
    runtime: &Handle,
    cancel: &CancellationToken,
) -> Result<(), GradeError> {
    while !cancel.is_cancelled() {
        match server.recv_timeout(ACCEPT_POLL) {
            Ok(Some(request)) => {
                runtime.spawn(serve(request, Arc::clone(service)));
            }
            Ok(None) => {}
            Err(e) => return Err(GradeError::Server(format!("recv error: {e}"))),
        }
    }
    Ok(())
}

async fn serve(request: tiny_http::Request, service: Arc<GradingService>) {
    let method = request.method().clone();
    let url = request.url().to_string();

    // Body reads block on the socket
    let read = tokio::task::spawn_blocking(move || {
        let mut request = request;
        let mut body = Vec::new();
        let result = request.as_reader().read_to_end(&mut body).map(|_| body);
        (request, result)
    })
    .await;
    let Ok((request, body)) = read else {
        tracing::warn!(%method, %url, "request reader task failed");
        return;
    };

    let reply = match body {
        Ok(body) => service.handle(&method, &body).await,
        Err(error) => Reply::error(500, format!("failed to read request body: {error}")),
    };
    tracing::debug!(%method, %url, status = reply.status, "grading request served");

    let responded =
        tokio::task::spawn_blocking(move || request.respond(reply.into_response())).await;
    match responded {
        Ok(Ok(())) => {}
        Ok(Err(error)) => tracing::warn!(%error, %url, "failed to write response"),
        Err(error) => tracing::warn!(%error, %url, "response writer task failed"),
    }
}
