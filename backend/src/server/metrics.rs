//! Optional Prometheus metrics: request middleware plus a live socket gauge.

use std::sync::Arc;

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{IntGauge, Opts};

use rentals::outbound::notifications::PresenceRegistry;

/// Failure while assembling the metrics registry.
#[derive(Debug, thiserror::Error)]
pub(crate) enum MetricsError {
    #[error("failed to build Prometheus middleware: {0}")]
    Build(String),
    #[error("failed to register collector: {0}")]
    Register(#[from] prometheus::Error),
}

/// Reports the number of open notification sockets at scrape time.
struct PresenceCollector {
    presence: Arc<PresenceRegistry>,
    gauge: IntGauge,
}

impl PresenceCollector {
    fn new(presence: Arc<PresenceRegistry>) -> Result<Self, prometheus::Error> {
        let gauge = IntGauge::with_opts(
            Opts::new(
                "notification_sockets_open",
                "Notification WebSocket connections currently open",
            )
            .namespace("rentals"),
        )?;
        Ok(Self { presence, gauge })
    }
}

impl Collector for PresenceCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.gauge.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let open = i64::try_from(self.presence.connection_count()).unwrap_or(i64::MAX);
        self.gauge.set(open);
        self.gauge.collect()
    }
}

/// Build the `/metrics` middleware with the presence gauge registered.
pub(crate) fn build_metrics(
    presence: Arc<PresenceRegistry>,
) -> Result<PrometheusMetrics, MetricsError> {
    let metrics = PrometheusMetricsBuilder::new("rentals")
        .endpoint("/metrics")
        .build()
        .map_err(|error| MetricsError::Build(error.to_string()))?;
    metrics
        .registry
        .register(Box::new(PresenceCollector::new(presence)?))?;
    Ok(metrics)
}

#[derive(Clone)]
pub(crate) enum MetricsLayer {
    Enabled(Arc<PrometheusMetrics>),
    Disabled,
}

impl MetricsLayer {
    #[must_use]
    pub(crate) fn from_option(metrics: Option<PrometheusMetrics>) -> Self {
        match metrics {
            Some(metrics) => Self::Enabled(Arc::new(metrics)),
            None => Self::Disabled,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.clone() {
            MetricsLayer::Enabled(metrics) => {
                let fut = Compat::new((*metrics).clone()).new_transform(service);
                Box::pin(async move {
                    let svc = fut.await?;
                    Ok(boxed::service(svc))
                })
            }
            MetricsLayer::Disabled => Box::pin(async move {
                let svc = service.map(|res: ServiceResponse<B>| res.map_into_boxed_body());
                Ok(boxed::service(svc))
            }),
        }
    }
}
