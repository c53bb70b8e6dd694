// Topology protocol - heartbeat client, endpoint extraction, request seams

mod client;
mod endpoints;
mod request;

pub use client::TopologyClient;
pub use endpoints::{EndpointExtractor, RenewalTrigger};
pub use request::{
    IntervalApplier, LoggingIntervalApplier, NoTelemetry, OsInfoRequestSource, TelemetrySource,
    TopologyRequestSource,
};
