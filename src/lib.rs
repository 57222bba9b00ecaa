//! Web Push subscription lifecycle, notification feed and terms gate for the
//! energy community app, plus the backend those clients talk to.

pub mod adapters;
mod app;
pub mod auth;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod feed;
pub mod permission;
pub mod ports;
pub mod push;
pub mod state;
pub mod store;
pub mod subscription;
pub mod terms;
pub mod types;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use app::app;
pub use push::{VapidCredentials, generate_vapid_credentials};

use std::net::SocketAddr;

pub async fn serve(addr: SocketAddr, config: config::AppConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(config)).await
}
