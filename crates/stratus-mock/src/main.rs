// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Run the mock API on a fixed port for manual poking.

use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let addr = std::env::var("STRATUS_MOCK_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "stratus-mock listening");
    stratus_mock::run(listener).await
}
