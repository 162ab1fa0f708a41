// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Organization operations.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::{Client, Destination, Payload};
use crate::document::Resource;
use crate::error::Result;
use crate::pagination::{ListOptions, Page};

use super::{encode_segment, require_document, require_identifier};

const KIND: &str = "organizations";

/// An organization resource as returned by the API.
pub type Organization = Resource<OrganizationAttributes>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OrganizationAttributes {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Server-assigned; absent on payloads the client sends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OrganizationCreateOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OrganizationUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Organization operations, obtained from [`Client::organizations`].
pub struct Organizations<'a> {
    client: &'a Client,
}

impl<'a> Organizations<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List organizations visible to the token.
    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &crate::CallContext,
        options: ListOptions,
    ) -> Result<Page<OrganizationAttributes>> {
        debug!("listing organizations");
        let request =
            self.client
                .build_request(Method::GET, "organizations", Payload::Query(&options))?;
        let mut page = Page::default();
        self.client
            .execute(ctx, request, Destination::Collection(&mut page))
            .await?;
        Ok(page)
    }

    /// Read a single organization by name.
    #[instrument(skip(self, ctx))]
    pub async fn read(&self, ctx: &crate::CallContext, name: &str) -> Result<Organization> {
        require_identifier(name, "organization name")?;
        let path = format!("organizations/{}", encode_segment(name));
        let request = self
            .client
            .build_request::<()>(Method::GET, &path, Payload::none())?;
        let mut slot = None;
        self.client
            .execute(ctx, request, Destination::Single(&mut slot))
            .await?;
        require_document(slot)
    }

    /// Create a new organization.
    #[instrument(skip(self, ctx, options), fields(name = %options.name))]
    pub async fn create(
        &self,
        ctx: &crate::CallContext,
        options: OrganizationCreateOptions,
    ) -> Result<Organization> {
        require_identifier(&options.name, "organization name")?;
        let request = self.client.build_request(
            Method::POST,
            "organizations",
            Payload::Resource {
                kind: KIND,
                id: None,
                value: &options,
            },
        )?;
        let mut slot = None;
        self.client
            .execute(ctx, request, Destination::Single(&mut slot))
            .await?;
        require_document(slot)
    }

    /// Update an organization's settings.
    #[instrument(skip(self, ctx, options))]
    pub async fn update(
        &self,
        ctx: &crate::CallContext,
        name: &str,
        options: OrganizationUpdateOptions,
    ) -> Result<Organization> {
        require_identifier(name, "organization name")?;
        let path = format!("organizations/{}", encode_segment(name));
        let request = self.client.build_request(
            Method::PATCH,
            &path,
            Payload::Resource {
                kind: KIND,
                id: Some(name),
                value: &options,
            },
        )?;
        let mut slot = None;
        self.client
            .execute(ctx, request, Destination::Single(&mut slot))
            .await?;
        require_document(slot)
    }

    /// Delete an organization by name.
    #[instrument(skip(self, ctx))]
    pub async fn delete(&self, ctx: &crate::CallContext, name: &str) -> Result<()> {
        require_identifier(name, "organization name")?;
        let path = format!("organizations/{}", encode_segment(name));
        let request = self
            .client
            .build_request::<()>(Method::DELETE, &path, Payload::none())?;
        self.client
            .execute::<()>(ctx, request, Destination::Ignore)
            .await
    }
}
