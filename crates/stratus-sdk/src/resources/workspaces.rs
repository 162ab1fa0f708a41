// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workspace operations.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::{Client, Destination, Payload};
use crate::document::Resource;
use crate::error::Result;
use crate::pagination::{ListOptions, Page};

use super::{encode_segment, require_document, require_identifier};

const KIND: &str = "workspaces";

/// A workspace resource as returned by the API.
///
/// Workspaces carry an `organization` relationship linking back to their
/// owning organization.
pub type Workspace = Resource<WorkspaceAttributes>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceAttributes {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Query options for [`Workspaces::list`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkspaceListOptions {
    #[serde(flatten)]
    pub page: ListOptions,
    /// Substring filter on workspace names.
    #[serde(rename = "search[name]", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl WorkspaceListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: ListOptions) -> Self {
        self.page = page;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceCreateOptions {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub auto_apply: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceUpdateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_apply: Option<bool>,
}

/// Workspace operations, obtained from [`Client::workspaces`].
pub struct Workspaces<'a> {
    client: &'a Client,
}

impl<'a> Workspaces<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// List workspaces in an organization, in server-provided order.
    #[instrument(skip(self, ctx, options))]
    pub async fn list(
        &self,
        ctx: &crate::CallContext,
        organization: &str,
        options: WorkspaceListOptions,
    ) -> Result<Page<WorkspaceAttributes>> {
        require_identifier(organization, "organization name")?;
        debug!("listing workspaces");
        let path = format!("organizations/{}/workspaces", encode_segment(organization));
        let request = self
            .client
            .build_request(Method::GET, &path, Payload::Query(&options))?;
        let mut page = Page::default();
        self.client
            .execute(ctx, request, Destination::Collection(&mut page))
            .await?;
        Ok(page)
    }

    /// Read a workspace by organization and name.
    #[instrument(skip(self, ctx))]
    pub async fn read(
        &self,
        ctx: &crate::CallContext,
        organization: &str,
        name: &str,
    ) -> Result<Workspace> {
        require_identifier(organization, "organization name")?;
        require_identifier(name, "workspace name")?;
        let path = format!(
            "organizations/{}/workspaces/{}",
            encode_segment(organization),
            encode_segment(name)
        );
        let request = self
            .client
            .build_request::<()>(Method::GET, &path, Payload::none())?;
        let mut slot = None;
        self.client
            .execute(ctx, request, Destination::Single(&mut slot))
            .await?;
        require_document(slot)
    }

    /// Create a workspace in an organization.
    #[instrument(skip(self, ctx, options), fields(name = %options.name))]
    pub async fn create(
        &self,
        ctx: &crate::CallContext,
        organization: &str,
        options: WorkspaceCreateOptions,
    ) -> Result<Workspace> {
        require_identifier(organization, "organization name")?;
        require_identifier(&options.name, "workspace name")?;
        let path = format!("organizations/{}/workspaces", encode_segment(organization));
        let request = self.client.build_request(
            Method::POST,
            &path,
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

    /// Update a workspace's settings.
    #[instrument(skip(self, ctx, options))]
    pub async fn update(
        &self,
        ctx: &crate::CallContext,
        organization: &str,
        name: &str,
        options: WorkspaceUpdateOptions,
    ) -> Result<Workspace> {
        require_identifier(organization, "organization name")?;
        require_identifier(name, "workspace name")?;
        let path = format!(
            "organizations/{}/workspaces/{}",
            encode_segment(organization),
            encode_segment(name)
        );
        let request = self.client.build_request(
            Method::PATCH,
            &path,
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

    /// Delete a workspace.
    #[instrument(skip(self, ctx))]
    pub async fn delete(
        &self,
        ctx: &crate::CallContext,
        organization: &str,
        name: &str,
    ) -> Result<()> {
        require_identifier(organization, "organization name")?;
        require_identifier(name, "workspace name")?;
        let path = format!(
            "organizations/{}/workspaces/{}",
            encode_segment(organization),
            encode_segment(name)
        );
        let request = self
            .client
            .build_request::<()>(Method::DELETE, &path, Payload::none())?;
        self.client
            .execute::<()>(ctx, request, Destination::Ignore)
            .await
    }

    /// Lock a workspace by its external identifier.
    #[instrument(skip(self, ctx))]
    pub async fn lock(&self, ctx: &crate::CallContext, workspace_id: &str) -> Result<Workspace> {
        self.toggle_lock(ctx, workspace_id, "lock").await
    }

    /// Unlock a workspace by its external identifier.
    #[instrument(skip(self, ctx))]
    pub async fn unlock(&self, ctx: &crate::CallContext, workspace_id: &str) -> Result<Workspace> {
        self.toggle_lock(ctx, workspace_id, "unlock").await
    }

    async fn toggle_lock(
        &self,
        ctx: &crate::CallContext,
        workspace_id: &str,
        action: &str,
    ) -> Result<Workspace> {
        require_identifier(workspace_id, "workspace id")?;
        let path = format!(
            "workspaces/{}/actions/{}",
            encode_segment(workspace_id),
            action
        );
        let request = self
            .client
            .build_request::<()>(Method::POST, &path, Payload::none())?;
        let mut slot = None;
        self.client
            .execute(ctx, request, Destination::Single(&mut slot))
            .await?;
        require_document(slot)
    }
}
