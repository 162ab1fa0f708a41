// Copyright (C) 2025 Stratus Cloud, Inc.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource-oriented wrappers over the request pipeline.

mod organizations;
mod workspaces;

pub use organizations::{
    Organization, OrganizationAttributes, OrganizationCreateOptions, OrganizationUpdateOptions,
    Organizations,
};
pub use workspaces::{
    Workspace, WorkspaceAttributes, WorkspaceCreateOptions, WorkspaceListOptions,
    WorkspaceUpdateOptions, Workspaces,
};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::document::Resource;
use crate::error::{Result, SdkError};

/// Characters escaped when a user-supplied value becomes a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%')
    .add(b'\\');

/// Percent-encode one path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Reject empty identifiers before they reach the wire.
pub(crate) fn require_identifier(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SdkError::InvalidInput(format!("{} is required", what)));
    }
    Ok(())
}

/// Unwrap the decoded document of a plain (non-conditional) read.
pub(crate) fn require_document<T>(slot: Option<Resource<T>>) -> Result<Resource<T>> {
    slot.ok_or_else(|| SdkError::MalformedResponse("server returned no document".to_string()))
}
