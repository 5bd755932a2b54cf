// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response for the version endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VersionResponse {
    pub agent: String,
    pub version: String,
}

/// Role-dependent help payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HelpResponse {
    /// "officer" or "member"
    pub audience: String,
    pub topics: Vec<String>,
}
