// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! SpeakUp club management service: meeting scheduling, role sign-ups,
//! attendance check-in, member records, and bulk announcement email.

pub mod app;
pub mod models;
pub mod routes;
pub mod services;
