// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod date;

pub use date::{format_date, format_date_time, format_time, relative_time_span};
