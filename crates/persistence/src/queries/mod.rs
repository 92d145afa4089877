// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries for the persistence layer.

pub mod sessions;

pub use sessions::{get_session_row, get_session_version, list_purge_candidates};
