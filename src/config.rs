// Library Manager - Circulation tracking for small libraries
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Application configuration (environment variables + defaults).
//!
//! | Variable                       | Default                                  |
//! |--------------------------------|------------------------------------------|
//! | `LIBRARY_DATABASE_PATH`        | `Database::default_path()`               |
//! | `LIBRARY_LOAN_PERIOD_DAYS`     | 14                                       |
//! | `LIBRARY_LOOKUP_URL`           | `lookup::DEFAULT_LOOKUP_URL`             |
//! | `LIBRARY_LOOKUP_TIMEOUT_SECS`  | 5                                        |

use crate::error::{LibraryError, Result};
use crate::lookup::LookupConfig;
use crate::storage::Database;
use std::path::PathBuf;
use std::time::Duration;

/// Days between issue date and due date
pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 14;

#[derive(Debug, Clone)]
pub struct LibraryConfig {
    pub database_path: PathBuf,
    pub loan_period_days: i64,
    pub lookup: LookupConfig,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            database_path: Database::default_path(),
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
            lookup: LookupConfig::default(),
        }
    }
}

impl LibraryConfig {
    /// Defaults overridden by whichever `LIBRARY_*` variables are set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LibraryConfig::from_env`] with an injectable variable source
    pub fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = var("LIBRARY_DATABASE_PATH").filter(|v| !v.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }

        if let Some(days) = var("LIBRARY_LOAN_PERIOD_DAYS") {
            let days: i64 = days.trim().parse()?;
            if days <= 0 {
                return Err(LibraryError::InvalidConfiguration(
                    "LIBRARY_LOAN_PERIOD_DAYS must be positive".to_string(),
                ));
            }
            config.loan_period_days = days;
        }

        if let Some(url) = var("LIBRARY_LOOKUP_URL").filter(|v| !v.trim().is_empty()) {
            config.lookup.base_url = url;
        }

        if let Some(secs) = var("LIBRARY_LOOKUP_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse()?;
            config.lookup.timeout = Duration::from_secs(secs.max(1));
        }

        Ok(config)
    }
}
