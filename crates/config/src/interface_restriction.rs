/*
 * Copyright 2024 Fluence Labs Limited
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::ffi::OsStr;

use thiserror::Error as ThisError;

use rdt_shared::types::Interface;

/// Environment variable that narrows the set of interfaces a process may use.
pub const INTERFACE_ENV_VAR: &str = "RDT_IFACE";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InterfaceRestriction {
    #[default]
    Unrestricted,
    /// Only the plain OS interface, resctrl monitoring is rejected too.
    OsOnly,
    MsrOnly,
}

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("RDT_IFACE={value} is neither an OS nor an MSR restriction")]
pub struct InvalidRestriction {
    pub value: String,
}

impl InterfaceRestriction {
    /// Parses the variable value, only its case-insensitive prefix matters.
    pub fn parse(value: Option<&str>) -> Result<Self, InvalidRestriction> {
        let Some(value) = value else {
            return Ok(Self::Unrestricted);
        };

        let starts_with = |prefix: &str| {
            value
                .get(..prefix.len())
                .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
        };

        if starts_with("OS") {
            Ok(Self::OsOnly)
        } else if starts_with("MSR") {
            Ok(Self::MsrOnly)
        } else {
            Err(InvalidRestriction {
                value: value.to_string(),
            })
        }
    }

    pub fn from_env() -> Result<Self, InvalidRestriction> {
        let value = std::env::var_os(INTERFACE_ENV_VAR);
        let value = value.as_deref().map(OsStr::to_string_lossy);
        Self::parse(value.as_deref())
    }

    pub fn allows(&self, interface: Interface) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::OsOnly => interface == Interface::Os,
            Self::MsrOnly => interface == Interface::Msr,
        }
    }
}
