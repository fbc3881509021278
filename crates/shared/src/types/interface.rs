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

use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error as ThisError;

/// Backend used to discover and later program QoS features.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interface {
    /// Direct access through CPUID and model specific registers.
    #[default]
    Msr,
    /// Delegated to the OS through the resctrl filesystem.
    Os,
    /// Like `Os`, but monitoring goes through resctrl as well.
    OsResctrlMon,
}

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("unknown interface '{value}', expected one of: msr, os, os-resctrl-mon")]
pub struct ParseInterfaceError {
    value: String,
}

impl Interface {
    pub fn is_os(&self) -> bool {
        matches!(self, Interface::Os | Interface::OsResctrlMon)
    }
}

impl FromStr for Interface {
    type Err = ParseInterfaceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "msr" => Ok(Interface::Msr),
            "os" => Ok(Interface::Os),
            "os-resctrl-mon" => Ok(Interface::OsResctrlMon),
            _ => Err(ParseInterfaceError {
                value: value.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interface::Msr => write!(f, "msr"),
            Interface::Os => write!(f, "os"),
            Interface::OsResctrlMon => write!(f, "os-resctrl-mon"),
        }
    }
}
