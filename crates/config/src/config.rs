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

use std::path::PathBuf;

use rdt_shared::types::Interface;

use crate::defaults::default_lock_file;
use crate::defaults::default_log_level;
use crate::defaults::default_perf_events_root;
use crate::defaults::default_proc_root;
use crate::defaults::default_resctrl_root;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RDTConfig {
    pub interface: Interface,
    /// Advisory lock file shared by every process doing QoS discovery.
    pub lock_file: PathBuf,
    pub logs: Logs,
    pub os_paths: OsPaths,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Logs {
    pub log_level: tracing_subscriber::filter::LevelFilter,
}

/// Roots of the kernel interfaces used by the OS-delegated discovery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OsPaths {
    pub resctrl: PathBuf,
    pub proc: PathBuf,
    pub perf_events: PathBuf,
}

impl Default for Logs {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_tracing_filter(),
        }
    }
}

impl Default for OsPaths {
    fn default() -> Self {
        Self {
            resctrl: default_resctrl_root(),
            proc: default_proc_root(),
            perf_events: default_perf_events_root(),
        }
    }
}

impl Default for RDTConfig {
    fn default() -> Self {
        Self {
            interface: Interface::default(),
            lock_file: default_lock_file(),
            logs: Logs::default(),
            os_paths: OsPaths::default(),
        }
    }
}

impl RDTConfig {
    pub fn with_interface(interface: Interface) -> Self {
        Self {
            interface,
            ..Self::default()
        }
    }
}
