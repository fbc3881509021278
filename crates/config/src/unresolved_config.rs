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

use serde::Deserialize;
use serde::Serialize;

use rdt_shared::types::Interface;

use super::defaults::default_lock_file;
use super::defaults::default_log_level;
use super::defaults::default_perf_events_root;
use super::defaults::default_proc_root;
use super::defaults::default_resctrl_root;
use crate::*;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnresolvedRDTConfig {
    #[serde(default)]
    pub interface: Interface,

    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,

    #[serde(default)]
    pub logs: UnresolvedLogs,

    #[serde(default)]
    pub os_paths: UnresolvedOsPaths,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnresolvedLogs {
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

impl Default for UnresolvedLogs {
    fn default() -> Self {
        UnresolvedLogs {
            log_level: default_log_level(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnresolvedOsPaths {
    #[serde(default = "default_resctrl_root")]
    pub resctrl: PathBuf,

    #[serde(default = "default_proc_root")]
    pub proc: PathBuf,

    #[serde(default = "default_perf_events_root")]
    pub perf_events: PathBuf,
}

impl Default for UnresolvedOsPaths {
    fn default() -> Self {
        Self {
            resctrl: default_resctrl_root(),
            proc: default_proc_root(),
            perf_events: default_perf_events_root(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl UnresolvedRDTConfig {
    pub fn resolve(self) -> RDTConfig {
        RDTConfig {
            interface: self.interface,
            lock_file: self.lock_file,
            logs: self.logs.resolve(),
            os_paths: self.os_paths.resolve(),
        }
    }
}

impl LogLevel {
    pub fn to_tracing_filter(&self) -> tracing_subscriber::filter::LevelFilter {
        use tracing_subscriber::filter::LevelFilter;

        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl UnresolvedLogs {
    pub fn resolve(self) -> Logs {
        Logs {
            log_level: self.log_level.to_tracing_filter(),
        }
    }
}

impl UnresolvedOsPaths {
    pub fn resolve(self) -> OsPaths {
        OsPaths {
            resctrl: self.resctrl,
            proc: self.proc,
            perf_events: self.perf_events,
        }
    }
}
