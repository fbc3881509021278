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

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error as ThisError;

use cpu_utils::CPUTopologyError;
use rdt_config::InvalidRestriction;
use rdt_msr::MSRError;
use rdt_shared::types::CacheLevel;
use rdt_shared::types::Interface;

pub type RDTResult<T> = Result<T, RDTError>;

#[derive(ThisError, Debug)]
pub enum RDTError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("RDT context isn't initialized")]
    NotInitialized,

    #[error("RDT context is already initialized")]
    AlreadyInitialized,

    #[error("{0} isn't detected")]
    ResourceNotDetected(&'static str),

    #[error(
        "{level} CDP is enabled on {enabled} and disabled on {disabled} domains, reset allocation or reboot the system"
    )]
    HardwareInconsistent {
        level: CacheLevel,
        enabled: usize,
        disabled: usize,
    },

    #[error("failed to reserve memory for capabilities: {0}")]
    AllocationFailure(#[from] TryReserveError),

    #[error(transparent)]
    RegisterAccess(#[from] MSRError),

    #[error("{level} cache geometry isn't detected")]
    CacheInfoMissing { level: CacheLevel },

    #[error("failed to read {path:?}: {io_error}")]
    ResctrlIo {
        path: PathBuf,
        io_error: std::io::Error,
    },

    #[error("failed to parse {path:?}: {reason}")]
    ResctrlParse { path: PathBuf, reason: String },

    #[error(transparent)]
    Topology(#[from] CPUTopologyError),

    #[error("no capability has been discovered")]
    NoCapabilityDiscovered,

    #[error("neither allocation nor monitoring could be initialized")]
    NoConsumerInitialized,

    #[error("interface {interface} is forbidden by RDT_IFACE")]
    InterfaceRestricted { interface: Interface },

    #[error(transparent)]
    InvalidInterfaceRestriction(#[from] InvalidRestriction),

    #[error("interface isn't supported: {0}")]
    InterfaceNotSupported(String),

    #[error("lock file {path:?} can't be opened: {io_error}")]
    LockFile {
        path: PathBuf,
        io_error: std::io::Error,
    },
}

impl RDTError {
    pub fn hardware_inconsistent(level: CacheLevel, enabled: usize, disabled: usize) -> Self {
        Self::HardwareInconsistent {
            level,
            enabled,
            disabled,
        }
    }

    pub fn cache_info_missing(level: CacheLevel) -> Self {
        Self::CacheInfoMissing { level }
    }

    pub fn resctrl_io(path: impl Into<PathBuf>, io_error: std::io::Error) -> Self {
        Self::ResctrlIo {
            path: path.into(),
            io_error,
        }
    }

    pub fn resctrl_parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ResctrlParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn interface_restricted(interface: Interface) -> Self {
        Self::InterfaceRestricted { interface }
    }

    pub fn interface_not_supported(reason: impl Into<String>) -> Self {
        Self::InterfaceNotSupported(reason.into())
    }

    pub fn lock_file(path: impl Into<PathBuf>, io_error: std::io::Error) -> Self {
        Self::LockFile {
            path: path.into(),
            io_error,
        }
    }

    /// A resource absent from the platform, the only discovery outcome
    /// that isn't fatal.
    pub fn is_resource_not_detected(&self) -> bool {
        matches!(self, Self::ResourceNotDetected(_))
    }
}
