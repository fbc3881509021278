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

use nix::errno::Errno;
use thiserror::Error as ThisError;

use rdt_shared::types::LogicalCoreId;

#[derive(ThisError, Debug)]
pub enum MSRError {
    #[error("opening MSR file '/dev/cpu/{core_id:}/msr' there is an error: {io_error:?}")]
    Open {
        core_id: LogicalCoreId,
        io_error: std::io::Error,
    },

    #[error("MSR file for core {core_id} hasn't been opened")]
    CoreNotOpened { core_id: LogicalCoreId },

    #[error(
        "reading from register_id {register_id:#X} and MSR file '/dev/cpu/{core_id:}/msr' there is an error: {errno:?}"
    )]
    ReadWNoErr {
        register_id: u32,
        core_id: LogicalCoreId,
        errno: Errno,
    },

    #[error(
        "writing value {value:#X} for register_id {register_id:#X} into MSR file '/dev/cpu/{core_id:}/msr' there is an error: {errno:?}"
    )]
    WriteWNoErr {
        value: u64,
        register_id: u32,
        core_id: LogicalCoreId,
        errno: Errno,
    },

    #[error(
        "register_id {register_id:#X} at core {core_id} transferred {transferred} bytes instead of 8"
    )]
    ShortTransfer {
        register_id: u32,
        core_id: LogicalCoreId,
        transferred: usize,
    },

    #[error("register_id {register_id:#X} at core {core_id} isn't available on this platform")]
    Unavailable {
        register_id: u32,
        core_id: LogicalCoreId,
    },
}

impl MSRError {
    pub fn open(core_id: LogicalCoreId, io_error: std::io::Error) -> Self {
        Self::Open { core_id, io_error }
    }

    pub fn core_not_opened(core_id: LogicalCoreId) -> Self {
        Self::CoreNotOpened { core_id }
    }

    pub fn read_w_no_err(register_id: u32, core_id: LogicalCoreId, errno: Errno) -> Self {
        Self::ReadWNoErr {
            register_id,
            core_id,
            errno,
        }
    }

    pub fn write_w_no_err(
        value: u64,
        register_id: u32,
        core_id: LogicalCoreId,
        errno: Errno,
    ) -> Self {
        Self::WriteWNoErr {
            value,
            register_id,
            core_id,
            errno,
        }
    }

    pub fn short_transfer(register_id: u32, core_id: LogicalCoreId, transferred: usize) -> Self {
        Self::ShortTransfer {
            register_id,
            core_id,
            transferred,
        }
    }

    pub fn unavailable(register_id: u32, core_id: LogicalCoreId) -> Self {
        Self::Unavailable {
            register_id,
            core_id,
        }
    }
}
