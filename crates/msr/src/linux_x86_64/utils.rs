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

use std::fs::File;
use std::io;

use rdt_shared::types::LogicalCoreId;

use crate::MSRError;
use crate::MSRResult;

const MSR_VALUE_SIZE: usize = std::mem::size_of::<u64>();

pub(crate) fn read_msr(file: &File, register_id: u32, core_id: LogicalCoreId) -> MSRResult<u64> {
    use nix::sys::uio::pread;

    let mut value = [0u8; MSR_VALUE_SIZE];
    let transferred = pread(file, &mut value, register_id as i64)
        .map_err(|errno| MSRError::read_w_no_err(register_id, core_id, errno))?;
    if transferred != MSR_VALUE_SIZE {
        return Err(MSRError::short_transfer(register_id, core_id, transferred));
    }
    let result = u64::from_le_bytes(value);

    tracing::debug!("Read MSR register_id {register_id:#X} value {result:#X} at core id {core_id}");

    Ok(result)
}

pub(crate) fn write_msr(
    file: &File,
    register_id: u32,
    value: u64,
    core_id: LogicalCoreId,
) -> MSRResult<()> {
    use nix::sys::uio::pwrite;

    tracing::debug!("Write MSR register_id {register_id:#X} value {value:#X} at core id {core_id}");

    let value_as_bytes = value.to_le_bytes();
    let transferred = pwrite(file, &value_as_bytes, register_id as i64)
        .map_err(|errno| MSRError::write_w_no_err(value, register_id, core_id, errno))?;
    if transferred != MSR_VALUE_SIZE {
        return Err(MSRError::short_transfer(register_id, core_id, transferred));
    }

    Ok(())
}

pub(crate) fn open_msr(core_id: LogicalCoreId) -> io::Result<File> {
    use std::fs::OpenOptions;

    let path = format!("/dev/cpu/{}/msr", core_id);
    OpenOptions::new().read(true).write(true).open(path)
}
