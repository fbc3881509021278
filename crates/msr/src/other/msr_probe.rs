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

//! This module is no-op implementation to allow the code to compile on non-x86_64 archs.
use raw_cpuid::CpuIdResult;

use rdt_shared::types::LogicalCoreId;

use crate::MSRError;
use crate::MSRResult;
use crate::RegisterProbe;

#[derive(Debug)]
pub struct MSRProbe {}

impl MSRProbe {
    pub fn open(_core_ids: impl IntoIterator<Item = LogicalCoreId>) -> MSRResult<Self> {
        Ok(Self {})
    }
}

impl RegisterProbe for MSRProbe {
    fn query_feature(&self, _leaf: u32, _subleaf: u32) -> CpuIdResult {
        CpuIdResult {
            eax: 0,
            ebx: 0,
            ecx: 0,
            edx: 0,
        }
    }

    fn read_register(&self, core_id: LogicalCoreId, register_id: u32) -> MSRResult<u64> {
        Err(MSRError::unavailable(register_id, core_id))
    }

    fn write_register(
        &self,
        core_id: LogicalCoreId,
        register_id: u32,
        _value: u64,
    ) -> MSRResult<()> {
        Err(MSRError::unavailable(register_id, core_id))
    }
}
