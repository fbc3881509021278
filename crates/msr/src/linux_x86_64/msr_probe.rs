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

use std::collections::HashMap;
use std::fs::File;

use raw_cpuid::CpuIdReader;
use raw_cpuid::CpuIdReaderNative;
use raw_cpuid::CpuIdResult;

use rdt_shared::types::LogicalCoreId;

use super::utils;
use crate::MSRError;
use crate::MSRResult;
use crate::RegisterProbe;

/// Native probe: CPUID runs on the calling thread, registers are accessed
/// through the msr driver files opened once per core.
#[derive(Debug)]
pub struct MSRProbe {
    msr_files: HashMap<LogicalCoreId, File>,
}

impl MSRProbe {
    /// Opens MSR files for all provided cores, fails if any of them
    /// can't be opened (the msr driver isn't loaded, not enough rights).
    pub fn open(core_ids: impl IntoIterator<Item = LogicalCoreId>) -> MSRResult<Self> {
        let msr_files = core_ids
            .into_iter()
            .map(|core_id| {
                let file = utils::open_msr(core_id)
                    .map_err(|error| MSRError::open(core_id, error))?;
                Ok((core_id, file))
            })
            .collect::<MSRResult<HashMap<_, _>>>()?;

        tracing::debug!("Opened MSR files for {} cores", msr_files.len());

        Ok(Self { msr_files })
    }

    fn file(&self, core_id: LogicalCoreId) -> MSRResult<&File> {
        self.msr_files
            .get(&core_id)
            .ok_or(MSRError::core_not_opened(core_id))
    }
}

impl RegisterProbe for MSRProbe {
    fn query_feature(&self, leaf: u32, subleaf: u32) -> CpuIdResult {
        CpuIdReaderNative.cpuid2(leaf, subleaf)
    }

    fn read_register(&self, core_id: LogicalCoreId, register_id: u32) -> MSRResult<u64> {
        let file = self.file(core_id)?;
        utils::read_msr(file, register_id, core_id)
    }

    fn write_register(
        &self,
        core_id: LogicalCoreId,
        register_id: u32,
        value: u64,
    ) -> MSRResult<()> {
        let file = self.file(core_id)?;
        utils::write_msr(file, register_id, value, core_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unopened_core_is_reported() {
        let probe = MSRProbe::open(std::iter::empty()).unwrap();
        let core_id = LogicalCoreId::new(3);

        let result = probe.read_register(core_id, crate::registers::IA32_L3_QOS_CFG);

        assert!(matches!(result, Err(MSRError::CoreNotOpened { core_id: id }) if id == core_id));
    }

    #[test]
    fn feature_query_returns_max_basic_leaf() {
        let probe = MSRProbe::open(std::iter::empty()).unwrap();

        // leaf 0 reports the highest basic leaf, any x86_64 CPU has at least leaf 1
        let result = probe.query_feature(0, 0);

        assert!(result.eax >= 1);
    }
}
