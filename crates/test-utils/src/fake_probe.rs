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

use parking_lot::Mutex;

use rdt_msr::CpuIdResult;
use rdt_msr::MSRError;
use rdt_msr::MSRResult;
use rdt_msr::RegisterProbe;
use rdt_shared::types::LogicalCoreId;

const BRAND_STRING_LEAVES: [u32; 3] = [0x8000_0002, 0x8000_0003, 0x8000_0004];

/// A scripted probe: CPUID leaves return what was configured (zeros
/// otherwise), registers live in a map and reading an absent one fails.
#[derive(Debug, Default)]
pub struct FakeProbe {
    leaves: HashMap<(u32, u32), CpuIdResult>,
    registers: Mutex<HashMap<(LogicalCoreId, u32), u64>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result of a CPUID query, words are in eax, ebx, ecx, edx order.
    pub fn with_leaf(mut self, leaf: u32, subleaf: u32, words: [u32; 4]) -> Self {
        let [eax, ebx, ecx, edx] = words;
        let result = CpuIdResult { eax, ebx, ecx, edx };
        self.leaves.insert((leaf, subleaf), result);
        self
    }

    pub fn with_register(self, core_id: u32, register_id: u32, value: u64) -> Self {
        self.registers
            .lock()
            .insert((LogicalCoreId::new(core_id), register_id), value);
        self
    }

    pub fn with_registers(self, registers: HashMap<(u32, u32), u64>) -> Self {
        registers
            .into_iter()
            .fold(self, |probe, ((core_id, register_id), value)| {
                probe.with_register(core_id, register_id, value)
            })
    }

    /// Fills the extended brand string leaves, the string is cut at 48 bytes.
    pub fn with_brand_string(self, brand: &str) -> Self {
        let mut bytes = [0u8; 48];
        let len = brand.len().min(bytes.len());
        bytes[..len].copy_from_slice(&brand.as_bytes()[..len]);

        let words = bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect::<Vec<_>>();

        let probe = self.with_leaf(0x8000_0000, 0, [0x8000_0004, 0, 0, 0]);
        BRAND_STRING_LEAVES
            .iter()
            .zip(words.chunks_exact(4))
            .fold(probe, |probe, (&leaf, words)| {
                probe.with_leaf(leaf, 0, [words[0], words[1], words[2], words[3]])
            })
    }

    pub fn register(&self, core_id: u32, register_id: u32) -> Option<u64> {
        self.registers
            .lock()
            .get(&(LogicalCoreId::new(core_id), register_id))
            .copied()
    }
}

impl RegisterProbe for FakeProbe {
    fn query_feature(&self, leaf: u32, subleaf: u32) -> CpuIdResult {
        self.leaves
            .get(&(leaf, subleaf))
            .copied()
            .unwrap_or(CpuIdResult {
                eax: 0,
                ebx: 0,
                ecx: 0,
                edx: 0,
            })
    }

    fn read_register(&self, core_id: LogicalCoreId, register_id: u32) -> MSRResult<u64> {
        self.registers
            .lock()
            .get(&(core_id, register_id))
            .copied()
            .ok_or(MSRError::unavailable(register_id, core_id))
    }

    fn write_register(
        &self,
        core_id: LogicalCoreId,
        register_id: u32,
        value: u64,
    ) -> MSRResult<()> {
        self.registers.lock().insert((core_id, register_id), value);
        Ok(())
    }
}
