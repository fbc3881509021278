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

use cpu_utils::CPUTopology;
use rdt_msr::RegisterProbe;
use rdt_shared::types::CacheLevel;

use super::allocation_supported;
use super::cache_alloc_leaf;
use super::cdp_enabled;
use super::L2_ALLOCATION_RES_ID;
use crate::CacheAllocCapability;
use crate::RDTError;
use crate::RDTResult;

pub(crate) fn discover(
    probe: &impl RegisterProbe,
    topology: &CPUTopology,
) -> RDTResult<CacheAllocCapability> {
    if !allocation_supported(probe, L2_ALLOCATION_RES_ID) {
        tracing::info!("CPUID: L2 CAT not supported");
        return Err(RDTError::ResourceNotDetected("L2 CAT"));
    }

    let mut capability = cache_alloc_leaf(probe, L2_ALLOCATION_RES_ID);
    if capability.cdp && cdp_enabled(probe, topology, CacheLevel::L2)? {
        capability.cdp_on = true;
        capability.num_classes /= 2;
    }

    let l2 = topology.cache_info(CacheLevel::L2);
    if !l2.detected {
        tracing::error!("Error reading L2 info");
        return Err(RDTError::cache_info_missing(CacheLevel::L2));
    }
    capability.way_size = l2.total_size / capability.num_ways as u64;

    Ok(capability)
}

#[cfg(test)]
mod tests;
