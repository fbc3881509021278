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
use rdt_msr::registers::IA32_L3_MASK_END;
use rdt_msr::registers::IA32_L3_MASK_START;
use rdt_msr::RegisterProbe;
use rdt_shared::types::CacheLevel;

use super::cache_alloc_leaf;
use super::cdp_enabled;
use super::has_bit;
use super::ALLOCATION_FEATURE_BIT;
use super::ALLOCATION_LEAF;
use super::FEATURES_LEAF;
use super::L3_ALLOCATION_RES_ID;
use crate::CacheAllocCapability;
use crate::RDTError;
use crate::RDTResult;

const RESOURCE: &str = "L3 CAT";

const EXTENDED_MAX_LEAF: u32 = 0x8000_0000;
const BRAND_LEAF_START: u32 = 0x8000_0002;
const BRAND_LEAF_END: u32 = 0x8000_0004;

/// Models that have L3 CAT without advertising it through CPUID.
const SUPPORTED_BRANDS: [&str; 8] = [
    "E5-2658 v3",
    "E5-2648L v3",
    "E5-2628L v3",
    "E5-2618L v3",
    "E5-2608L v3",
    "E5-2658A v3",
    "E3-1258L v4",
    "E3-1278L v4",
];
const BRAND_NUM_CLASSES: u32 = 4;

pub(crate) fn discover(
    probe: &impl RegisterProbe,
    topology: &CPUTopology,
) -> RDTResult<CacheAllocCapability> {
    let features = probe.query_feature(FEATURES_LEAF, 0);

    let mut capability = if has_bit(features.ebx, ALLOCATION_FEATURE_BIT) {
        tracing::info!("CPUID.0x7.0: L3 CAT supported");
        discover_by_cpuid(probe, topology)?
    } else {
        tracing::info!("CPUID.0x7.0: L3 CAT not detected, checking brand string");
        discover_by_model(probe, topology)?
    };

    let l3 = topology.cache_info(CacheLevel::L3);
    if !l3.detected {
        return Err(RDTError::ResourceNotDetected(RESOURCE));
    }
    capability.way_size = l3
        .total_size
        .checked_div(capability.num_ways as u64)
        .unwrap_or(0);

    Ok(capability)
}

fn discover_by_cpuid(
    probe: &impl RegisterProbe,
    topology: &CPUTopology,
) -> RDTResult<CacheAllocCapability> {
    let resources = probe.query_feature(ALLOCATION_LEAF, 0);
    if !has_bit(resources.ebx, L3_ALLOCATION_RES_ID) {
        tracing::info!("CPUID.0x10.0: L3 CAT not detected");
        return Err(RDTError::ResourceNotDetected(RESOURCE));
    }

    let mut capability = cache_alloc_leaf(probe, L3_ALLOCATION_RES_ID);
    if capability.cdp && cdp_enabled(probe, topology, CacheLevel::L3)? {
        capability.cdp_on = true;
        capability.num_classes /= 2;
    }

    Ok(capability)
}

/// Older parts: a known brand string or a walk over the class mask
/// registers. Ways come from the topology, CDP isn't available.
fn discover_by_model(
    probe: &impl RegisterProbe,
    topology: &CPUTopology,
) -> RDTResult<CacheAllocCapability> {
    let num_classes = match brand_string(probe) {
        Some(brand) if SUPPORTED_BRANDS.iter().any(|model| brand.contains(model)) => {
            tracing::info!("Cache allocation detected for model name '{brand}'");
            BRAND_NUM_CLASSES
        }
        brand => {
            if let Some(brand) = brand {
                tracing::warn!("Cache allocation not supported on model name '{brand}'");
            }
            probe_num_classes(probe, topology)?
        }
    };

    Ok(CacheAllocCapability {
        num_classes,
        num_ways: topology.cache_info(CacheLevel::L3).num_ways,
        way_size: 0,
        way_contention: 0,
        cdp: false,
        cdp_on: false,
    })
}

fn brand_string(probe: &impl RegisterProbe) -> Option<String> {
    let max_extended = probe.query_feature(EXTENDED_MAX_LEAF, 0).eax;
    if max_extended < BRAND_LEAF_END {
        tracing::warn!("Brand string CPUID extended leaves are not supported");
        return None;
    }

    let bytes = (BRAND_LEAF_START..=BRAND_LEAF_END)
        .map(|leaf| probe.query_feature(leaf, 0))
        .flat_map(|result| [result.eax, result.ebx, result.ecx, result.edx])
        .flat_map(u32::to_le_bytes)
        .take_while(|&byte| byte != 0)
        .collect::<Vec<_>>();
    let brand = String::from_utf8_lossy(&bytes).into_owned();
    tracing::debug!("CPU brand string '{brand}'");

    Some(brand)
}

/// Reads class mask registers on the first core until one fails, the
/// number of readable ones is the number of classes.
fn probe_num_classes(probe: &impl RegisterProbe, topology: &CPUTopology) -> RDTResult<u32> {
    let core_id = topology.first_core();
    let num_classes = (IA32_L3_MASK_START..=IA32_L3_MASK_END)
        .take_while(|&register_id| probe.read_register(core_id, register_id).is_ok())
        .count() as u32;

    if num_classes == 0 {
        tracing::warn!("Error probing class 0 mask on core {core_id}");
        return Err(RDTError::ResourceNotDetected(RESOURCE));
    }

    Ok(num_classes)
}
