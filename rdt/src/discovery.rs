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

//! Discovery of each QoS resource, either straight from the feature
//! enumeration leaves and registers or delegated to the OS.

mod cdp;
mod l2ca;
mod l3ca;
mod mba;
mod monitoring;
mod register;

pub use cdp::cdp_census;
pub use cdp::cdp_enabled;
pub use cdp::CdpCensus;
pub use register::RegisterDiscovery;

use cpu_utils::CPUTopology;
use rdt_msr::RegisterProbe;

use crate::CacheAllocCapability;
use crate::MbaCapability;
use crate::MbaController;
use crate::MonitoringCapability;
use crate::RDTResult;

/// One discovery routine per resource kind. Absent resources are reported
/// as `RDTError::ResourceNotDetected`, everything else is fatal.
pub trait CapabilityDiscovery {
    fn discover_monitoring(&self, topology: &CPUTopology) -> RDTResult<MonitoringCapability>;

    fn discover_l3ca(&self, topology: &CPUTopology) -> RDTResult<CacheAllocCapability>;

    fn discover_l2ca(&self, topology: &CPUTopology) -> RDTResult<CacheAllocCapability>;

    fn discover_mba(&self, topology: &CPUTopology) -> RDTResult<MbaCapability>;

    /// Status of the MBA software controller for an already discovered
    /// record. Backends that can't tell keep the record as is.
    fn mba_controller(&self, mba: &MbaCapability) -> RDTResult<MbaController> {
        Ok(mba.controller())
    }
}

pub(crate) const FEATURES_LEAF: u32 = 0x7;
pub(crate) const MONITORING_LEAF: u32 = 0xF;
pub(crate) const ALLOCATION_LEAF: u32 = 0x10;
pub(crate) const PMU_LEAF: u32 = 0xA;

/// CPUID.(7,0).EBX
pub(crate) const MONITORING_FEATURE_BIT: u32 = 12;
pub(crate) const ALLOCATION_FEATURE_BIT: u32 = 15;

/// Resource ids, both bits of CPUID.(0x10,0).EBX and sub-leaves of 0x10.
pub(crate) const L3_ALLOCATION_RES_ID: u32 = 1;
pub(crate) const L2_ALLOCATION_RES_ID: u32 = 2;
pub(crate) const MB_ALLOCATION_RES_ID: u32 = 3;

const CDP_SUPPORT_BIT: u32 = 2;

pub(crate) fn has_bit(value: u32, bit: u32) -> bool {
    value & (1 << bit) != 0
}

/// Checks CPUID.(7,0) and CPUID.(0x10,0) for the allocation resource.
pub(crate) fn allocation_supported(probe: &impl RegisterProbe, res_id: u32) -> bool {
    let features = probe.query_feature(FEATURES_LEAF, 0);
    if !has_bit(features.ebx, ALLOCATION_FEATURE_BIT) {
        return false;
    }

    let resources = probe.query_feature(ALLOCATION_LEAF, 0);
    has_bit(resources.ebx, res_id)
}

/// Decodes the cache allocation sub-leaf, way size is left for the caller.
pub(crate) fn cache_alloc_leaf(probe: &impl RegisterProbe, res_id: u32) -> CacheAllocCapability {
    let leaf = probe.query_feature(ALLOCATION_LEAF, res_id);

    CacheAllocCapability {
        num_classes: (leaf.edx & 0xFFFF) + 1,
        num_ways: (leaf.eax & 0x1F) + 1,
        way_size: 0,
        way_contention: leaf.ebx as u64,
        cdp: has_bit(leaf.ecx, CDP_SUPPORT_BIT),
        cdp_on: false,
    }
}
