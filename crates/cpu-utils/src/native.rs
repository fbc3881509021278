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

use std::collections::BTreeMap;

use hwlocality::object::types::ObjectType;
use hwlocality::Topology;
use nonempty::NonEmpty;

use rdt_shared::types::CPUIdType;
use rdt_shared::types::L2ClusterId;
use rdt_shared::types::LogicalCoreId;
use rdt_shared::types::SocketId;

use crate::CPUTopology;
use crate::CPUTopologyError;
use crate::CTResult;
use crate::CacheInfo;
use crate::CoreInfo;

impl CPUTopology {
    /// Builds the topology of the current machine: socket and L2 membership
    /// comes from hwloc, cache geometry from the deterministic cache
    /// parameters leaf.
    pub fn from_os() -> CTResult<Self> {
        let topology = Topology::new()?;

        let packages = membership(&topology, ObjectType::Package)?;
        let clusters = membership(&topology, ObjectType::L2Cache)?;

        let cores = assign_cores(packages, &clusters);
        let cores = NonEmpty::from_vec(cores).ok_or(CPUTopologyError::LogicalCoresNotFound)?;

        let (l2, l3) = cache_geometry();
        tracing::debug!(
            "Built topology: {} cores, L2 {:?}, L3 {:?}",
            cores.len(),
            l2,
            l3
        );

        Ok(Self::new(cores, l2, l3))
    }
}

/// Maps every logical core to the logical index of the enclosing object of
/// the given type.
fn membership(
    topology: &Topology,
    object_type: ObjectType,
) -> CTResult<BTreeMap<LogicalCoreId, CPUIdType>> {
    let mut result = BTreeMap::new();

    for object in topology.objects_with_type(object_type) {
        let index = object.logical_index();
        let cpuset = object
            .cpuset()
            .ok_or(CPUTopologyError::cpuset_not_found(object_type, index))?;

        for core_id in cpuset.into_iter().map(usize::from) {
            let core_id = CPUIdType::try_from(core_id)
                .map_err(|_| CPUTopologyError::logical_core_too_big(core_id))?;
            result.insert(LogicalCoreId::new(core_id), index as CPUIdType);
        }
    }

    Ok(result)
}

/// Cores outside of any reported L2 object get a cluster of their own, its
/// id is allocated past every real L2 index.
fn assign_cores(
    packages: BTreeMap<LogicalCoreId, CPUIdType>,
    clusters: &BTreeMap<LogicalCoreId, CPUIdType>,
) -> Vec<CoreInfo> {
    let mut next_free = clusters.values().max().map_or(0, |max| max.saturating_add(1));

    packages
        .into_iter()
        .map(|(core_id, package)| {
            let l2_cluster = match clusters.get(&core_id) {
                Some(&cluster) => cluster,
                None => {
                    let cluster = next_free;
                    next_free = next_free.saturating_add(1);
                    tracing::debug!("Core {core_id} has no L2 object, using cluster {cluster}");
                    cluster
                }
            };
            CoreInfo {
                logical_core_id: core_id,
                socket: SocketId::new(package),
                l2_cluster: L2ClusterId::new(l2_cluster),
            }
        })
        .collect()
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn cache_geometry() -> (CacheInfo, CacheInfo) {
    use raw_cpuid::CacheType;
    use raw_cpuid::CpuId;

    let mut l2 = CacheInfo::not_detected();
    let mut l3 = CacheInfo::not_detected();

    let Some(parameters) = CpuId::new().get_cache_parameters() else {
        return (l2, l3);
    };

    for cache in parameters {
        if !matches!(cache.cache_type(), CacheType::Unified) {
            continue;
        }

        let num_ways = cache.associativity();
        let total_size = num_ways as u64
            * cache.physical_line_partitions() as u64
            * cache.coherency_line_size() as u64
            * cache.sets() as u64;
        let info = CacheInfo::new(num_ways as u32, total_size);

        match cache.level() {
            2 => l2 = info,
            3 => l3 = info,
            _ => {}
        }
    }

    (l2, l3)
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn cache_geometry() -> (CacheInfo, CacheInfo) {
    (CacheInfo::not_detected(), CacheInfo::not_detected())
}

#[cfg(test)]
mod tests;
