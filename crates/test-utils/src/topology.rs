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

use nonempty::NonEmpty;

use cpu_utils::CPUTopology;
use cpu_utils::CacheInfo;
use cpu_utils::CoreInfo;
use rdt_shared::types::L2ClusterId;
use rdt_shared::types::LogicalCoreId;
use rdt_shared::types::SocketId;

pub const L2_SIZE: u64 = 1024 * 1024;
pub const L2_WAYS: u32 = 16;
pub const L3_SIZE: u64 = 25 * 1024 * 1024;
pub const L3_WAYS: u32 = 20;

/// Builds a regular topology where logical core ids are assigned socket by
/// socket, cluster by cluster. Cluster ids are global.
pub fn topology(
    sockets: u32,
    clusters_per_socket: u32,
    cores_per_cluster: u32,
    l2: CacheInfo,
    l3: CacheInfo,
) -> CPUTopology {
    let mut cores = Vec::new();
    for socket in 0..sockets {
        for cluster in 0..clusters_per_socket {
            let cluster_id = socket * clusters_per_socket + cluster;
            for core in 0..cores_per_cluster {
                cores.push(CoreInfo {
                    logical_core_id: LogicalCoreId::new(cluster_id * cores_per_cluster + core),
                    socket: SocketId::new(socket),
                    l2_cluster: L2ClusterId::new(cluster_id),
                });
            }
        }
    }

    let cores = NonEmpty::from_vec(cores).unwrap_or_else(|| {
        NonEmpty::new(CoreInfo {
            logical_core_id: LogicalCoreId::new(0),
            socket: SocketId::new(0),
            l2_cluster: L2ClusterId::new(0),
        })
    });

    CPUTopology::new(cores, l2, l3)
}

pub fn l2_cache() -> CacheInfo {
    CacheInfo::new(L2_WAYS, L2_SIZE)
}

pub fn l3_cache() -> CacheInfo {
    CacheInfo::new(L3_WAYS, L3_SIZE)
}

/// Two sockets, two L2 clusters per socket, two cores per cluster:
/// sockets are represented by cores 0 and 4, clusters by 0, 2, 4 and 6.
pub fn two_socket_topology() -> CPUTopology {
    topology(2, 2, 2, l2_cache(), l3_cache())
}

pub fn single_core_topology() -> CPUTopology {
    topology(1, 1, 1, l2_cache(), l3_cache())
}

pub fn topology_without_caches() -> CPUTopology {
    topology(
        2,
        2,
        2,
        CacheInfo::not_detected(),
        CacheInfo::not_detected(),
    )
}
