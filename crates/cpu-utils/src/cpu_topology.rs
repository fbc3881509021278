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

use itertools::Itertools;
use nonempty::NonEmpty;
use serde::Serialize;

use rdt_shared::types::CacheLevel;
use rdt_shared::types::L2ClusterId;
use rdt_shared::types::LogicalCoreId;
use rdt_shared::types::SocketId;

use crate::CacheInfo;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CoreInfo {
    pub logical_core_id: LogicalCoreId,
    pub socket: SocketId,
    pub l2_cluster: L2ClusterId,
}

/// A snapshot of the machine: which socket and L2 cluster every logical core
/// belongs to, and the geometry of the L2 and L3 caches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CPUTopology {
    cores: NonEmpty<CoreInfo>,
    l2: CacheInfo,
    l3: CacheInfo,
}

impl CPUTopology {
    pub fn new(cores: NonEmpty<CoreInfo>, l2: CacheInfo, l3: CacheInfo) -> Self {
        Self { cores, l2, l3 }
    }

    pub fn cores(&self) -> &NonEmpty<CoreInfo> {
        &self.cores
    }

    pub fn first_core(&self) -> LogicalCoreId {
        self.cores.head.logical_core_id
    }

    pub fn max_core(&self) -> LogicalCoreId {
        self.cores
            .iter()
            .map(|core| core.logical_core_id)
            .max()
            .unwrap_or(self.cores.head.logical_core_id)
    }

    /// Distinct sockets in ascending order.
    pub fn sockets(&self) -> Vec<SocketId> {
        self.cores
            .iter()
            .map(|core| core.socket)
            .sorted()
            .dedup()
            .collect()
    }

    /// Some core of the given socket, suitable as its representative.
    pub fn one_core(&self, socket: SocketId) -> Option<LogicalCoreId> {
        self.cores
            .iter()
            .find(|core| core.socket == socket)
            .map(|core| core.logical_core_id)
    }

    /// Distinct L2 clusters in ascending order.
    pub fn l2_clusters(&self) -> Vec<L2ClusterId> {
        self.cores
            .iter()
            .map(|core| core.l2_cluster)
            .sorted()
            .dedup()
            .collect()
    }

    pub fn one_core_by_l2(&self, cluster: L2ClusterId) -> Option<LogicalCoreId> {
        self.cores
            .iter()
            .find(|core| core.l2_cluster == cluster)
            .map(|core| core.logical_core_id)
    }

    pub fn cache_info(&self, level: CacheLevel) -> &CacheInfo {
        match level {
            CacheLevel::L2 => &self.l2,
            CacheLevel::L3 => &self.l3,
        }
    }
}
