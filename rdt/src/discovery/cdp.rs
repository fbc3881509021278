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
use rdt_msr::registers::IA32_L2_QOS_CFG;
use rdt_msr::registers::IA32_L3_QOS_CFG;
use rdt_msr::registers::QOS_CFG_CDP_ENABLE;
use rdt_msr::RegisterProbe;
use rdt_shared::types::CacheLevel;
use rdt_shared::types::LogicalCoreId;

use crate::RDTError;
use crate::RDTResult;

/// How many CDP domains (sockets for L3, L2 clusters for L2) have code and
/// data prioritization switched on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CdpCensus {
    pub enabled: usize,
    pub disabled: usize,
}

impl CdpCensus {
    /// Collapses the census into one state, a split between domains is
    /// a hardware misconfiguration.
    pub fn verdict(&self, level: CacheLevel) -> RDTResult<bool> {
        match (self.enabled, self.disabled) {
            (0, 0) => Err(RDTError::ResourceNotDetected("CDP domains")),
            (_, 0) => Ok(true),
            (0, _) => Ok(false),
            (enabled, disabled) => {
                tracing::error!(
                    "Inconsistent {level} CDP settings: enabled on {enabled}, disabled on {disabled} domains"
                );
                Err(RDTError::hardware_inconsistent(level, enabled, disabled))
            }
        }
    }
}

pub fn cdp_census(
    probe: &impl RegisterProbe,
    topology: &CPUTopology,
    level: CacheLevel,
) -> RDTResult<CdpCensus> {
    let (representatives, register_id) = representatives(topology, level);

    let mut census = CdpCensus::default();
    for core_id in representatives {
        let value = probe.read_register(core_id, register_id)?;
        if value & QOS_CFG_CDP_ENABLE != 0 {
            census.enabled += 1;
        } else {
            census.disabled += 1;
        }
    }

    Ok(census)
}

/// Returns whether CDP is on for the level, uniformly across its domains.
pub fn cdp_enabled(
    probe: &impl RegisterProbe,
    topology: &CPUTopology,
    level: CacheLevel,
) -> RDTResult<bool> {
    let enabled = cdp_census(probe, topology, level)?.verdict(level)?;
    tracing::info!(
        "{level} CDP is {}",
        if enabled { "enabled" } else { "disabled" }
    );

    Ok(enabled)
}

fn representatives(topology: &CPUTopology, level: CacheLevel) -> (Vec<LogicalCoreId>, u32) {
    match level {
        CacheLevel::L3 => {
            let cores = topology
                .sockets()
                .into_iter()
                .filter_map(|socket| topology.one_core(socket))
                .collect();
            (cores, IA32_L3_QOS_CFG)
        }
        CacheLevel::L2 => {
            let cores = topology
                .l2_clusters()
                .into_iter()
                .filter_map(|cluster| topology.one_core_by_l2(cluster))
                .collect();
            (cores, IA32_L2_QOS_CFG)
        }
    }
}
