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

use super::has_bit;
use super::FEATURES_LEAF;
use super::MONITORING_FEATURE_BIT;
use super::MONITORING_LEAF;
use super::PMU_LEAF;
use crate::EventKind;
use crate::MonitoringCapability;
use crate::MonitoringEvent;
use crate::RDTError;
use crate::RDTResult;

const RESOURCE: &str = "monitoring";

/// CPUID.(0xF,0).EDX, L3 is the only monitored resource.
const L3_MONITORING_BIT: u32 = 1;

/// CPUID.(0xF,1).EDX
const L3_OCCUPANCY_BIT: u32 = 0;
const TOTAL_BANDWIDTH_BIT: u32 = 1;
const LOCAL_BANDWIDTH_BIT: u32 = 2;

pub(crate) fn discover(
    probe: &impl RegisterProbe,
    topology: &CPUTopology,
) -> RDTResult<MonitoringCapability> {
    let features = probe.query_feature(FEATURES_LEAF, 0);
    if !has_bit(features.ebx, MONITORING_FEATURE_BIT) {
        tracing::warn!("CPUID.0x7.0: monitoring capability not supported");
        return Err(RDTError::ResourceNotDetected(RESOURCE));
    }

    let resources = probe.query_feature(MONITORING_LEAF, 0);
    if !has_bit(resources.edx, L3_MONITORING_BIT) {
        tracing::warn!("CPUID.0xF.0: L3 monitoring not supported");
        return Err(RDTError::ResourceNotDetected(RESOURCE));
    }
    let max_rmid = resources.ebx.saturating_add(1);

    let l3 = topology.cache_info(CacheLevel::L3);
    if !l3.detected {
        return Err(RDTError::cache_info_missing(CacheLevel::L3));
    }

    let l3_events = probe.query_feature(MONITORING_LEAF, 1);
    let event_rmid = l3_events.ecx.saturating_add(1);
    let scale_factor = l3_events.ebx;
    let hardware_event = |bit: u32, kind: EventKind| {
        has_bit(l3_events.edx, bit).then(|| MonitoringEvent::new(kind, event_rmid, scale_factor))
    };

    let total = hardware_event(TOTAL_BANDWIDTH_BIT, EventKind::TotalMemBandwidth);
    let local = hardware_event(LOCAL_BANDWIDTH_BIT, EventKind::LocalMemBandwidth);
    let remote = (total.is_some() && local.is_some()).then(|| {
        MonitoringEvent::new(EventKind::RemoteMemBandwidth, event_rmid, scale_factor)
    });

    let pmu = probe.query_feature(PMU_LEAF, 0);
    let ipc_feasible = pmu.ebx & 0x3 == 0 && pmu.edx & 0x1F > 1;
    let llc_miss_feasible = (pmu.eax >> 8) & 0xFF > 1;
    let ipc = ipc_feasible.then(|| MonitoringEvent::new(EventKind::Ipc, 0, 0));
    let llc_miss = llc_miss_feasible.then(|| MonitoringEvent::new(EventKind::LlcMiss, 0, 0));

    let candidates = [
        hardware_event(L3_OCCUPANCY_BIT, EventKind::L3Occupancy),
        total,
        local,
        remote,
        ipc,
        llc_miss,
    ];
    let num_events = candidates.iter().flatten().count();
    if num_events == 0 {
        tracing::warn!("No monitoring events are supported");
        return Err(RDTError::ResourceNotDetected(RESOURCE));
    }

    let mut events = Vec::new();
    events.try_reserve_exact(num_events)?;
    for event in candidates.into_iter().flatten() {
        tracing::debug!(
            "Adding monitoring event {:?}, max rmid {}, scale factor {}",
            event.kind,
            event.max_rmid,
            event.scale_factor
        );
        events.push(event);
    }

    Ok(MonitoringCapability {
        max_rmid,
        l3_size: l3.total_size,
        events: events.into_boxed_slice(),
    })
}

#[cfg(test)]
mod tests;
