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
use rdt_shared::types::Interface;

use crate::Capability;
use crate::CapabilityDiscovery;
use crate::CapabilityKind;
use crate::CapabilityTable;
use crate::RDTError;
use crate::RDTResult;

/// Runs discovery of every resource kind through the backend serving
/// `interface` and collects the detected ones into a table.
///
/// Only `ResourceNotDetected` is absorbed, any other failure drops everything
/// discovered so far.
pub fn discover_capabilities(
    interface: Interface,
    topology: &CPUTopology,
    direct: &dyn CapabilityDiscovery,
    os: Option<&dyn CapabilityDiscovery>,
) -> RDTResult<CapabilityTable> {
    let backend = if interface.is_os() {
        os.ok_or(RDTError::InvalidParameter(
            "OS interface is selected, but OS backend isn't initialized",
        ))?
    } else {
        direct
    };

    let monitoring = absorb(
        CapabilityKind::Monitoring,
        backend.discover_monitoring(topology),
    )?;
    let l3ca = absorb(CapabilityKind::L3Alloc, backend.discover_l3ca(topology))?;
    let l2ca = absorb(CapabilityKind::L2Alloc, backend.discover_l2ca(topology))?;
    let mut mba = absorb(CapabilityKind::MBAlloc, backend.discover_mba(topology))?;

    if interface.is_os() {
        if let Some(mba) = mba.as_mut() {
            let controller = backend.mba_controller(mba).map_err(|error| {
                tracing::error!("Failed to detect MBA controller status: {error}");
                error
            })?;
            mba.set_controller(controller);
        }
    }

    let candidates = [
        monitoring.map(Capability::Monitoring),
        l3ca.map(Capability::L3Alloc),
        l2ca.map(Capability::L2Alloc),
        mba.map(Capability::MBAlloc),
    ];

    let count = candidates.iter().flatten().count();
    if count == 0 {
        tracing::error!("No Platform QoS capability discovered");
        return Err(RDTError::NoCapabilityDiscovered);
    }

    let mut records = Vec::new();
    records.try_reserve_exact(count)?;
    for record in candidates.into_iter().flatten() {
        log_record(&record);
        records.push(record);
    }

    Ok(CapabilityTable::new(records))
}

fn absorb<T>(kind: CapabilityKind, result: RDTResult<T>) -> RDTResult<Option<T>> {
    match result {
        Ok(record) => Ok(Some(record)),
        Err(error) if error.is_resource_not_detected() => {
            tracing::info!("{kind} capability not detected");
            Ok(None)
        }
        Err(error) => {
            tracing::error!("Fatal error encountered in {kind} discovery: {error}");
            Err(error)
        }
    }
}

fn log_record(record: &Capability) {
    match record {
        Capability::Monitoring(monitoring) => {
            tracing::info!(
                "Monitoring capability detected: max RMID {}, {} events",
                monitoring.max_rmid,
                monitoring.events.len()
            );
            for event in monitoring.events.iter() {
                tracing::debug!(
                    "  event {:?}, max RMID {}, scale factor {}",
                    event.kind,
                    event.max_rmid,
                    event.scale_factor
                );
            }
        }
        Capability::L3Alloc(cache) | Capability::L2Alloc(cache) => {
            tracing::info!(
                "{} capability detected: {} classes, {} ways of {} bytes, contention {:#x}, CDP {} ({})",
                record.kind(),
                cache.num_classes,
                cache.num_ways,
                cache.way_size,
                cache.way_contention,
                if cache.cdp { "supported" } else { "not supported" },
                if cache.cdp_on { "on" } else { "off" },
            );
        }
        Capability::MBAlloc(mba) => {
            tracing::info!(
                "MBA capability detected: {} classes, max throttling {}%, step {}%, {}, controller {:?} ({})",
                mba.num_classes,
                mba.throttle_max,
                mba.throttle_step,
                if mba.is_linear { "linear" } else { "non-linear" },
                mba.ctrl,
                if mba.ctrl_on { "on" } else { "off" },
            );
        }
    }
}
