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

use std::path::Path;
use std::path::PathBuf;

use cpu_utils::CPUTopology;
use rdt_config::OsPaths;
use rdt_shared::types::CacheLevel;
use rdt_shared::types::Interface;

use super::fs_utils::file_contains;
use super::fs_utils::read_f64;
use super::fs_utils::read_trimmed;
use super::fs_utils::read_u32;
use super::fs_utils::read_u64;
use crate::discovery::CapabilityDiscovery;
use crate::CacheAllocCapability;
use crate::EventKind;
use crate::MbaCapability;
use crate::MbaController;
use crate::MbaCtrlSupport;
use crate::MonitoringCapability;
use crate::MonitoringEvent;
use crate::RDTError;
use crate::RDTResult;

const MBA_CTRL_MOUNT_OPTION: &str = "mba_MBps";

/// Read-only view of a mounted resctrl filesystem.
#[derive(Clone, Debug)]
pub struct ResctrlDiscovery {
    paths: OsPaths,
}

impl ResctrlDiscovery {
    /// Checks that the kernel supports resctrl, that it's mounted and, for
    /// resctrl monitoring, that the monitoring info is there.
    pub fn init(paths: OsPaths, interface: Interface) -> RDTResult<Self> {
        let filesystems = paths.proc.join("filesystems");
        if !file_contains(&filesystems, "resctrl")? {
            tracing::error!("OS interface selected but resctrl isn't supported by the kernel");
            return Err(RDTError::interface_not_supported(
                "resctrl isn't supported by the kernel",
            ));
        }
        tracing::info!("resctrl detected");

        if !Self::is_mounted(&paths) {
            tracing::error!("resctrl isn't mounted at {}", paths.resctrl.display());
            return Err(RDTError::interface_not_supported("resctrl isn't mounted"));
        }

        let discovery = Self { paths };
        if interface == Interface::OsResctrlMon && !discovery.l3_mon_dir().exists() {
            tracing::error!("resctrl monitoring selected but not supported");
            return Err(RDTError::interface_not_supported(
                "resctrl monitoring isn't supported",
            ));
        }

        Ok(discovery)
    }

    pub fn is_mounted(paths: &OsPaths) -> bool {
        paths.resctrl.join("cpus").exists()
    }

    fn info_dir(&self) -> PathBuf {
        self.paths.resctrl.join("info")
    }

    fn l3_mon_dir(&self) -> PathBuf {
        self.info_dir().join("L3_MON")
    }

    fn cpuinfo_flag(&self, flag: &str) -> RDTResult<bool> {
        file_contains(&self.paths.proc.join("cpuinfo"), flag)
    }

    fn mba_ctrl_mounted(&self) -> RDTResult<bool> {
        file_contains(&self.paths.proc.join("mounts"), MBA_CTRL_MOUNT_OPTION)
    }

    /// Scale factor of the event if the kernel can count it, resctrl
    /// monitoring first, then the perf cqm PMU.
    fn event_support(&self, kind: EventKind) -> RDTResult<Option<u32>> {
        let (resctrl_name, perf_name) = match kind {
            EventKind::L3Occupancy => ("llc_occupancy", "llc_occupancy"),
            EventKind::TotalMemBandwidth => ("mbm_total_bytes", "total_bytes"),
            EventKind::LocalMemBandwidth => ("mbm_local_bytes", "local_bytes"),
            EventKind::RemoteMemBandwidth | EventKind::Ipc | EventKind::LlcMiss => {
                return Ok(None)
            }
        };

        let l3_mon = self.l3_mon_dir();
        if l3_mon.exists() && file_contains(&l3_mon.join("mon_features"), resctrl_name)? {
            return Ok(Some(1));
        }

        let perf_event = self.paths.perf_events.join(perf_name);
        if !perf_event.exists() {
            return Ok(None);
        }

        tracing::warn!("perf {perf_name} results per core may be incorrect on older kernels");
        perf_scale_factor(&self.paths.perf_events, perf_name).map(Some)
    }

    /// Info directory of the cache level and whether CDP is on, i.e. the
    /// level is split into code and data resources.
    fn cache_info_dir(&self, level: CacheLevel) -> Option<(PathBuf, bool)> {
        let info = self.info_dir();
        let name = level.to_string();

        let unified = info.join(&name);
        if unified.exists() {
            return Some((unified, false));
        }

        let code = info.join(format!("{name}CODE"));
        let data = info.join(format!("{name}DATA"));
        if code.exists() && data.exists() {
            return Some((code, true));
        }

        None
    }

    fn discover_cache_alloc(
        &self,
        topology: &CPUTopology,
        level: CacheLevel,
        resource: &'static str,
        cdp_flag: &str,
    ) -> RDTResult<CacheAllocCapability> {
        let Some((dir, cdp_on)) = self.cache_info_dir(level) else {
            return Err(RDTError::ResourceNotDetected(resource));
        };

        let num_classes = read_u32(&dir.join("num_closids"), 10)?;
        let cbm_mask = read_u64(&dir.join("cbm_mask"), 16)?;
        let num_ways = u64::BITS - cbm_mask.leading_zeros();

        let shareable_bits = dir.join("shareable_bits");
        let way_contention = if shareable_bits.exists() {
            read_u64(&shareable_bits, 16)?
        } else {
            0
        };

        let cdp = cdp_on || self.cpuinfo_flag(cdp_flag)?;

        Ok(CacheAllocCapability {
            num_classes,
            num_ways,
            way_size: topology.cache_info(level).way_size,
            way_contention,
            cdp,
            cdp_on,
        })
    }
}

impl CapabilityDiscovery for ResctrlDiscovery {
    fn discover_monitoring(&self, topology: &CPUTopology) -> RDTResult<MonitoringCapability> {
        const RESOURCE: &str = "monitoring";

        if !self.cpuinfo_flag("cqm")? {
            return Err(RDTError::ResourceNotDetected(RESOURCE));
        }

        let num_rmids = self.l3_mon_dir().join("num_rmids");
        let max_rmid = if num_rmids.exists() {
            read_u32(&num_rmids, 10)?
        } else {
            0
        };

        let hardware_event = |kind: EventKind| -> RDTResult<Option<MonitoringEvent>> {
            let event = self
                .event_support(kind)?
                .map(|scale_factor| MonitoringEvent::new(kind, max_rmid, scale_factor));
            Ok(event)
        };

        let occupancy = hardware_event(EventKind::L3Occupancy)?;
        let total = hardware_event(EventKind::TotalMemBandwidth)?;
        let local = hardware_event(EventKind::LocalMemBandwidth)?;
        let remote = match (total, local) {
            (Some(total), Some(_)) => Some(MonitoringEvent::new(
                EventKind::RemoteMemBandwidth,
                max_rmid,
                total.scale_factor,
            )),
            _ => None,
        };
        // PMU events are assumed to be available through perf
        let ipc = Some(MonitoringEvent::new(EventKind::Ipc, 0, 0));
        let llc_miss = Some(MonitoringEvent::new(EventKind::LlcMiss, 0, 0));

        let candidates = [occupancy, total, local, remote, ipc, llc_miss];
        let mut events = Vec::new();
        events.try_reserve_exact(candidates.iter().flatten().count())?;
        events.extend(candidates.into_iter().flatten());
        if events.is_empty() {
            return Err(RDTError::ResourceNotDetected(RESOURCE));
        }

        Ok(MonitoringCapability {
            max_rmid,
            l3_size: topology.cache_info(CacheLevel::L3).total_size,
            events: events.into_boxed_slice(),
        })
    }

    fn discover_l3ca(&self, topology: &CPUTopology) -> RDTResult<CacheAllocCapability> {
        self.discover_cache_alloc(topology, CacheLevel::L3, "L3 CAT", "cdp_l3")
    }

    fn discover_l2ca(&self, topology: &CPUTopology) -> RDTResult<CacheAllocCapability> {
        self.discover_cache_alloc(topology, CacheLevel::L2, "L2 CAT", "cdp_l2")
    }

    fn discover_mba(&self, _topology: &CPUTopology) -> RDTResult<MbaCapability> {
        const RESOURCE: &str = "MBA";

        let dir = self.info_dir().join("MB");
        if !dir.exists() {
            return Err(RDTError::ResourceNotDetected(RESOURCE));
        }

        let num_classes = read_u32(&dir.join("num_closids"), 10)?;
        let ctrl_on = self.mba_ctrl_mounted()?;
        let min_bandwidth = read_u32(&dir.join("min_bandwidth"), 10)?;
        let throttle_step = read_u32(&dir.join("bandwidth_gran"), 10)?;
        let is_linear = read_u64(&dir.join("delay_linear"), 10)? == 1;
        if !is_linear {
            tracing::warn!("MBA non-linear mode not supported yet");
            return Err(RDTError::ResourceNotDetected(RESOURCE));
        }

        Ok(MbaCapability {
            num_classes,
            throttle_max: 100u32.saturating_sub(min_bandwidth),
            throttle_step,
            is_linear,
            ctrl: if ctrl_on {
                MbaCtrlSupport::Supported
            } else {
                MbaCtrlSupport::Unknown
            },
            ctrl_on,
        })
    }

    fn mba_controller(&self, _mba: &MbaCapability) -> RDTResult<MbaController> {
        if self.mba_ctrl_mounted()? {
            return Ok(MbaController {
                ctrl: MbaCtrlSupport::Supported,
                ctrl_on: true,
            });
        }

        // the controller is driven by resctrl local bandwidth counters
        let l3_mon = self.l3_mon_dir();
        let local_bandwidth =
            l3_mon.exists() && file_contains(&l3_mon.join("mon_features"), "mbm_local_bytes")?;
        let ctrl = if local_bandwidth {
            MbaCtrlSupport::Unknown
        } else {
            MbaCtrlSupport::Unsupported
        };

        Ok(MbaController {
            ctrl,
            ctrl_on: false,
        })
    }
}

fn perf_scale_factor(events_dir: &Path, event_name: &str) -> RDTResult<u32> {
    let scale = read_f64(&events_dir.join(format!("{event_name}.scale")))?;

    let unit_path = events_dir.join(format!("{event_name}.unit"));
    let unit = match read_trimmed(&unit_path)?.as_str() {
        "Bytes" => 1.0,
        "MB" => 1_000_000.0,
        unit => {
            tracing::error!("Unknown \"{unit}\" scale factor unit");
            return Err(RDTError::resctrl_parse(
                unit_path,
                format!("unknown unit {unit}"),
            ));
        }
    };

    Ok((scale * unit) as u32)
}

#[cfg(test)]
mod tests;
