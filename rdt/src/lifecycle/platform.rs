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
use rdt_config::RDTConfig;
use rdt_msr::MSRProbe;
use rdt_msr::RegisterProbe;

use crate::os_backend::ResctrlDiscovery;
use crate::CapabilityDiscovery;
use crate::RDTResult;

/// Everything the context needs from the machine it runs on.
pub trait Platform {
    type Probe: RegisterProbe + Send;
    type OsBackend: CapabilityDiscovery + Send;

    fn build_topology(&self) -> RDTResult<CPUTopology>;

    /// Prepares register access for every core of the topology.
    fn init_register_access(&self, topology: &CPUTopology) -> RDTResult<Self::Probe>;

    fn release_register_access(&self, probe: Self::Probe) -> RDTResult<()> {
        drop(probe);
        Ok(())
    }

    fn init_os_backend(&self, config: &RDTConfig) -> RDTResult<Self::OsBackend>;

    /// Whether the OS already manages QoS resources, in which case direct
    /// register access may silently conflict with it.
    fn os_backend_mounted(&self, config: &RDTConfig) -> bool;
}

/// hwloc topology, msr driver files and resctrl.
#[derive(Copy, Clone, Debug, Default)]
pub struct NativePlatform;

impl Platform for NativePlatform {
    type Probe = MSRProbe;
    type OsBackend = ResctrlDiscovery;

    fn build_topology(&self) -> RDTResult<CPUTopology> {
        let topology = CPUTopology::from_os()?;
        Ok(topology)
    }

    fn init_register_access(&self, topology: &CPUTopology) -> RDTResult<MSRProbe> {
        let cores = topology.cores().iter().map(|core| core.logical_core_id);
        let probe = MSRProbe::open(cores)?;
        Ok(probe)
    }

    fn init_os_backend(&self, config: &RDTConfig) -> RDTResult<ResctrlDiscovery> {
        ResctrlDiscovery::init(config.os_paths.clone(), config.interface)
    }

    fn os_backend_mounted(&self, config: &RDTConfig) -> bool {
        ResctrlDiscovery::is_mounted(&config.os_paths)
    }
}
