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

use super::l2ca;
use super::l3ca;
use super::mba;
use super::monitoring;
use super::CapabilityDiscovery;
use crate::CacheAllocCapability;
use crate::MbaCapability;
use crate::MonitoringCapability;
use crate::RDTResult;

/// Discovery straight from the hardware: CPUID leaves plus QoS registers.
#[derive(Debug)]
pub struct RegisterDiscovery<P> {
    probe: P,
}

impl<P: RegisterProbe> RegisterDiscovery<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }
}

impl<P: RegisterProbe> CapabilityDiscovery for RegisterDiscovery<P> {
    fn discover_monitoring(&self, topology: &CPUTopology) -> RDTResult<MonitoringCapability> {
        monitoring::discover(&self.probe, topology)
    }

    fn discover_l3ca(&self, topology: &CPUTopology) -> RDTResult<CacheAllocCapability> {
        l3ca::discover(&self.probe, topology)
    }

    fn discover_l2ca(&self, topology: &CPUTopology) -> RDTResult<CacheAllocCapability> {
        l2ca::discover(&self.probe, topology)
    }

    fn discover_mba(&self, _topology: &CPUTopology) -> RDTResult<MbaCapability> {
        mba::discover(&self.probe)
    }
}
