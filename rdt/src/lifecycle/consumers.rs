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

use crate::CapabilityTable;
use crate::RDTError;
use crate::RDTResult;

/// A subsystem built on top of the discovered capabilities, brought up after
/// discovery and shut down before it is dropped.
pub trait ResourceConsumer: Send {
    fn name(&self) -> &'static str;

    fn init(
        &mut self,
        topology: &CPUTopology,
        table: &CapabilityTable,
        interface: Interface,
    ) -> RDTResult<()>;

    fn fini(&mut self) -> RDTResult<()>;
}

/// Ready as soon as any allocation resource is present.
#[derive(Debug, Default)]
pub struct AllocationGate {
    ready: bool,
}

/// Ready when monitoring is present.
#[derive(Debug, Default)]
pub struct MonitoringGate {
    ready: bool,
}

impl AllocationGate {
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl MonitoringGate {
    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl ResourceConsumer for AllocationGate {
    fn name(&self) -> &'static str {
        "allocation"
    }

    fn init(&mut self, _: &CPUTopology, table: &CapabilityTable, _: Interface) -> RDTResult<()> {
        if table.l3ca().is_none() && table.l2ca().is_none() && table.mba().is_none() {
            return Err(RDTError::ResourceNotDetected("allocation"));
        }

        self.ready = true;
        Ok(())
    }

    fn fini(&mut self) -> RDTResult<()> {
        if !std::mem::take(&mut self.ready) {
            return Err(RDTError::NotInitialized);
        }
        Ok(())
    }
}

impl ResourceConsumer for MonitoringGate {
    fn name(&self) -> &'static str {
        "monitoring"
    }

    fn init(&mut self, _: &CPUTopology, table: &CapabilityTable, _: Interface) -> RDTResult<()> {
        if table.monitoring().is_none() {
            return Err(RDTError::ResourceNotDetected("monitoring"));
        }

        self.ready = true;
        Ok(())
    }

    fn fini(&mut self) -> RDTResult<()> {
        if !std::mem::take(&mut self.ready) {
            return Err(RDTError::NotInitialized);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rdt_test_utils::single_core_topology;

    use crate::test_support::sample_mba;
    use crate::test_support::sample_monitoring;
    use crate::Capability;

    use super::*;

    #[test]
    fn allocation_gate_needs_allocation_record() {
        let topology = single_core_topology();
        let monitoring_only =
            CapabilityTable::new(vec![Capability::Monitoring(sample_monitoring())]);
        let mut gate = AllocationGate::default();

        let result = gate.init(&topology, &monitoring_only, Interface::Msr);
        assert!(matches!(result, Err(RDTError::ResourceNotDetected(_))));
        assert!(!gate.is_ready());

        let with_mba = CapabilityTable::new(vec![Capability::MBAlloc(sample_mba())]);
        gate.init(&topology, &with_mba, Interface::Msr).unwrap();
        assert!(gate.is_ready());

        gate.fini().unwrap();
        assert!(matches!(gate.fini(), Err(RDTError::NotInitialized)));
    }

    #[test]
    fn monitoring_gate_needs_monitoring_record() {
        let topology = single_core_topology();
        let mut gate = MonitoringGate::default();

        let without = CapabilityTable::new(vec![Capability::MBAlloc(sample_mba())]);
        let result = gate.init(&topology, &without, Interface::Os);
        assert!(result.unwrap_err().is_resource_not_detected());

        let with = CapabilityTable::new(vec![Capability::Monitoring(sample_monitoring())]);
        gate.init(&topology, &with, Interface::Os).unwrap();
        assert!(gate.is_ready());
    }
}
