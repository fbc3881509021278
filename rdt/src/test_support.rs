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

use parking_lot::Mutex;

use cpu_utils::CPUTopology;

use crate::CacheAllocCapability;
use crate::CapabilityDiscovery;
use crate::CapabilityKind;
use crate::EventKind;
use crate::MbaCapability;
use crate::MbaController;
use crate::MbaCtrlSupport;
use crate::MonitoringCapability;
use crate::MonitoringEvent;
use crate::RDTError;
use crate::RDTResult;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum Outcome {
    Detected,
    #[default]
    NotDetected,
    Fatal,
}

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Outcomes {
    pub(crate) monitoring: Outcome,
    pub(crate) l3ca: Outcome,
    pub(crate) l2ca: Outcome,
    pub(crate) mba: Outcome,
}

impl Outcomes {
    pub(crate) fn all(outcome: Outcome) -> Self {
        Self {
            monitoring: outcome,
            l3ca: outcome,
            l2ca: outcome,
            mba: outcome,
        }
    }
}

/// Scripted discovery backend that records which kinds were asked for.
#[derive(Debug, Default)]
pub(crate) struct StubDiscovery {
    outcomes: Outcomes,
    controller: Option<MbaController>,
    calls: Mutex<Vec<CapabilityKind>>,
}

impl StubDiscovery {
    pub(crate) fn new(outcomes: Outcomes) -> Self {
        Self {
            outcomes,
            ..Self::default()
        }
    }

    pub(crate) fn all_detected() -> Self {
        Self::new(Outcomes::all(Outcome::Detected))
    }

    pub(crate) fn with_controller(mut self, controller: MbaController) -> Self {
        self.controller = Some(controller);
        self
    }

    pub(crate) fn calls(&self) -> Vec<CapabilityKind> {
        self.calls.lock().clone()
    }

    fn answer<T>(&self, kind: CapabilityKind, outcome: Outcome, record: T) -> RDTResult<T> {
        self.calls.lock().push(kind);
        match outcome {
            Outcome::Detected => Ok(record),
            Outcome::NotDetected => Err(RDTError::ResourceNotDetected("stubbed resource")),
            Outcome::Fatal => Err(RDTError::InvalidParameter("stubbed failure")),
        }
    }
}

impl CapabilityDiscovery for StubDiscovery {
    fn discover_monitoring(&self, _: &CPUTopology) -> RDTResult<MonitoringCapability> {
        self.answer(
            CapabilityKind::Monitoring,
            self.outcomes.monitoring,
            sample_monitoring(),
        )
    }

    fn discover_l3ca(&self, _: &CPUTopology) -> RDTResult<CacheAllocCapability> {
        self.answer(CapabilityKind::L3Alloc, self.outcomes.l3ca, sample_l3ca())
    }

    fn discover_l2ca(&self, _: &CPUTopology) -> RDTResult<CacheAllocCapability> {
        self.answer(CapabilityKind::L2Alloc, self.outcomes.l2ca, sample_l2ca())
    }

    fn discover_mba(&self, _: &CPUTopology) -> RDTResult<MbaCapability> {
        self.answer(CapabilityKind::MBAlloc, self.outcomes.mba, sample_mba())
    }

    fn mba_controller(&self, mba: &MbaCapability) -> RDTResult<MbaController> {
        Ok(self.controller.unwrap_or_else(|| mba.controller()))
    }
}

pub(crate) fn sample_monitoring() -> MonitoringCapability {
    MonitoringCapability {
        max_rmid: 144,
        l3_size: 25 * 1024 * 1024,
        events: vec![
            MonitoringEvent::new(EventKind::L3Occupancy, 144, 65536),
            MonitoringEvent::new(EventKind::LocalMemBandwidth, 144, 65536),
        ]
        .into_boxed_slice(),
    }
}

pub(crate) fn sample_l3ca() -> CacheAllocCapability {
    CacheAllocCapability {
        num_classes: 16,
        num_ways: 20,
        way_size: 1280 * 1024,
        way_contention: 0x3,
        cdp: true,
        cdp_on: false,
    }
}

pub(crate) fn sample_l2ca() -> CacheAllocCapability {
    CacheAllocCapability {
        num_classes: 8,
        num_ways: 16,
        way_size: 64 * 1024,
        way_contention: 0,
        cdp: true,
        cdp_on: false,
    }
}

pub(crate) fn sample_mba() -> MbaCapability {
    MbaCapability {
        num_classes: 8,
        throttle_max: 90,
        throttle_step: 10,
        is_linear: true,
        ctrl: MbaCtrlSupport::Unknown,
        ctrl_on: false,
    }
}
