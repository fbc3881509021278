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

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    L3Occupancy,
    TotalMemBandwidth,
    LocalMemBandwidth,
    /// Derived as total minus local, needs both of them.
    RemoteMemBandwidth,
    /// Instructions per clock, counted by the core PMU.
    Ipc,
    /// Last level cache misses, counted by the core PMU.
    LlcMiss,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonitoringEvent {
    pub kind: EventKind,
    /// Upper bound of monitoring ids for this event, 0 for PMU events.
    pub max_rmid: u32,
    /// Multiplier turning a raw counter value into bytes, 0 if unscaled.
    pub scale_factor: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonitoringCapability {
    pub max_rmid: u32,
    /// L3 size in bytes.
    pub l3_size: u64,
    pub events: Box<[MonitoringEvent]>,
}

impl EventKind {
    pub fn is_pmu_event(&self) -> bool {
        matches!(self, EventKind::Ipc | EventKind::LlcMiss)
    }
}

impl MonitoringEvent {
    pub fn new(kind: EventKind, max_rmid: u32, scale_factor: u32) -> Self {
        Self {
            kind,
            max_rmid,
            scale_factor,
        }
    }
}

impl MonitoringCapability {
    pub fn event(&self, kind: EventKind) -> Option<&MonitoringEvent> {
        self.events.iter().find(|event| event.kind == kind)
    }

    pub fn supports(&self, kind: EventKind) -> bool {
        self.event(kind).is_some()
    }
}
