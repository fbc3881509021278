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

/// Cache allocation capability, the same shape for L3 and L2.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheAllocCapability {
    /// Number of classes of service usable right now, halved while CDP is on.
    pub num_classes: u32,
    pub num_ways: u32,
    /// Size of one way in bytes.
    pub way_size: u64,
    /// Ways that may be shared with other agents, e.g. the GPU or IO.
    pub way_contention: u64,
    pub cdp: bool,
    pub cdp_on: bool,
}

impl CacheAllocCapability {
    pub fn total_size(&self) -> u64 {
        self.way_size * self.num_ways as u64
    }

    /// Switches code and data prioritization on: every class splits into a
    /// code and a data pair, so half of them remain.
    pub(crate) fn enable_cdp(&mut self) {
        if self.cdp_on {
            return;
        }
        self.cdp_on = true;
        self.num_classes /= 2;
    }

    pub(crate) fn disable_cdp(&mut self) {
        if !self.cdp_on {
            return;
        }
        self.cdp_on = false;
        self.num_classes *= 2;
    }
}
