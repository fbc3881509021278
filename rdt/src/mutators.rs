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

use rdt_shared::types::Interface;

use crate::CacheAllocCapability;
use crate::CapabilityTable;
use crate::MbaCtrlSupport;

/// Requested code and data prioritization state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CdpConfig {
    #[default]
    Any,
    On,
    Off,
}

/// Requested MBA mode: percentage throttling or the MBps software controller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MbaConfig {
    #[default]
    Any,
    Default,
    Controller,
}

impl CapabilityTable {
    /// Mirrors an L3 CDP switch done by the allocation subsystem.
    pub(crate) fn l3cdp_change(&mut self, config: CdpConfig) {
        if let Some(l3ca) = self.l3ca_mut() {
            apply_cdp(l3ca, config);
        }
    }

    pub(crate) fn l2cdp_change(&mut self, config: CdpConfig) {
        if let Some(l2ca) = self.l2ca_mut() {
            apply_cdp(l2ca, config);
        }
    }

    pub(crate) fn mba_change(&mut self, config: MbaConfig, interface: Interface) {
        let Some(mba) = self.mba_mut() else {
            return;
        };

        match config {
            MbaConfig::Any => {}
            MbaConfig::Default => mba.ctrl_on = false,
            MbaConfig::Controller => {
                // a successful switch through the OS proves the support
                if interface.is_os() {
                    mba.ctrl = MbaCtrlSupport::Supported;
                }
                mba.ctrl_on = true;
            }
        }
    }
}

fn apply_cdp(capability: &mut CacheAllocCapability, config: CdpConfig) {
    match config {
        CdpConfig::On => capability.enable_cdp(),
        CdpConfig::Off => capability.disable_cdp(),
        CdpConfig::Any => {}
    }
}

#[cfg(test)]
mod tests;
