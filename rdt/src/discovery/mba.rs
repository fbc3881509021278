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

use rdt_msr::RegisterProbe;

use super::allocation_supported;
use super::has_bit;
use super::ALLOCATION_LEAF;
use super::MB_ALLOCATION_RES_ID;
use crate::MbaCapability;
use crate::MbaCtrlSupport;
use crate::RDTError;
use crate::RDTResult;

const RESOURCE: &str = "MBA";
const LINEAR_THROTTLING_BIT: u32 = 2;

pub(crate) fn discover(probe: &impl RegisterProbe) -> RDTResult<MbaCapability> {
    if !allocation_supported(probe, MB_ALLOCATION_RES_ID) {
        tracing::info!("CPUID: MBA not supported");
        return Err(RDTError::ResourceNotDetected(RESOURCE));
    }

    let leaf = probe.query_feature(ALLOCATION_LEAF, MB_ALLOCATION_RES_ID);
    let throttle_max = (leaf.eax & 0xFFF) + 1;
    if !has_bit(leaf.ecx, LINEAR_THROTTLING_BIT) {
        tracing::warn!("MBA non-linear mode not supported yet");
        return Err(RDTError::ResourceNotDetected(RESOURCE));
    }

    Ok(MbaCapability {
        num_classes: (leaf.edx & 0xFFFF) + 1,
        throttle_max,
        throttle_step: 100u32.saturating_sub(throttle_max),
        is_linear: true,
        ctrl: MbaCtrlSupport::Unknown,
        ctrl_on: false,
    })
}

#[cfg(test)]
mod tests;
