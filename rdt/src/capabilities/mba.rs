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

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MbaCtrlSupport {
    #[default]
    Unknown,
    Unsupported,
    Supported,
}

/// State of the MBA software controller, i.e. bandwidth specified in MBps
/// instead of throttling percents.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MbaController {
    pub ctrl: MbaCtrlSupport,
    pub ctrl_on: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MbaCapability {
    pub num_classes: u32,
    /// Maximum throttling in percents.
    pub throttle_max: u32,
    pub throttle_step: u32,
    pub is_linear: bool,
    pub ctrl: MbaCtrlSupport,
    pub ctrl_on: bool,
}

impl MbaCapability {
    pub fn controller(&self) -> MbaController {
        MbaController {
            ctrl: self.ctrl,
            ctrl_on: self.ctrl_on,
        }
    }

    pub(crate) fn set_controller(&mut self, controller: MbaController) {
        self.ctrl = controller.ctrl;
        self.ctrl_on = controller.ctrl_on;
    }
}
