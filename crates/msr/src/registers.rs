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

/// L3 QoS configuration register.
pub const IA32_L3_QOS_CFG: u32 = 0xC81;

/// L2 QoS configuration register.
pub const IA32_L2_QOS_CFG: u32 = 0xC82;

/// CDP enable bit, the same for both QoS configuration registers.
pub const QOS_CFG_CDP_ENABLE: u64 = 1;

/// L3 class of service 0 mask register.
pub const IA32_L3_MASK_START: u32 = 0xC90;

/// L3 class of service 127 mask register.
pub const IA32_L3_MASK_END: u32 = 0xD0F;
