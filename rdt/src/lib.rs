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

#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![deny(
    dead_code,
    nonstandard_style,
    unused_imports,
    unused_mut,
    unused_variables,
    unused_unsafe,
    unreachable_patterns
)]

mod assembler;
pub mod capabilities;
pub mod discovery;
mod errors;
pub mod lifecycle;
mod mutators;
pub mod os_backend;
#[cfg(test)]
mod test_support;

pub use assembler::discover_capabilities;
pub use capabilities::*;
pub use discovery::CapabilityDiscovery;
pub use errors::RDTError;
pub use errors::RDTResult;
pub use lifecycle::ApiGuard;
pub use lifecycle::NativePlatform;
pub use lifecycle::RDTContext;
pub use mutators::CdpConfig;
pub use mutators::MbaConfig;

pub use cpu_utils::CPUTopology;
pub use rdt_config::RDTConfig;
pub use rdt_shared::types::CacheLevel;
pub use rdt_shared::types::Interface;
