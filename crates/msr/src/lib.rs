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

/// This crate gives access to CPUID leaves and model specific registers for
/// the archs that expose QoS features through them, e.g. Linux on x86_64.
/// For everything else the probe reports no features and fails every
/// register access.

#[cfg(all(target_arch = "x86_64", target_os = "linux"))]
#[path = "linux_x86_64/mod.rs"]
mod msr_impl;
#[cfg(not(all(target_arch = "x86_64", target_os = "linux")))]
#[path = "other/mod.rs"]
mod msr_impl;

mod errors;
pub mod registers;

pub use errors::MSRError;
pub use msr_impl::*;
pub use raw_cpuid::CpuIdResult;

use rdt_shared::types::LogicalCoreId;

pub type MSRResult<T> = Result<T, MSRError>;

/// Access to the feature enumeration instruction and to per-core registers.
pub trait RegisterProbe {
    /// Runs the feature enumeration query for the given leaf and sub-leaf.
    fn query_feature(&self, leaf: u32, subleaf: u32) -> CpuIdResult;

    fn read_register(&self, core_id: LogicalCoreId, register_id: u32) -> MSRResult<u64>;

    fn write_register(&self, core_id: LogicalCoreId, register_id: u32, value: u64)
        -> MSRResult<()>;
}

impl<P: RegisterProbe + ?Sized> RegisterProbe for &P {
    fn query_feature(&self, leaf: u32, subleaf: u32) -> CpuIdResult {
        (**self).query_feature(leaf, subleaf)
    }

    fn read_register(&self, core_id: LogicalCoreId, register_id: u32) -> MSRResult<u64> {
        (**self).read_register(core_id, register_id)
    }

    fn write_register(
        &self,
        core_id: LogicalCoreId,
        register_id: u32,
        value: u64,
    ) -> MSRResult<()> {
        (**self).write_register(core_id, register_id, value)
    }
}
