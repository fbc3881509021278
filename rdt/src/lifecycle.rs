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

//! Ownership of everything `RDTContext` needs between initialization and
//! teardown: the API lock, the platform collaborators and the dependent
//! consumers.

mod api_lock;
mod consumers;
mod context;
mod platform;

pub use consumers::AllocationGate;
pub use consumers::MonitoringGate;
pub use consumers::ResourceConsumer;
pub use context::ApiGuard;
pub use context::RDTContext;
pub use platform::NativePlatform;
pub use platform::Platform;
