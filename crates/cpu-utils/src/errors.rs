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

use hwlocality::object::types::ObjectType;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CPUTopologyError {
    #[error(transparent)]
    RawHwlocError(#[from] hwlocality::errors::RawHwlocError),

    #[error("no logical cores were found in the topology")]
    LogicalCoresNotFound,

    #[error("{object_type:?} object {index} doesn't expose a cpuset")]
    CPUSetNotFound {
        object_type: ObjectType,
        index: usize,
    },

    #[error("logical core id {core_id} is too big to be represented as u32")]
    LogicalCoreIdTooBig { core_id: usize },
}

impl CPUTopologyError {
    pub fn cpuset_not_found(object_type: ObjectType, index: usize) -> Self {
        Self::CPUSetNotFound { object_type, index }
    }

    pub fn logical_core_too_big(core_id: usize) -> Self {
        Self::LogicalCoreIdTooBig { core_id }
    }
}
