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

/// Geometry of one cache level as the topology sees it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub detected: bool,
    pub num_ways: u32,
    /// Total size of one cache instance in bytes.
    pub total_size: u64,
    pub way_size: u64,
}

impl CacheInfo {
    pub fn new(num_ways: u32, total_size: u64) -> Self {
        let way_size = match num_ways {
            0 => 0,
            ways => total_size / ways as u64,
        };

        Self {
            detected: num_ways != 0 && total_size != 0,
            num_ways,
            total_size,
            way_size,
        }
    }

    pub fn not_detected() -> Self {
        Self::default()
    }
}
