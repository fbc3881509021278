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

use super::CacheAllocCapability;
use super::MbaCapability;
use super::MonitoringCapability;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Capability {
    #[serde(rename = "monitoring")]
    Monitoring(MonitoringCapability),
    #[serde(rename = "l3ca")]
    L3Alloc(CacheAllocCapability),
    #[serde(rename = "l2ca")]
    L2Alloc(CacheAllocCapability),
    #[serde(rename = "mba")]
    MBAlloc(MbaCapability),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CapabilityKind {
    Monitoring,
    L3Alloc,
    L2Alloc,
    MBAlloc,
}

impl Capability {
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Capability::Monitoring(_) => CapabilityKind::Monitoring,
            Capability::L3Alloc(_) => CapabilityKind::L3Alloc,
            Capability::L2Alloc(_) => CapabilityKind::L2Alloc,
            Capability::MBAlloc(_) => CapabilityKind::MBAlloc,
        }
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityKind::Monitoring => write!(f, "monitoring"),
            CapabilityKind::L3Alloc => write!(f, "L3 CAT"),
            CapabilityKind::L2Alloc => write!(f, "L2 CAT"),
            CapabilityKind::MBAlloc => write!(f, "MBA"),
        }
    }
}

/// Discovered capabilities, at most one record per kind, ordered as
/// monitoring, L3, L2, MBA. The set of records is fixed once assembled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapabilityTable {
    records: Vec<Capability>,
}

impl CapabilityTable {
    /// Records are expected to be sorted by kind without duplicates.
    pub(crate) fn new(records: Vec<Capability>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].kind() < w[1].kind()));
        Self { records }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn kinds(&self) -> Vec<CapabilityKind> {
        self.records.iter().map(Capability::kind).collect()
    }

    pub fn get(&self, kind: CapabilityKind) -> Option<&Capability> {
        self.records.iter().find(|record| record.kind() == kind)
    }

    pub fn monitoring(&self) -> Option<&MonitoringCapability> {
        self.records.iter().find_map(|record| match record {
            Capability::Monitoring(capability) => Some(capability),
            _ => None,
        })
    }

    pub fn l3ca(&self) -> Option<&CacheAllocCapability> {
        self.records.iter().find_map(|record| match record {
            Capability::L3Alloc(capability) => Some(capability),
            _ => None,
        })
    }

    pub fn l2ca(&self) -> Option<&CacheAllocCapability> {
        self.records.iter().find_map(|record| match record {
            Capability::L2Alloc(capability) => Some(capability),
            _ => None,
        })
    }

    pub fn mba(&self) -> Option<&MbaCapability> {
        self.records.iter().find_map(|record| match record {
            Capability::MBAlloc(capability) => Some(capability),
            _ => None,
        })
    }

    pub(crate) fn l3ca_mut(&mut self) -> Option<&mut CacheAllocCapability> {
        self.records.iter_mut().find_map(|record| match record {
            Capability::L3Alloc(capability) => Some(capability),
            _ => None,
        })
    }

    pub(crate) fn l2ca_mut(&mut self) -> Option<&mut CacheAllocCapability> {
        self.records.iter_mut().find_map(|record| match record {
            Capability::L2Alloc(capability) => Some(capability),
            _ => None,
        })
    }

    pub(crate) fn mba_mut(&mut self) -> Option<&mut MbaCapability> {
        self.records.iter_mut().find_map(|record| match record {
            Capability::MBAlloc(capability) => Some(capability),
            _ => None,
        })
    }
}

impl<'table> IntoIterator for &'table CapabilityTable {
    type Item = &'table Capability;
    type IntoIter = std::slice::Iter<'table, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
