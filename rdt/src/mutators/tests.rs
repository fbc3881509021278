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

use crate::test_support::sample_l2ca;
use crate::test_support::sample_l3ca;
use crate::test_support::sample_mba;
use crate::test_support::sample_monitoring;
use crate::Capability;

use super::*;

fn full_table() -> CapabilityTable {
    CapabilityTable::new(vec![
        Capability::Monitoring(sample_monitoring()),
        Capability::L3Alloc(sample_l3ca()),
        Capability::L2Alloc(sample_l2ca()),
        Capability::MBAlloc(sample_mba()),
    ])
}

#[test]
fn l3_cdp_on_then_off() {
    let mut table = full_table();
    let classes = sample_l3ca().num_classes;

    table.l3cdp_change(CdpConfig::On);
    assert_eq!(table.l3ca().map(|l3| (l3.cdp_on, l3.num_classes)), Some((true, classes / 2)));

    table.l3cdp_change(CdpConfig::On);
    assert_eq!(table.l3ca().map(|l3| l3.num_classes), Some(classes / 2));

    table.l3cdp_change(CdpConfig::Off);
    assert_eq!(table.l3ca().map(|l3| (l3.cdp_on, l3.num_classes)), Some((false, classes)));

    // L2 is untouched by L3 changes
    assert_eq!(table.l2ca(), Some(&sample_l2ca()));
}

#[test]
fn l2_cdp_any_is_noop() {
    let mut table = full_table();

    table.l2cdp_change(CdpConfig::Any);
    table.l2cdp_change(CdpConfig::Off);

    assert_eq!(table, full_table());

    table.l2cdp_change(CdpConfig::On);
    assert_eq!(
        table.l2ca().map(|l2| l2.num_classes),
        Some(sample_l2ca().num_classes / 2)
    );
    assert_eq!(table.l3ca(), Some(&sample_l3ca()));
}

#[test]
fn mba_controller_through_os_marks_support() {
    let mut table = full_table();

    table.mba_change(MbaConfig::Controller, Interface::Os);

    let mba = table.mba().unwrap();
    assert!(mba.ctrl_on);
    assert_eq!(mba.ctrl, MbaCtrlSupport::Supported);

    table.mba_change(MbaConfig::Default, Interface::Os);
    let mba = table.mba().unwrap();
    assert!(!mba.ctrl_on);
    assert_eq!(mba.ctrl, MbaCtrlSupport::Supported);
}

#[test]
fn mba_controller_through_msr_keeps_support_unknown() {
    let mut table = full_table();

    table.mba_change(MbaConfig::Controller, Interface::Msr);

    let mba = table.mba().unwrap();
    assert!(mba.ctrl_on);
    assert_eq!(mba.ctrl, MbaCtrlSupport::Unknown);
}

#[test]
fn absent_records_are_ignored() {
    let mut table = CapabilityTable::new(vec![Capability::Monitoring(sample_monitoring())]);

    table.l3cdp_change(CdpConfig::On);
    table.l2cdp_change(CdpConfig::On);
    table.mba_change(MbaConfig::Controller, Interface::Os);

    assert_eq!(table.len(), 1);
}
