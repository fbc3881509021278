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

use rdt_test_utils::topology_without_caches;
use rdt_test_utils::two_socket_topology;
use rdt_test_utils::FakeProbe;
use rdt_test_utils::L3_SIZE;

use super::*;

fn monitoring_probe(l3_events_edx: u32) -> FakeProbe {
    FakeProbe::new()
        .with_leaf(0x7, 0, [0, 1 << 12, 0, 0])
        .with_leaf(0xF, 0, [0, 143, 0, 1 << 1])
        .with_leaf(0xF, 1, [0, 65536, 175, l3_events_edx])
}

fn kinds(capability: &MonitoringCapability) -> Vec<EventKind> {
    capability.events.iter().map(|event| event.kind).collect()
}

#[test_log::test]
fn all_events_in_fixed_order() {
    let probe = monitoring_probe(0b111).with_leaf(0xA, 0, [4 << 8, 0, 0, 3]);

    let capability = discover(&probe, &two_socket_topology()).unwrap();

    assert_eq!(capability.max_rmid, 144);
    assert_eq!(capability.l3_size, L3_SIZE);
    assert_eq!(
        kinds(&capability),
        vec![
            EventKind::L3Occupancy,
            EventKind::TotalMemBandwidth,
            EventKind::LocalMemBandwidth,
            EventKind::RemoteMemBandwidth,
            EventKind::Ipc,
            EventKind::LlcMiss,
        ]
    );

    let occupancy = capability.event(EventKind::L3Occupancy).unwrap();
    assert_eq!(occupancy.max_rmid, 176);
    assert_eq!(occupancy.scale_factor, 65536);

    let ipc = capability.event(EventKind::Ipc).unwrap();
    assert_eq!((ipc.max_rmid, ipc.scale_factor), (0, 0));
}

#[test]
fn remote_bandwidth_needs_total_and_local() {
    let probe = monitoring_probe(0b011);

    let capability = discover(&probe, &two_socket_topology()).unwrap();

    assert_eq!(
        kinds(&capability),
        vec![EventKind::L3Occupancy, EventKind::TotalMemBandwidth]
    );
}

#[test]
fn pmu_events_depend_on_counters() {
    // instructions retired event is unavailable, so IPC is out
    let probe = monitoring_probe(0b001).with_leaf(0xA, 0, [2 << 8, 0b10, 0, 3]);

    let capability = discover(&probe, &two_socket_topology()).unwrap();

    assert_eq!(
        kinds(&capability),
        vec![EventKind::L3Occupancy, EventKind::LlcMiss]
    );
}

#[test]
fn single_fixed_counter_isnt_enough_for_ipc() {
    let probe = monitoring_probe(0).with_leaf(0xA, 0, [0, 0, 0, 1]);

    let result = discover(&probe, &two_socket_topology());

    assert!(result.unwrap_err().is_resource_not_detected());
}

#[test]
fn pmu_only_events_still_count() {
    let probe = monitoring_probe(0).with_leaf(0xA, 0, [0, 0, 0, 3]);

    let capability = discover(&probe, &two_socket_topology()).unwrap();

    assert_eq!(kinds(&capability), vec![EventKind::Ipc]);
}

#[test]
fn missing_feature_bits_mean_not_detected() {
    let no_feature = FakeProbe::new().with_leaf(0xF, 0, [0, 143, 0, 1 << 1]);
    let result = discover(&no_feature, &two_socket_topology());
    assert!(result.unwrap_err().is_resource_not_detected());

    let no_l3 = FakeProbe::new()
        .with_leaf(0x7, 0, [0, 1 << 12, 0, 0])
        .with_leaf(0xF, 0, [0, 143, 0, 0]);
    let result = discover(&no_l3, &two_socket_topology());
    assert!(result.unwrap_err().is_resource_not_detected());
}

#[test]
fn undetected_l3_is_fatal() {
    let probe = monitoring_probe(0b111);

    let result = discover(&probe, &topology_without_caches());

    assert!(matches!(
        result,
        Err(RDTError::CacheInfoMissing {
            level: CacheLevel::L3
        })
    ));
}
