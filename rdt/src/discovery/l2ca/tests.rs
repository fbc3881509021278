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

use maplit::hashmap;

use rdt_test_utils::topology_without_caches;
use rdt_test_utils::two_socket_topology;
use rdt_test_utils::FakeProbe;
use rdt_test_utils::L2_SIZE;

use super::*;

const L2_CFG: u32 = 0xC82;

fn l2_probe(cdp: bool) -> FakeProbe {
    let ecx = if cdp { 1 << 2 } else { 0 };
    FakeProbe::new()
        .with_leaf(0x7, 0, [0, 1 << 15, 0, 0])
        .with_leaf(0x10, 0, [0, 1 << 2, 0, 0])
        .with_leaf(0x10, 2, [15, 0, ecx, 7])
}

fn all_clusters(value: u64) -> FakeProbe {
    l2_probe(true).with_registers(hashmap! {
        (0, L2_CFG) => value,
        (2, L2_CFG) => value,
        (4, L2_CFG) => value,
        (6, L2_CFG) => value,
    })
}

#[test]
fn decodes_sub_leaf_two() {
    let capability = discover(&l2_probe(false), &two_socket_topology()).unwrap();

    assert_eq!(
        capability,
        CacheAllocCapability {
            num_classes: 8,
            num_ways: 16,
            way_size: L2_SIZE / 16,
            way_contention: 0,
            cdp: false,
            cdp_on: false,
        }
    );
}

#[test_log::test]
fn enabled_cdp_halves_classes() {
    let capability = discover(&all_clusters(1), &two_socket_topology()).unwrap();

    assert!(capability.cdp);
    assert!(capability.cdp_on);
    assert_eq!(capability.num_classes, 4);
}

#[test_log::test]
fn disabled_cdp_keeps_classes() {
    let capability = discover(&all_clusters(0), &two_socket_topology()).unwrap();

    assert!(capability.cdp);
    assert!(!capability.cdp_on);
    assert_eq!(capability.num_classes, 8);
}

#[test]
fn l3_only_platform_has_no_l2_cat() {
    let probe = FakeProbe::new()
        .with_leaf(0x7, 0, [0, 1 << 15, 0, 0])
        .with_leaf(0x10, 0, [0, 1 << 1, 0, 0]);

    let result = discover(&probe, &two_socket_topology());

    assert!(result.unwrap_err().is_resource_not_detected());
}

#[test]
fn undetected_l2_is_fatal() {
    let result = discover(&l2_probe(false), &topology_without_caches());

    assert!(matches!(
        result,
        Err(RDTError::CacheInfoMissing {
            level: CacheLevel::L2
        })
    ));
}
