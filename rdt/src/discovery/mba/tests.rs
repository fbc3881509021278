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

use rdt_test_utils::FakeProbe;

use super::*;

fn mba_probe(eax: u32, ecx: u32, edx: u32) -> FakeProbe {
    FakeProbe::new()
        .with_leaf(0x7, 0, [0, 1 << 15, 0, 0])
        .with_leaf(0x10, 0, [0, 1 << 3, 0, 0])
        .with_leaf(0x10, 3, [eax, 0, ecx, edx])
}

#[test]
fn linear_throttling_step() {
    let capability = discover(&mba_probe(89, 1 << 2, 7)).unwrap();

    assert_eq!(
        capability,
        MbaCapability {
            num_classes: 8,
            throttle_max: 90,
            throttle_step: 10,
            is_linear: true,
            ctrl: MbaCtrlSupport::Unknown,
            ctrl_on: false,
        }
    );
}

#[test]
fn step_saturates_at_zero() {
    let capability = discover(&mba_probe(0xFFF, 1 << 2, 0)).unwrap();

    assert_eq!(capability.throttle_max, 0x1000);
    assert_eq!(capability.throttle_step, 0);
}

#[test_log::test]
fn non_linear_throttling_is_not_detected() {
    let result = discover(&mba_probe(89, 0, 7));

    assert!(result.unwrap_err().is_resource_not_detected());
}

#[test]
fn missing_mba_bit_is_not_detected() {
    let probe = FakeProbe::new()
        .with_leaf(0x7, 0, [0, 1 << 15, 0, 0])
        .with_leaf(0x10, 0, [0, 0b110, 0, 0]);

    assert!(discover(&probe).unwrap_err().is_resource_not_detected());
}

#[test]
fn missing_allocation_feature_is_not_detected() {
    let probe = FakeProbe::new().with_leaf(0x10, 0, [0, 1 << 3, 0, 0]);

    assert!(discover(&probe).unwrap_err().is_resource_not_detected());
}
