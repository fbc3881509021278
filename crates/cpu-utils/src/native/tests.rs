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

use maplit::btreemap;

use super::*;

fn core_ids(ids: &[u32]) -> Vec<LogicalCoreId> {
    ids.iter().copied().map(LogicalCoreId::new).collect()
}

#[test]
fn cores_keep_their_l2_objects() {
    let packages = btreemap! {
        LogicalCoreId::new(0) => 0,
        LogicalCoreId::new(1) => 0,
        LogicalCoreId::new(2) => 1,
    };
    let clusters = btreemap! {
        LogicalCoreId::new(0) => 0,
        LogicalCoreId::new(1) => 0,
        LogicalCoreId::new(2) => 1,
    };

    let cores = assign_cores(packages, &clusters);

    assert_eq!(
        cores.iter().map(|core| core.logical_core_id).collect::<Vec<_>>(),
        core_ids(&[0, 1, 2])
    );
    assert_eq!(cores[1].l2_cluster, L2ClusterId::new(0));
    assert_eq!(cores[2].l2_cluster, L2ClusterId::new(1));
    assert_eq!(cores[2].socket, SocketId::new(1));
}

#[test]
fn cores_without_l2_get_fresh_clusters() {
    // core 3 would collide with L2 index 3 if its id were reused
    let packages = btreemap! {
        LogicalCoreId::new(0) => 0,
        LogicalCoreId::new(3) => 0,
        LogicalCoreId::new(5) => 1,
        LogicalCoreId::new(6) => 1,
    };
    let clusters = btreemap! {
        LogicalCoreId::new(0) => 3,
        LogicalCoreId::new(6) => 1,
    };

    let cores = assign_cores(packages, &clusters);
    let assigned = cores
        .iter()
        .map(|core| core.l2_cluster)
        .collect::<Vec<_>>();

    assert_eq!(
        assigned,
        vec![
            L2ClusterId::new(3),
            L2ClusterId::new(4),
            L2ClusterId::new(5),
            L2ClusterId::new(1),
        ]
    );
}

#[test]
fn no_l2_objects_at_all() {
    let packages = btreemap! {
        LogicalCoreId::new(0) => 0,
        LogicalCoreId::new(1) => 0,
    };

    let cores = assign_cores(packages, &BTreeMap::new());

    assert_eq!(cores[0].l2_cluster, L2ClusterId::new(0));
    assert_eq!(cores[1].l2_cluster, L2ClusterId::new(1));
}

#[test]
fn missing_cpuset_names_the_object_type() {
    let error = CPUTopologyError::cpuset_not_found(ObjectType::L2Cache, 2);

    let message = error.to_string();

    assert!(message.starts_with("L2Cache object 2"), "{message}");
}
