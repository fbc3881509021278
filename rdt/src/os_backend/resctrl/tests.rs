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

use std::path::Path;

use tempfile::TempDir;

use rdt_test_utils::two_socket_topology;
use rdt_test_utils::L3_SIZE;
use rdt_test_utils::L3_WAYS;

use super::*;

/// Scratch proc, resctrl and perf trees.
struct FsFixture {
    root: TempDir,
}

impl FsFixture {
    fn new() -> Self {
        let fixture = Self {
            root: tempfile::tempdir().unwrap(),
        };
        fixture.write("proc/filesystems", "nodev\tsysfs\nnodev\tresctrl\n");
        fixture.write("proc/cpuinfo", "flags\t\t: fpu cqm cdp_l3\n");
        fixture.write("proc/mounts", "resctrl /sys/fs/resctrl resctrl rw 0 0\n");
        fixture.write("resctrl/cpus", "ff\n");
        fixture
    }

    fn paths(&self) -> OsPaths {
        OsPaths {
            resctrl: self.root.path().join("resctrl"),
            proc: self.root.path().join("proc"),
            perf_events: self.root.path().join("perf/events"),
        }
    }

    fn write(&self, relative: impl AsRef<Path>, content: &str) {
        let path = self.root.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn remove(&self, relative: &str) {
        std::fs::remove_file(self.root.path().join(relative)).unwrap();
    }

    fn with_l3(self, dir: &str, num_closids: u32) -> Self {
        self.write(format!("resctrl/info/{dir}/num_closids"), &format!("{num_closids}\n"));
        self.write(format!("resctrl/info/{dir}/cbm_mask"), "fffff\n");
        self.write(format!("resctrl/info/{dir}/shareable_bits"), "c0000\n");
        self
    }

    fn with_l3_mon(self, features: &str) -> Self {
        self.write("resctrl/info/L3_MON/num_rmids", "224\n");
        self.write("resctrl/info/L3_MON/mon_features", features);
        self
    }

    fn with_mb(self, delay_linear: u32) -> Self {
        self.write("resctrl/info/MB/num_closids", "8\n");
        self.write("resctrl/info/MB/min_bandwidth", "10\n");
        self.write("resctrl/info/MB/bandwidth_gran", "10\n");
        self.write("resctrl/info/MB/delay_linear", &format!("{delay_linear}\n"));
        self
    }

    fn discovery(&self, interface: Interface) -> ResctrlDiscovery {
        ResctrlDiscovery::init(self.paths(), interface).unwrap()
    }
}

fn kinds(capability: &MonitoringCapability) -> Vec<EventKind> {
    capability.events.iter().map(|event| event.kind).collect()
}

#[test_log::test]
fn init_requires_kernel_support() {
    let fixture = FsFixture::new();
    fixture.write("proc/filesystems", "nodev\tsysfs\n");

    let result = ResctrlDiscovery::init(fixture.paths(), Interface::Os);

    assert!(matches!(result, Err(RDTError::InterfaceNotSupported(_))));
}

#[test]
fn init_requires_mounted_resctrl() {
    let fixture = FsFixture::new();
    fixture.remove("resctrl/cpus");

    assert!(!ResctrlDiscovery::is_mounted(&fixture.paths()));
    let result = ResctrlDiscovery::init(fixture.paths(), Interface::Os);
    assert!(matches!(result, Err(RDTError::InterfaceNotSupported(_))));
}

#[test]
fn resctrl_monitoring_interface_requires_l3_mon() {
    let fixture = FsFixture::new();

    let result = ResctrlDiscovery::init(fixture.paths(), Interface::OsResctrlMon);
    assert!(matches!(result, Err(RDTError::InterfaceNotSupported(_))));

    let fixture = fixture.with_l3_mon("llc_occupancy\n");
    assert!(ResctrlDiscovery::init(fixture.paths(), Interface::OsResctrlMon).is_ok());
}

#[test]
fn l3_with_cdp_off() {
    let fixture = FsFixture::new().with_l3("L3", 16);
    let topology = two_socket_topology();

    let capability = fixture
        .discovery(Interface::Os)
        .discover_l3ca(&topology)
        .unwrap();

    assert_eq!(
        capability,
        CacheAllocCapability {
            num_classes: 16,
            num_ways: 20,
            way_size: L3_SIZE / L3_WAYS as u64,
            way_contention: 0xc0000,
            cdp: true,
            cdp_on: false,
        }
    );
}

#[test]
fn l3_code_and_data_mean_cdp_on() {
    let fixture = FsFixture::new().with_l3("L3CODE", 8).with_l3("L3DATA", 8);
    fixture.write("proc/cpuinfo", "flags\t\t: fpu cqm\n");

    let capability = fixture
        .discovery(Interface::Os)
        .discover_l3ca(&two_socket_topology())
        .unwrap();

    assert!(capability.cdp);
    assert!(capability.cdp_on);
    assert_eq!(capability.num_classes, 8);
}

#[test]
fn missing_info_dir_is_not_detected() {
    let fixture = FsFixture::new().with_l3("L3CODE", 8);
    let discovery = fixture.discovery(Interface::Os);
    let topology = two_socket_topology();

    assert!(discovery
        .discover_l3ca(&topology)
        .unwrap_err()
        .is_resource_not_detected());
    assert!(discovery
        .discover_l2ca(&topology)
        .unwrap_err()
        .is_resource_not_detected());
    assert!(discovery
        .discover_mba(&topology)
        .unwrap_err()
        .is_resource_not_detected());
}

#[test]
fn garbage_in_info_file_is_fatal() {
    let fixture = FsFixture::new().with_l3("L2", 8);
    fixture.write("resctrl/info/L2/num_closids", "eight\n");

    let result = fixture
        .discovery(Interface::Os)
        .discover_l2ca(&two_socket_topology());

    assert!(matches!(result, Err(RDTError::ResctrlParse { .. })));
}

#[test]
fn monitoring_through_resctrl() {
    let fixture = FsFixture::new()
        .with_l3_mon("llc_occupancy\nmbm_total_bytes\nmbm_local_bytes\n");

    let capability = fixture
        .discovery(Interface::OsResctrlMon)
        .discover_monitoring(&two_socket_topology())
        .unwrap();

    assert_eq!(capability.max_rmid, 224);
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
    assert!(capability
        .events
        .iter()
        .filter(|event| !event.kind.is_pmu_event())
        .all(|event| event.scale_factor == 1 && event.max_rmid == 224));
}

#[test_log::test]
fn monitoring_falls_back_to_perf() {
    let fixture = FsFixture::new();
    fixture.write("perf/events/llc_occupancy", "event=0x01\n");
    fixture.write("perf/events/llc_occupancy.scale", "1\n");
    fixture.write("perf/events/llc_occupancy.unit", "Bytes\n");
    fixture.write("perf/events/total_bytes", "event=0x02\n");
    fixture.write("perf/events/total_bytes.scale", "6.103515625e-5\n");
    fixture.write("perf/events/total_bytes.unit", "MB\n");

    let capability = fixture
        .discovery(Interface::Os)
        .discover_monitoring(&two_socket_topology())
        .unwrap();

    assert_eq!(capability.max_rmid, 0);
    assert_eq!(
        kinds(&capability),
        vec![
            EventKind::L3Occupancy,
            EventKind::TotalMemBandwidth,
            EventKind::Ipc,
            EventKind::LlcMiss,
        ]
    );
    assert_eq!(
        capability
            .event(EventKind::TotalMemBandwidth)
            .map(|event| event.scale_factor),
        Some(61)
    );
}

#[test]
fn unknown_perf_unit_is_fatal() {
    let fixture = FsFixture::new();
    fixture.write("perf/events/llc_occupancy", "event=0x01\n");
    fixture.write("perf/events/llc_occupancy.scale", "1\n");
    fixture.write("perf/events/llc_occupancy.unit", "KiB\n");

    let result = fixture
        .discovery(Interface::Os)
        .discover_monitoring(&two_socket_topology());

    assert!(matches!(result, Err(RDTError::ResctrlParse { .. })));
}

#[test]
fn monitoring_needs_cqm_flag() {
    let fixture = FsFixture::new().with_l3_mon("llc_occupancy\n");
    fixture.write("proc/cpuinfo", "flags\t\t: fpu\n");

    let result = fixture
        .discovery(Interface::Os)
        .discover_monitoring(&two_socket_topology());

    assert!(result.unwrap_err().is_resource_not_detected());
}

#[test]
fn mba_with_default_mount() {
    let fixture = FsFixture::new().with_mb(1);

    let capability = fixture
        .discovery(Interface::Os)
        .discover_mba(&two_socket_topology())
        .unwrap();

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
fn non_linear_mba_is_not_detected() {
    let fixture = FsFixture::new().with_mb(0);

    let result = fixture
        .discovery(Interface::Os)
        .discover_mba(&two_socket_topology());

    assert!(result.unwrap_err().is_resource_not_detected());
}

#[test]
fn mba_controller_status() {
    let fixture = FsFixture::new().with_mb(1);
    let discovery = fixture.discovery(Interface::Os);
    let mba = discovery.discover_mba(&two_socket_topology()).unwrap();

    let controller = discovery.mba_controller(&mba).unwrap();
    assert_eq!(controller.ctrl, MbaCtrlSupport::Unsupported);
    assert!(!controller.ctrl_on);

    let fixture = fixture.with_l3_mon("llc_occupancy\nmbm_local_bytes\n");
    let controller = discovery.mba_controller(&mba).unwrap();
    assert_eq!(controller.ctrl, MbaCtrlSupport::Unknown);

    fixture.write(
        "proc/mounts",
        "resctrl /sys/fs/resctrl resctrl rw,mba_MBps 0 0\n",
    );
    let controller = discovery.mba_controller(&mba).unwrap();
    assert_eq!(
        controller,
        MbaController {
            ctrl: MbaCtrlSupport::Supported,
            ctrl_on: true,
        }
    );
}
