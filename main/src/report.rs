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

use std::fmt::Write as _;

use rdt_capabilities::CacheAllocCapability;
use rdt_capabilities::CacheLevel;
use rdt_capabilities::CPUTopology;
use rdt_capabilities::Capability;
use rdt_capabilities::CapabilityTable;
use rdt_capabilities::MbaCapability;
use rdt_capabilities::MonitoringCapability;

pub(crate) fn render(table: &CapabilityTable, topology: &CPUTopology) -> String {
    let mut out = String::new();

    let l3 = topology.cache_info(CacheLevel::L3);
    let _ = writeln!(
        out,
        "{} cores, {} sockets, {} L2 clusters, L3 {} bytes",
        topology.cores().len(),
        topology.sockets().len(),
        topology.l2_clusters().len(),
        l3.total_size
    );

    for record in table {
        match record {
            Capability::Monitoring(monitoring) => render_monitoring(&mut out, monitoring),
            Capability::L3Alloc(cache) => render_cache(&mut out, "L3 CAT", cache),
            Capability::L2Alloc(cache) => render_cache(&mut out, "L2 CAT", cache),
            Capability::MBAlloc(mba) => render_mba(&mut out, mba),
        }
    }

    out
}

fn render_monitoring(out: &mut String, monitoring: &MonitoringCapability) {
    let _ = writeln!(out, "Monitoring: max RMID {}", monitoring.max_rmid);
    for event in monitoring.events.iter() {
        let _ = writeln!(
            out,
            "    {:?}: max RMID {}, scale {}",
            event.kind, event.max_rmid, event.scale_factor
        );
    }
}

fn render_cache(out: &mut String, name: &str, cache: &CacheAllocCapability) {
    let cdp = match (cache.cdp, cache.cdp_on) {
        (false, _) => "unsupported",
        (true, false) => "off",
        (true, true) => "on",
    };
    let _ = writeln!(
        out,
        "{name}: {} classes, {} ways x {} bytes, contention {:#x}, CDP {cdp}",
        cache.num_classes, cache.num_ways, cache.way_size, cache.way_contention
    );
}

fn render_mba(out: &mut String, mba: &MbaCapability) {
    let _ = writeln!(
        out,
        "MBA: {} classes, max throttling {}%, step {}%, controller {:?}{}",
        mba.num_classes,
        mba.throttle_max,
        mba.throttle_step,
        mba.ctrl,
        if mba.ctrl_on { " (on)" } else { "" }
    );
}
