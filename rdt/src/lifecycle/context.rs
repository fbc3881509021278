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
use std::sync::Arc;

use parking_lot::Mutex;
use parking_lot::MutexGuard;

use cpu_utils::CPUTopology;
use rdt_config::InterfaceRestriction;
use rdt_config::RDTConfig;
use rdt_shared::types::Interface;

use super::api_lock::FileLockGuard;
use super::api_lock::LockFile;
use super::AllocationGate;
use super::MonitoringGate;
use super::NativePlatform;
use super::Platform;
use super::ResourceConsumer;
use crate::discover_capabilities;
use crate::discovery::RegisterDiscovery;
use crate::CapabilityDiscovery;
use crate::CapabilityTable;
use crate::CdpConfig;
use crate::MbaConfig;
use crate::RDTError;
use crate::RDTResult;

/// Handle owning discovered capabilities and everything acquired to
/// discover them. All entry points serialize on an in-process mutex and an
/// advisory lock file, in this order.
pub struct RDTContext<P: Platform> {
    platform: P,
    lock_file: LockFile,
    inner: Mutex<Inner<P>>,
}

struct Inner<P: Platform> {
    phase: Phase<P>,
    allocation: Box<dyn ResourceConsumer>,
    monitoring: Box<dyn ResourceConsumer>,
}

enum Phase<P: Platform> {
    Uninitialized,
    /// Left behind only if initialization panicked, retried on the next call.
    Initializing,
    Ready(ReadyState<P>),
}

struct ReadyState<P: Platform> {
    interface: Interface,
    topology: Arc<CPUTopology>,
    table: CapabilityTable,
    probe: P::Probe,
    os_backend: Option<P::OsBackend>,
    allocation_ready: bool,
    monitoring_ready: bool,
}

/// Access to the context under the API lock, for subsystems that keep
/// the lock across several calls. Locks are released on drop.
pub struct ApiGuard<'ctx, P: Platform> {
    // fields drop in order: the file lock goes first, then the mutex
    _file_lock: FileLockGuard<'ctx>,
    inner: MutexGuard<'ctx, Inner<P>>,
}

impl RDTContext<NativePlatform> {
    pub fn native(config: &RDTConfig) -> RDTResult<Self> {
        Self::new(NativePlatform, &config.lock_file)
    }
}

impl<P: Platform> RDTContext<P> {
    pub fn new(platform: P, lock_path: impl AsRef<Path>) -> RDTResult<Self> {
        Self::with_consumers(
            platform,
            lock_path,
            Box::<AllocationGate>::default(),
            Box::<MonitoringGate>::default(),
        )
    }

    pub fn with_consumers(
        platform: P,
        lock_path: impl AsRef<Path>,
        allocation: Box<dyn ResourceConsumer>,
        monitoring: Box<dyn ResourceConsumer>,
    ) -> RDTResult<Self> {
        let lock_file = LockFile::open(lock_path)?;
        let inner = Inner {
            phase: Phase::Uninitialized,
            allocation,
            monitoring,
        };

        Ok(Self {
            platform,
            lock_file,
            inner: Mutex::new(inner),
        })
    }

    pub fn lock_path(&self) -> &Path {
        self.lock_file.path()
    }

    /// Takes both API locks.
    pub fn lock(&self) -> ApiGuard<'_, P> {
        let inner = self.inner.lock();
        let file_lock = self.lock_file.lock();

        ApiGuard {
            _file_lock: file_lock,
            inner,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_initialized()
    }

    /// Initializes the context honoring the interface restriction from the
    /// `RDT_IFACE` environment variable.
    pub fn initialize(&self, config: &RDTConfig) -> RDTResult<()> {
        let restriction = InterfaceRestriction::from_env()?;
        self.initialize_with_restriction(config, restriction)
    }

    pub fn initialize_with_restriction(
        &self,
        config: &RDTConfig,
        restriction: InterfaceRestriction,
    ) -> RDTResult<()> {
        if !restriction.allows(config.interface) {
            tracing::error!(
                "Interface {} is forbidden by RDT_IFACE restriction {restriction:?}",
                config.interface
            );
            return Err(RDTError::interface_restricted(config.interface));
        }

        let mut guard = self.lock();
        let inner = &mut *guard.inner;
        match inner.phase {
            Phase::Uninitialized => {}
            Phase::Initializing => {
                tracing::warn!("Previous initialization was interrupted, starting over")
            }
            Phase::Ready(_) => {
                tracing::error!("RDT context is already initialized");
                return Err(RDTError::AlreadyInitialized);
            }
        }
        inner.phase = Phase::Initializing;

        let span = tracing::info_span!("rdt_init", interface = %config.interface);
        let _entered = span.enter();

        match self.bring_up(inner, config) {
            Ok(ready) => {
                inner.phase = Phase::Ready(ready);
                tracing::info!("RDT context initialized");
                Ok(())
            }
            Err(error) => {
                inner.phase = Phase::Uninitialized;
                tracing::error!("RDT initialization failed: {error}");
                Err(error)
            }
        }
    }

    /// Shuts consumers down and releases everything acquired during
    /// initialization. Every step runs, the first failure is returned.
    pub fn teardown(&self) -> RDTResult<()> {
        let mut guard = self.lock();
        let inner = &mut *guard.inner;

        let ready = match std::mem::replace(&mut inner.phase, Phase::Uninitialized) {
            Phase::Ready(ready) => ready,
            other => {
                inner.phase = other;
                tracing::error!("RDT context isn't initialized");
                return Err(RDTError::NotInitialized);
            }
        };

        let ReadyState {
            topology,
            table,
            probe,
            os_backend,
            allocation_ready,
            monitoring_ready,
            ..
        } = ready;

        let mut first_error = None;
        if monitoring_ready {
            note_failure(&mut first_error, "monitoring shutdown", inner.monitoring.fini());
        }
        if allocation_ready {
            note_failure(&mut first_error, "allocation shutdown", inner.allocation.fini());
        }
        drop(os_backend);
        note_failure(
            &mut first_error,
            "register access release",
            self.platform.release_register_access(probe),
        );
        drop(table);
        drop(topology);

        match first_error {
            None => {
                tracing::info!("RDT context shut down");
                Ok(())
            }
            Some(error) => Err(error),
        }
    }

    /// A snapshot of the discovered capabilities with the topology they
    /// were discovered on.
    pub fn get_capabilities(&self) -> RDTResult<(CapabilityTable, Arc<CPUTopology>)> {
        let guard = self.lock();
        let ready = guard.ready()?;

        Ok((ready.table.clone(), ready.topology.clone()))
    }

    fn bring_up(&self, inner: &mut Inner<P>, config: &RDTConfig) -> RDTResult<ReadyState<P>> {
        let topology = Arc::new(self.platform.build_topology()?);
        let probe = self.platform.init_register_access(&topology)?;

        match self.discover_and_start(inner, config, &topology, &probe) {
            Ok((table, os_backend, allocation_ready, monitoring_ready)) => Ok(ReadyState {
                interface: config.interface,
                topology,
                table,
                probe,
                os_backend,
                allocation_ready,
                monitoring_ready,
            }),
            Err(error) => {
                note_failure(
                    &mut None,
                    "register access release",
                    self.platform.release_register_access(probe),
                );
                Err(error)
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn discover_and_start(
        &self,
        inner: &mut Inner<P>,
        config: &RDTConfig,
        topology: &CPUTopology,
        probe: &P::Probe,
    ) -> RDTResult<(CapabilityTable, Option<P::OsBackend>, bool, bool)> {
        let interface = config.interface;
        let os_backend = if interface.is_os() {
            Some(self.platform.init_os_backend(config)?)
        } else {
            if self.platform.os_backend_mounted(config) {
                tracing::warn!(
                    "resctrl filesystem is mounted, using the MSR interface may corrupt it and cause unexpected behaviour"
                );
            }
            None
        };

        let direct = RegisterDiscovery::new(probe);
        let os = os_backend
            .as_ref()
            .map(|backend| backend as &dyn CapabilityDiscovery);
        let table = discover_capabilities(interface, topology, &direct, os)?;

        let allocation_ready = match inner.allocation.init(topology, &table, interface) {
            Ok(()) => {
                tracing::debug!("{} consumer initialized", inner.allocation.name());
                true
            }
            Err(error) => {
                tracing::error!("{} consumer init failed: {error}", inner.allocation.name());
                false
            }
        };

        let monitoring_ready = match inner.monitoring.init(topology, &table, interface) {
            Ok(()) => {
                tracing::debug!("{} consumer initialized", inner.monitoring.name());
                true
            }
            Err(error) if error.is_resource_not_detected() => {
                tracing::debug!("{} consumer skipped: {error}", inner.monitoring.name());
                false
            }
            Err(error) => {
                tracing::error!("{} consumer init failed: {error}", inner.monitoring.name());
                false
            }
        };

        if !allocation_ready && !monitoring_ready {
            tracing::error!("None of the detected capabilities could be initialized");
            return Err(RDTError::NoConsumerInitialized);
        }

        Ok((table, os_backend, allocation_ready, monitoring_ready))
    }
}

impl<P: Platform> ApiGuard<'_, P> {
    pub fn is_initialized(&self) -> bool {
        matches!(self.inner.phase, Phase::Ready(_))
    }

    pub fn capabilities(&self) -> RDTResult<&CapabilityTable> {
        self.ready().map(|ready| &ready.table)
    }

    pub fn topology(&self) -> RDTResult<&Arc<CPUTopology>> {
        self.ready().map(|ready| &ready.topology)
    }

    pub fn interface(&self) -> RDTResult<Interface> {
        self.ready().map(|ready| ready.interface)
    }

    /// Reflects an L3 CDP switch done by the caller.
    pub fn l3cdp_change(&mut self, config: CdpConfig) -> RDTResult<()> {
        self.ready_mut()?.table.l3cdp_change(config);
        Ok(())
    }

    pub fn l2cdp_change(&mut self, config: CdpConfig) -> RDTResult<()> {
        self.ready_mut()?.table.l2cdp_change(config);
        Ok(())
    }

    pub fn mba_change(&mut self, config: MbaConfig) -> RDTResult<()> {
        let ready = self.ready_mut()?;
        ready.table.mba_change(config, ready.interface);
        Ok(())
    }

    fn ready(&self) -> RDTResult<&ReadyState<P>> {
        match &self.inner.phase {
            Phase::Ready(ready) => Ok(ready),
            _ => Err(RDTError::NotInitialized),
        }
    }

    fn ready_mut(&mut self) -> RDTResult<&mut ReadyState<P>> {
        match &mut self.inner.phase {
            Phase::Ready(ready) => Ok(ready),
            _ => Err(RDTError::NotInitialized),
        }
    }
}

fn note_failure(first_error: &mut Option<RDTError>, step: &str, result: RDTResult<()>) {
    if let Err(error) = result {
        tracing::error!("{step} failed: {error}");
        first_error.get_or_insert(error);
    }
}
