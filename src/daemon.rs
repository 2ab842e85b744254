//! The sample, derive, render and sleep loop.

use crate::bus::{BusIndex, BusLocator, DefaultBusLink, DefaultBusProbe, RegisterBus};
use crate::config::DaemonConfig;
use crate::error::Result;
use crate::leds::{LedMapper, RenderReport};
use crate::metrics::data::{DiskCounters, InterfaceCounters, StateSnapshot};
use crate::metrics::{ActivityEngine, CounterSampler, DeviceStates};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle of the daemon. States are only ever entered in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Discovering,
    Initializing,
    SamplingBaseline,
    Running,
    ShuttingDown,
    Stopped,
}

impl DaemonState {
    fn successor(self) -> Self {
        match self {
            Self::Discovering => Self::Initializing,
            Self::Initializing => Self::SamplingBaseline,
            Self::SamplingBaseline => Self::Running,
            Self::Running => Self::ShuttingDown,
            Self::ShuttingDown | Self::Stopped => Self::Stopped,
        }
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Both tables were read and the panel was updated
    Rendered(RenderReport),
    /// A counter table could not be read; nothing was rendered
    Skipped,
}

/// Owns the device state tables and drives the panel.
pub struct Daemon {
    config: DaemonConfig,
    sampler: CounterSampler,
    engine: ActivityEngine,
    mapper: LedMapper,
    states: DeviceStates,
    state: DaemonState,
    disks_seeded: bool,
    network_seeded: bool,
}

impl Daemon {
    /// Create a daemon from a validated configuration.
    pub fn new(config: DaemonConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            sampler: CounterSampler::new(&config),
            engine: ActivityEngine::new(&config),
            mapper: LedMapper::new(),
            states: DeviceStates::new(config.watched_disks.as_slice()),
            state: DaemonState::Discovering,
            disks_seeded: false,
            network_seeded: false,
            config,
        })
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    /// Current per-device state.
    pub fn states(&self) -> &DeviceStates {
        &self.states
    }

    fn advance(&mut self) {
        let next = self.state.successor();
        debug!("Daemon state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Find the bus the controller answers on.
    pub fn discover_bus(&self) -> Result<BusIndex> {
        BusLocator::new(
            DefaultBusProbe::default(),
            self.config.i2c_address,
            self.config.max_bus,
        )
        .locate()
    }

    /// Run against the real controller until `cancel` fires.
    ///
    /// Discovery and link errors are returned before the loop starts; nothing
    /// after that point is fatal.
    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let bus = self.discover_bus()?;
        let link = DefaultBusLink::open(bus, self.config.i2c_address)?;
        self.run_with_link(link, &cancel).await;
        Ok(())
    }

    /// Run the loop on an already open link, then clear the panel and close
    /// the link.
    pub async fn run_with_link<B: RegisterBus>(
        mut self,
        mut link: B,
        cancel: &CancellationToken,
    ) -> DeviceStates {
        if self.state == DaemonState::Discovering {
            self.advance();
        }

        self.mapper.turn_off_all(&mut link);
        self.advance();

        self.sample_baseline();
        self.advance();

        info!("Starting monitoring loop...");
        let interval = self.config.interval();
        while !cancel.is_cancelled() {
            match self.tick(&mut link) {
                TickOutcome::Rendered(report) => debug!(
                    "Tick rendered {} channel(s), {} failed write(s)",
                    report.channels_updated, report.failed_writes
                ),
                TickOutcome::Skipped => {
                    // Retry without sleeping; yield so the signal task can run.
                    tokio::task::yield_now().await;
                    continue;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancel.cancelled() => {}
            }
        }

        info!("Shutting down...");
        self.advance();
        self.mapper.turn_off_all(&mut link);
        link.close();
        self.advance();

        info!("LED monitor stopped.");
        self.states
    }

    /// Seed previous counters from one sample of each table.
    ///
    /// A table that cannot be read here is seeded by the first tick that
    /// reads it instead.
    pub fn sample_baseline(&mut self) {
        match self.sampler.read_disks() {
            Ok(disks) => self.seed_disks(&disks),
            Err(e) => warn!("Baseline disk sample failed: {}", e),
        }
        match self.sampler.read_interfaces() {
            Ok(ifaces) => self.seed_network(&ifaces),
            Err(e) => warn!("Baseline network sample failed: {}", e),
        }
    }

    fn seed_disks(&mut self, disks: &[DiskCounters]) {
        self.engine.seed_disks(&mut self.states.disks, disks);
        self.disks_seeded = true;
    }

    fn seed_network(&mut self, ifaces: &[InterfaceCounters]) {
        self.engine.seed_network(&mut self.states.network, ifaces);
        self.network_seeded = true;
    }

    /// Sample both tables, update state and render.
    pub fn tick<B: RegisterBus + ?Sized>(&mut self, link: &mut B) -> TickOutcome {
        match self.sampler.read_disks() {
            Ok(disks) if self.disks_seeded => {
                self.engine.update_disks(&mut self.states.disks, &disks)
            }
            Ok(disks) => self.seed_disks(&disks),
            Err(e) => {
                warn!("Failed to read disk stats: {}", e);
                return TickOutcome::Skipped;
            }
        }

        match self.sampler.read_interfaces() {
            Ok(ifaces) if self.network_seeded => {
                self.engine.update_network(&mut self.states.network, &ifaces)
            }
            Ok(ifaces) => self.seed_network(&ifaces),
            Err(e) => {
                warn!("Failed to read network stats: {}", e);
                return TickOutcome::Skipped;
            }
        }

        TickOutcome::Rendered(self.mapper.render(&self.states, link))
    }

    /// Take a baseline, wait one interval and derive state, without touching
    /// the bus.
    pub async fn snapshot(&mut self) -> Result<StateSnapshot> {
        let disks = self.sampler.read_disks()?;
        let ifaces = self.sampler.read_interfaces()?;
        self.seed_disks(&disks);
        self.seed_network(&ifaces);

        tokio::time::sleep(self.config.interval()).await;

        let disks = self.sampler.read_disks()?;
        let ifaces = self.sampler.read_interfaces()?;
        self.engine.update_disks(&mut self.states.disks, &disks);
        self.engine.update_network(&mut self.states.network, &ifaces);

        Ok(StateSnapshot {
            taken_at: chrono::Utc::now(),
            interval_ms: self.config.interval_ms,
            states: self.states.clone(),
        })
    }
}
