//! Fluent builder for constructing a [`Manager`].

use sim_component::{Component, ComponentSet, DependencyLists};
use sim_core::{ComponentId, CoreError, SimConfig};

use crate::{Manager, ManagerError, ManagerResult, RewardAggregator, SumRewards};

/// Fluent builder for [`Manager`].
///
/// # Required inputs
///
/// - [`SimConfig`] — duration, timestep length, seed, …
///
/// # Optional inputs (have defaults)
///
/// | Method                 | Default                 |
/// |------------------------|-------------------------|
/// | `.register(c, deps)`   | No components           |
/// | `.components(set)`     | Empty `ComponentSet`    |
/// | `.aggregator(a)`       | [`SumRewards`]          |
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = ManagerBuilder::new(config);
/// let radar = builder.register(Radar::new(), DependencyLists::none())?;
/// builder.register(Tracker::default(), DependencyLists::all_phases(&[radar]))?;
/// let manager = builder.aggregator(MinRewards).build()?;
/// ```
pub struct ManagerBuilder {
    config:     SimConfig,
    components: ComponentSet,
    aggregator: Option<Box<dyn RewardAggregator>>,
}

impl ManagerBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            components: ComponentSet::new(),
            aggregator: None,
        }
    }

    /// Register a component under the next free id.
    pub fn register<C: Component>(
        &mut self,
        component: C,
        deps:      DependencyLists,
    ) -> ManagerResult<ComponentId> {
        self.components
            .register(component, deps)
            .map_err(|e| ManagerError::Config(e.to_string()))
    }

    /// Register a boxed component under a caller-chosen id.
    pub fn insert(
        &mut self,
        id:        ComponentId,
        component: Box<dyn Component>,
        deps:      DependencyLists,
    ) -> ManagerResult<()> {
        self.components
            .insert(id, component, deps)
            .map_err(|e| ManagerError::Config(e.to_string()))
    }

    /// Replace the working set with one assembled elsewhere (e.g. by a
    /// manifest-driven factory).
    pub fn components(mut self, components: ComponentSet) -> Self {
        self.components = components;
        self
    }

    pub fn aggregator<A: RewardAggregator + 'static>(mut self, aggregator: A) -> Self {
        self.aggregator = Some(Box::new(aggregator));
        self
    }

    /// Validate the configuration and return a manager in `Uninitialized`.
    ///
    /// Dependency lists are not checked here; each phase resolves its own
    /// order before its first component call.
    pub fn build(self) -> ManagerResult<Manager> {
        self.config.validate().map_err(|e| match e {
            CoreError::Config(msg) => ManagerError::Config(msg),
            other => ManagerError::Config(other.to_string()),
        })?;

        let aggregator = self.aggregator.unwrap_or_else(|| Box::new(SumRewards));
        Ok(Manager::from_parts(self.config, self.components, aggregator))
    }
}
