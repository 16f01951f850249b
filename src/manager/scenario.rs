//! Single-scenario lifecycle

use tokio_util::sync::CancellationToken;

use crate::common::{Config, Result};
use crate::driver::DriverHandle;
use crate::events::{self, EventPublisher, EventType};
use crate::execution::{ActionSettings, ExecutionContext, ExecutionScope};
use crate::model::Scenario;
use crate::strategy::Strategy;
use crate::validation::ValidationChain;

/// Wraps one execution context in SCENARIO_* lifecycle events
#[derive(Debug, Clone)]
pub struct ScenarioManager {
    context: ExecutionContext,
    events: EventPublisher,
    settings: ActionSettings,
    cancel: CancellationToken,
}

impl ScenarioManager {
    pub fn new(context: ExecutionContext, events: EventPublisher) -> Self {
        Self {
            context,
            events,
            settings: ActionSettings::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Strategy, validation chain, observers and wait settings from `config`
    pub fn from_config(config: &Config) -> Self {
        let env = config.environment();
        let context = ExecutionContext::new(Strategy::build(config.execution.strategy, config))
            .with_step_validators(ValidationChain::for_environment(&env));

        let publisher = EventPublisher::new();
        for observer in events::for_environment(&env, config) {
            publisher.add_observer(observer);
        }

        Self::new(context, publisher).with_settings(ActionSettings::from_config(config))
    }

    pub fn with_settings(mut self, settings: ActionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Scenarios started afterwards stop when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run one scenario on `driver`; exactly one terminal scenario event is published
    pub async fn run_scenario(&self, driver: DriverHandle, scenario: &Scenario) -> Result<()> {
        let events = self.events.with_origin(scenario.name.as_str());
        events.publish(events.event(
            EventType::ScenarioStarted,
            format!("Starting scenario: {}", scenario.name),
        ));
        tracing::info!(
            "Starting scenario '{}' with {} steps",
            scenario.name,
            scenario.steps.len()
        );

        let scope = ExecutionScope::new(driver, events.clone())
            .with_settings(self.settings.clone())
            .with_cancellation(self.cancel.child_token());

        let result = self.context.execute(&scope, &scenario.steps).await;
        match &result {
            Ok(()) => {
                tracing::info!("Scenario '{}' completed", scenario.name);
                events.publish(events.event(
                    EventType::ScenarioCompleted,
                    format!("Scenario completed: {}", scenario.name),
                ));
            }
            Err(e) => {
                tracing::error!("Scenario '{}' failed: {}", scenario.name, e);
                events.publish(
                    events
                        .event(EventType::ScenarioFailed, e.to_string())
                        .with_failure(e),
                );
            }
        }
        result
    }
}
