//! Cucumber runner for the behavioural suite.
//!
//! Scenarios run one at a time: the scenario context is bound to the runner thread,
//! so interleaving two scenarios would mix their state. Before/after hooks are wired
//! to [`ScenarioHooks`] the same way an embedding test suite would wire them.

mod steps;
mod world;

use apicheck::logger::init_logger;
use apicheck::steps::{ScenarioHooks, ScenarioInfo};
use cucumber::event::ScenarioFinished;
use cucumber::gherkin::{Feature, Scenario};
use cucumber::World;
use futures::FutureExt;
use world::ApiWorld;

fn scenario_info(feature: &Feature, scenario: &Scenario) -> ScenarioInfo {
    ScenarioInfo::new(scenario.name.clone())
        .with_tags(feature.tags.iter().chain(&scenario.tags).cloned())
}

#[tokio::main]
async fn main() {
    init_logger();

    ApiWorld::cucumber()
        .max_concurrent_scenarios(1)
        .before(|feature, _rule, scenario, _world| {
            async move {
                ScenarioHooks::default().before(&scenario_info(feature, scenario));
            }
            .boxed_local()
        })
        .after(|feature, _rule, scenario, event, world| {
            async move {
                let info = scenario_info(feature, scenario);
                let passed = !matches!(
                    event,
                    ScenarioFinished::StepFailed(..) | ScenarioFinished::BeforeHookFailed(..)
                );
                let hooks = ScenarioHooks::default();
                if let Err(e) = hooks.after(&info, passed) {
                    tracing::error!("Could not record scenario '{}': {}", info.name, e);
                }
                if let Some(world) = world {
                    hooks.after_db(&info, world.gateway()).await;
                }
            }
            .boxed_local()
        })
        .fail_on_skipped()
        .run_and_exit("tests/features")
        .await;
}
