use anyhow::{Context, anyhow};
use tracing::info;

use arq_lab_abstract::{ArqConfig, TestAction, TestAssertion, TestScenario, TraceEvent};
use arq_lab_engine::{SimulationReport, Simulator};

/// Run a scenario: apply its config override, script its faults, drive
/// the simulation, then evaluate the assertions against the report.
pub async fn run_scenario(scenario: TestScenario) -> anyhow::Result<SimulationReport> {
    info!("Running scenario: {}", scenario.name);
    info!("Description: {}", scenario.description);

    let mut config = ArqConfig::default();
    scenario.config.apply_to(&mut config);

    let mut sim = Simulator::new(config).context("invalid scenario configuration")?;
    for action in &scenario.actions {
        match action {
            TestAction::DropNextSend { seq } => sim.script_drop(*seq),
        }
    }

    let report = sim
        .run()
        .await
        .with_context(|| format!("scenario '{}' did not converge", scenario.name))?;

    check_assertions(&scenario.assertions, &report)?;
    info!("Scenario passed: {}", scenario.name);
    Ok(report)
}

fn check_assertions(assertions: &[TestAssertion], report: &SimulationReport) -> anyhow::Result<()> {
    for assertion in assertions {
        match assertion {
            TestAssertion::Completed => {
                let completed = matches!(report.events.last(), Some(TraceEvent::Completed { .. }));
                if !completed {
                    return Err(anyhow!("Assertion failed: run did not complete"));
                }
            }
            TestAssertion::TotalSends { min, max } => {
                if report.total_sends < *min {
                    return Err(anyhow!(
                        "Assertion failed: {} sends, expected min {}",
                        report.total_sends,
                        min
                    ));
                }
                if let Some(max) = max
                    && report.total_sends > *max
                {
                    return Err(anyhow!(
                        "Assertion failed: {} sends, expected max {}",
                        report.total_sends,
                        max
                    ));
                }
            }
            TestAssertion::RetransmissionsFor { seq, count } => {
                let observed = report.retransmissions_for(*seq);
                if observed != *count {
                    return Err(anyhow!(
                        "Assertion failed: frame {} retransmitted {} times, expected {}",
                        seq,
                        observed,
                        count
                    ));
                }
            }
            TestAssertion::MaxElapsedMs { ms } => {
                if report.elapsed_ms > *ms {
                    return Err(anyhow!(
                        "Assertion failed: run took {} ms, expected at most {}",
                        report.elapsed_ms,
                        ms
                    ));
                }
            }
        }
    }
    Ok(())
}
