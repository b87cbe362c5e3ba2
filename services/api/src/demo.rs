use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use credit_desk::applications::{ApplicationRequest, RuleCatalog, ScoringRule, ScoringRun};
use credit_desk::clients::{ClientView, NewClient};
use credit_desk::clock::SystemClock;
use credit_desk::config::ScoringSettings;
use credit_desk::error::AppError;
use rust_decimal::Decimal;

use crate::infra::{load_catalog, parse_amount, Desk};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Requested amount for the demo application.
    #[arg(long, value_parser = parse_amount, default_value = "550000")]
    pub(crate) amount: Decimal,
    /// Document number used to register the demo client.
    #[arg(long, default_value = "4510123456")]
    pub(crate) document: String,
    /// CSV rule table to score with instead of the demo rules.
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Fail when a rule condition is not recognized.
    #[arg(long)]
    pub(crate) strict_rules: bool,
    /// Submit and score a second application to show the repeat-credit rules.
    #[arg(long)]
    pub(crate) repeat: bool,
}

/// Large-amount bonus plus a first-credit bonus.
fn demo_rules() -> RuleCatalog {
    RuleCatalog::new(vec![
        ScoringRule::new("demo-1", "Large loan", "Amount > 500000", 50),
        ScoringRule::new("demo-2", "New borrower", "First credit", 20),
        ScoringRule::new("demo-3", "Returning borrower", "Second or later credit", -10),
    ])
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        amount,
        document,
        rules,
        strict_rules,
        repeat,
    } = args;

    let settings = ScoringSettings {
        strict_rules,
        rules_path: rules,
    };
    let catalog = if settings.rules_path.is_some() {
        load_catalog(&settings)?
    } else {
        demo_rules()
    };
    let desk = Desk::new(catalog, &settings, Arc::new(SystemClock));

    println!("Credit desk demo");
    let client = desk.clients.register(NewClient {
        document_number: document.clone(),
        first_name: "Anna".to_string(),
        last_name: "Ivanova".to_string(),
        phone_number: None,
        email: None,
    })?;
    let view = ClientView::from(&client);
    println!(
        "Registered client {} ({} {}, document {})",
        view.id, view.first_name, view.last_name, view.document_number
    );

    let rounds = if repeat { 2 } else { 1 };
    for _ in 0..rounds {
        let application = desk.applications.submit(ApplicationRequest {
            document_number: document.clone(),
            amount,
        })?;
        println!("\nSubmitted {} for {}", application.id, application.amount);

        let run = desk.applications.run_scoring(&application.id)?;
        render_run(&run);
    }

    let statistics = desk.applications.statistics()?;
    println!("\n{}", statistics.summary());
    Ok(())
}

fn render_run(run: &ScoringRun) {
    println!("Rule contributions:");
    for component in &run.score_card.components {
        let condition = component
            .condition
            .map(|condition| condition.label())
            .unwrap_or("unrecognized");
        let marker = if component.matched { "+" } else { " " };
        println!(
            "  {marker} {:<20} [{condition}] {} pts",
            component.rule_name, component.points
        );
    }
    println!(
        "Raw total {} -> score {} -> {}",
        run.score_card.raw_total, run.score_card.score, run.application.status
    );
    println!("Decision: {}", run.application.decision_rationale());
    if let Some(decided_at) = run.application.decided_at {
        println!("Decided at {}", decided_at.to_rfc3339());
    }
}
