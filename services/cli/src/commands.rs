use std::path::PathBuf;
use std::sync::Arc;

use attachment_scoring::config::AppConfig;
use attachment_scoring::error::AppError;
use attachment_scoring::scoring::{AnswerSet, Score, TOTAL_QUESTIONS};
use attachment_scoring::submissions::{
    answer_lines, format_datetime_jst, ResultView, SubmissionPayload, SubmissionRecord,
    SubmissionService,
};
use clap::Args;
use serde_json::{Map, Value};
use tracing::info;

use crate::infra::{load_rule_table, read_json_file, InMemorySubmissionRepository};

const DEFAULT_RESPONDENT: &str = "cli";

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Rule table to validate (defaults to APP_RULES_PATH or the bundled table)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding either an answer object or a full `{name, answers}` payload
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Respondent name; overrides the name inside the payload
    #[arg(long)]
    pub(crate) name: Option<String>,
    /// Rule table to score against (defaults to APP_RULES_PATH or the bundled table)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Print the stored record as JSON instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Score map, e.g. '{"scA":3,"scB":5,"scC":1,"scD":0}'
    #[arg(long)]
    pub(crate) score: String,
}

pub(crate) fn run_validate_rules(config: &AppConfig, args: ValidateArgs) -> Result<(), AppError> {
    let table = load_rule_table(config, args.rules)?;
    println!("Rule table OK: {} questions covered", table.len());
    Ok(())
}

pub(crate) fn run_score(config: &AppConfig, args: ScoreArgs) -> Result<(), AppError> {
    let rules = load_rule_table(config, args.rules)?;
    let raw = read_json_file(&args.answers)?;
    let payload = payload_from_json(raw, args.name);

    let repository = Arc::new(InMemorySubmissionRepository::default());
    let service = SubmissionService::new(rules, repository);
    let record = service.submit(payload)?;
    info!(id = %record.id, "scored answer file");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        render_record(&record, config.scoring.secondary_threshold);
    }
    Ok(())
}

pub(crate) fn run_rank(config: &AppConfig, args: RankArgs) -> Result<(), AppError> {
    let score = parse_score(&args.score)?;
    let view = ResultView::build(&score, config.scoring.secondary_threshold);
    render_result(&view);
    Ok(())
}

/// All four storage keys are required; anything else is an error rather than a zero.
fn parse_score(raw: &str) -> Result<Score, AppError> {
    Ok(serde_json::from_str(raw)?)
}

/// Accepts a bare answer object or a `{name, answers}` payload.
fn payload_from_json(raw: Value, name: Option<String>) -> SubmissionPayload {
    let (embedded_name, answers) = match raw {
        Value::Object(mut object) => match object.remove("answers") {
            Some(Value::Object(answers)) => {
                let embedded = object
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                (embedded, answers)
            }
            Some(_) => (None, Map::new()),
            None => (None, object),
        },
        _ => (None, Map::new()),
    };

    SubmissionPayload {
        name: name
            .or(embedded_name)
            .unwrap_or_else(|| DEFAULT_RESPONDENT.to_string()),
        answers,
    }
}

fn render_record(record: &SubmissionRecord, secondary_threshold: f64) {
    println!("Result for {}", record.name);
    println!(
        "Viewed: {} (period: {})",
        format_datetime_jst(record.viewed_at),
        record.viewed_period.label()
    );
    println!("Submission id: {}", record.id);

    let view = ResultView::build(&record.score, secondary_threshold);
    render_result(&view);
    render_answers(&record.answers);
}

fn render_result(view: &ResultView) {
    println!("\nPrimary trait: {}", view.primary.label);
    println!("  {}", view.primary.commentary);

    if let Some(secondary) = &view.secondary {
        println!(
            "Secondary trait: {} ({} points)",
            secondary.label, secondary.score
        );
        println!("  {}", secondary.commentary);
    }

    println!("\n{}", view.unresolved_advice);

    println!("\nScores");
    for row in &view.rows {
        let marker = if row.highlighted { "*" } else { " " };
        println!(
            "{} {} | {} | {}",
            marker, row.label, row.score, row.strength_label
        );
    }
}

fn render_answers(answers: &AnswerSet) {
    println!("\nAnswers ({}/{})", answers.len(), TOTAL_QUESTIONS);
    for line in answer_lines(answers) {
        println!("- {}", line.display);
    }
}
