use crate::commands::{run_rank, run_score, run_validate_rules, RankArgs, ScoreArgs, ValidateArgs};
use attachment_scoring::config::AppConfig;
use attachment_scoring::error::AppError;
use attachment_scoring::telemetry;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "attachment-score",
    about = "Score attachment-style questionnaire answers from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rule table maintenance
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
    /// Score an answer file and print the result
    Score(ScoreArgs),
    /// Rank an already computed score map
    Rank(RankArgs),
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Load and validate a rule table without scoring anything
    Validate(ValidateArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Rules {
            command: RulesCommand::Validate(args),
        } => run_validate_rules(&config, args),
        Command::Score(args) => run_score(&config, args),
        Command::Rank(args) => run_rank(&config, args),
    }
}
