use clap::{Args, Subcommand};

use crate::cli::subcommands::{AuthCommands, ProfileCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Sign in, sign up, sign out, and inspect the stored session.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Show or edit the signed-in user's profile.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Grade one submission against a rubric.
    Grade(GradeArgs),
    /// Serve the grading endpoint over HTTP.
    Serve(ServeArgs),
}

#[derive(Clone, Debug, Args)]
pub struct GradeArgs {
    /// Grading rubric, embedded verbatim in the prompt.
    #[arg(long)]
    pub rubric: String,
    /// Assignment type (e.g. math, essay).
    #[arg(long)]
    pub assignment_type: String,
    /// Submission text.
    #[arg(long)]
    pub text: Option<String>,
    /// URL of an image of the submission.
    #[arg(long)]
    pub file_url: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides grader.bind).
    #[arg(long)]
    pub bind: Option<String>,
}
