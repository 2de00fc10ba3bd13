use campus_core::Role;
use clap::{Args, Subcommand};

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Sign in with email and password.
    Login(AuthLoginArgs),
    /// Register a new account.
    Signup(AuthSignupArgs),
    /// Clear the stored session and sign out remotely.
    Logout,
    /// Show current session and profile state.
    Status,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Clone, Debug, Args)]
pub struct AuthSignupArgs {
    #[arg(long)]
    pub email: String,
    /// At least 6 characters.
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub confirm_password: String,
    /// Must be unused by any other profile.
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub full_name: String,
    /// student, lecturer, or admin.
    #[arg(long, default_value = "student")]
    pub role: Role,
}
