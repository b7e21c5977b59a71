use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod cache;
mod controllers;
mod errors;
mod http;
mod utils;

///     ____       __             ____           __
///    / __ \___  / /__________  /  _/___  _____/ /_____ _
///   / /_/ / _ \/ __/ ___/ __ \ / // __ \/ ___/ __/ __ `/
///  / _, _/  __/ /_/ /  / /_/ // // / / (__  ) /_/ /_/ /
/// /_/ |_|\___/\__/_/   \____/___/_/ /_/____/\__/\__,_/
///
#[derive(Parser)]
#[command(author, version, about, long_about = None, verbatim_doc_comment)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(verbatim_doc_comment)]
enum Commands {
    /// Test the connection to the RetroInsta server
    /// usage: `retroinsta health`
    #[command(verbatim_doc_comment)]
    Health,
    /// Show the server address and its Google client id
    /// usage: `retroinsta config`
    #[command(verbatim_doc_comment)]
    Config,
    /// Log in with a Google ID token and persist the session
    /// usage: `retroinsta login --id-token <token>`
    #[command(verbatim_doc_comment)]
    Login(LoginArgs),
    /// Drop the persisted session
    /// usage: `retroinsta logout`
    #[command(verbatim_doc_comment)]
    Logout,
    /// Print the logged-in user
    /// usage: `retroinsta whoami`
    #[command(verbatim_doc_comment)]
    Whoami,
    /// Browse the global feed, newest first
    /// usage: `retroinsta explore [--top <n>]`
    #[command(verbatim_doc_comment)]
    Explore(ExploreArgs),
    /// Browse your personal feed (you + people you follow)
    /// usage: `retroinsta home`
    #[command(verbatim_doc_comment)]
    Home,
    /// Show a user's profile and posts
    /// usage: `retroinsta profile [user-id]`
    #[command(verbatim_doc_comment)]
    Profile(ProfileArgs),
    /// Create a post, optionally with an image
    /// usage: `retroinsta post [--image <path>] [--description <text>]`
    #[command(verbatim_doc_comment)]
    Post(PostArgs),
    /// Like or unlike a post
    /// usage: `retroinsta like <post-id>`
    #[command(verbatim_doc_comment)]
    Like(LikeArgs),
    /// Follow or unfollow a user
    /// usage: `retroinsta follow <user-id>`
    #[command(verbatim_doc_comment)]
    Follow(FollowArgs),
    /// List the users you follow
    /// usage: `retroinsta following`
    #[command(verbatim_doc_comment)]
    Following,
    /// Replace your profile bio
    /// usage: `retroinsta set-bio "<text>"`
    #[command(verbatim_doc_comment)]
    SetBio(SetBioArgs),
}

#[derive(Args)]
struct LoginArgs {
    #[arg(long)]
    id_token: String,
}

#[derive(Args)]
struct ExploreArgs {
    /// Re-rank by like count and show only the top n posts
    #[arg(long)]
    top: Option<usize>,
}

#[derive(Args)]
struct ProfileArgs {
    user_id: Option<String>,
}

#[derive(Args)]
struct PostArgs {
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
struct LikeArgs {
    post_id: String,
}

#[derive(Args)]
struct FollowArgs {
    user_id: String,
}

#[derive(Args)]
struct SetBioArgs {
    bio: String,
}

/**
 * CLI for RetroInsta
 */
#[tokio::main]
pub async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Health => controllers::health().await,
        Commands::Config => controllers::config().await,
        Commands::Login(cmd) => controllers::login(cmd.id_token).await,
        Commands::Logout => controllers::logout().await,
        Commands::Whoami => controllers::whoami().await,
        Commands::Explore(cmd) => controllers::explore(cmd.top).await,
        Commands::Home => controllers::home().await,
        Commands::Profile(cmd) => controllers::profile(cmd.user_id).await,
        Commands::Post(cmd) => controllers::create_post(cmd.image, cmd.description).await,
        Commands::Like(cmd) => controllers::like(cmd.post_id).await,
        Commands::Follow(cmd) => controllers::follow(cmd.user_id).await,
        Commands::Following => controllers::following().await,
        Commands::SetBio(cmd) => controllers::set_bio(cmd.bio).await,
    };

    match result {
        Ok(message) => {
            println!("{}", message);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
}
