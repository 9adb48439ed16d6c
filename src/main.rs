mod auth;
mod cli;
mod client;
mod commands;
mod config;
mod error;
mod output;
mod responses;
mod types;

use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use cli::{
    AuthCommands, Cli, Commands, CycleCommands, DocumentCommands, FavoriteCommands,
    InitiativeCommands, IssueCommands, LabelCommands, NotificationCommands, ProjectCommands,
    TeamCommands, UserCommands,
};
use client::LinearClient;
use config::Config;
use error::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");

        // Show the error chain if the verbose flag was passed
        if std::env::args().any(|arg| arg == "--verbose" || arg == "-v") {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

fn authenticated_client() -> Result<LinearClient> {
    LinearClient::new(auth::resolve_header_value()?)
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set global output format
    output::set_format(cli.output_format());
    output::set_quiet(cli.quiet);

    match cli.command {
        // Commands that don't require credentials
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "linctl", &mut io::stdout());
        }
        Commands::Auth { action } => match action {
            AuthCommands::Login(args) => {
                commands::auth::login(args).await?;
            }
            AuthCommands::Logout => {
                commands::auth::logout().await?;
            }
            AuthCommands::Status => {
                commands::auth::status(&authenticated_client()?).await?;
            }
            AuthCommands::RateLimit => {
                commands::auth::rate_limit(&authenticated_client()?).await?;
            }
        },
        // Everything else needs config and an authenticated client
        command => {
            let config = Config::load()?;
            let client = authenticated_client()?;

            match command {
                Commands::Issues(args) => {
                    commands::issues::list(&client, &config, args).await?;
                }
                Commands::Issue { action } => match action {
                    IssueCommands::List(args) => {
                        commands::issues::list(&client, &config, args).await?;
                    }
                    IssueCommands::View { id } => {
                        commands::issues::view(&client, &id).await?;
                    }
                    IssueCommands::Create(args) => {
                        commands::issues::create(&client, &config, args).await?;
                    }
                    IssueCommands::Update(args) => {
                        commands::issues::update(&client, args).await?;
                    }
                    IssueCommands::Close { id } => {
                        commands::issues::close(&client, &id).await?;
                    }
                    IssueCommands::Archive { id } => {
                        commands::issues::archive(&client, &id).await?;
                    }
                    IssueCommands::Delete { id } => {
                        commands::issues::delete(&client, &id).await?;
                    }
                    IssueCommands::Comments { id } => {
                        commands::comments::list(&client, &id).await?;
                    }
                    IssueCommands::Comment(args) => {
                        commands::comments::add(&client, args).await?;
                    }
                    IssueCommands::Attachments { id } => {
                        commands::attachments::list(&client, &id).await?;
                    }
                    IssueCommands::Attach(args) => {
                        commands::attachments::attach(&client, args).await?;
                    }
                    IssueCommands::Detach { id, url } => {
                        commands::attachments::detach(&client, &id, &url).await?;
                    }
                    IssueCommands::Favorite { id } => {
                        commands::favorites::add_issue(&client, &id).await?;
                    }
                },
                Commands::Teams => {
                    commands::teams::list(&client).await?;
                }
                Commands::Team { action } => match action {
                    TeamCommands::List => {
                        commands::teams::list(&client).await?;
                    }
                    TeamCommands::View { key } => {
                        commands::teams::view(&client, &key).await?;
                    }
                },
                Commands::Users => {
                    commands::users::list(&client).await?;
                }
                Commands::User { action } => match action {
                    UserCommands::Me => {
                        commands::users::me(&client).await?;
                    }
                    UserCommands::List => {
                        commands::users::list(&client).await?;
                    }
                    UserCommands::View { id } => {
                        commands::users::view(&client, &id).await?;
                    }
                },
                Commands::Projects { team } => {
                    commands::projects::list(&client, &config, team).await?;
                }
                Commands::Project { action } => match action {
                    ProjectCommands::List { team } => {
                        commands::projects::list(&client, &config, team).await?;
                    }
                    ProjectCommands::View { id } => {
                        commands::projects::view(&client, &id).await?;
                    }
                    ProjectCommands::Create(args) => {
                        commands::projects::create(&client, &config, args).await?;
                    }
                    ProjectCommands::Update(args) => {
                        commands::projects::update(&client, args).await?;
                    }
                    ProjectCommands::Milestones { id } => {
                        commands::projects::milestones(&client, &id).await?;
                    }
                    ProjectCommands::AddMilestone(args) => {
                        commands::projects::add_milestone(&client, args).await?;
                    }
                },
                Commands::Cycles(args) => {
                    commands::cycles::list(&client, &config, args).await?;
                }
                Commands::Cycle { action } => match action {
                    CycleCommands::List(args) => {
                        commands::cycles::list(&client, &config, args).await?;
                    }
                    CycleCommands::View { id } => {
                        commands::cycles::view(&client, &id).await?;
                    }
                },
                Commands::Labels { team } => {
                    commands::labels::list(&client, &config, team).await?;
                }
                Commands::Label { action } => match action {
                    LabelCommands::List { team } => {
                        commands::labels::list(&client, &config, team).await?;
                    }
                    LabelCommands::Create(args) => {
                        commands::labels::create(&client, &config, args).await?;
                    }
                },
                Commands::Docs { project } => {
                    commands::documents::list(&client, project).await?;
                }
                Commands::Document { action } => match action {
                    DocumentCommands::List { project } => {
                        commands::documents::list(&client, project).await?;
                    }
                    DocumentCommands::View { id } => {
                        commands::documents::view(&client, &id).await?;
                    }
                    DocumentCommands::Create(args) => {
                        commands::documents::create(&client, args).await?;
                    }
                },
                Commands::Initiative { action } => match action {
                    InitiativeCommands::List => {
                        commands::initiatives::list(&client).await?;
                    }
                    InitiativeCommands::View { id } => {
                        commands::initiatives::view(&client, &id).await?;
                    }
                },
                Commands::Views => {
                    commands::views::list(&client).await?;
                }
                Commands::Favorites => {
                    commands::favorites::list(&client).await?;
                }
                Commands::Favorite { action } => match action {
                    FavoriteCommands::List => {
                        commands::favorites::list(&client).await?;
                    }
                    FavoriteCommands::Remove { issue } => {
                        commands::favorites::remove(&client, &issue).await?;
                    }
                },
                Commands::Notifications => {
                    commands::notifications::list(&client, false).await?;
                }
                Commands::Notification { action } => match action {
                    NotificationCommands::List { all } => {
                        commands::notifications::list(&client, all).await?;
                    }
                    NotificationCommands::Read { id } => {
                        commands::notifications::read(&client, &id).await?;
                    }
                    NotificationCommands::ReadAll => {
                        commands::notifications::read_all(&client).await?;
                    }
                },
                Commands::Completions { .. } | Commands::Auth { .. } => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
