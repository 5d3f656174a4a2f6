use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;
use uuid::Uuid;

use onboard_client::{HttpBackend, TokenFile, render};
use onboard_core::{
    AssignmentEditor, Backend, OnboardingError, Transition, Wizard, WizardStep, registry,
};
use onboard_types::models::{ComponentId, Page};

#[derive(Debug, Parser)]
#[command(name = "onboard", about = "terminal client for the onboarding service")]
struct Cli {
    /// base url of the onboarding server
    #[arg(long, env = "ONBOARD_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// file holding the resume token between runs
    #[arg(long, env = "ONBOARD_TOKEN_FILE", default_value = ".onboard-token")]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// runs or resumes the onboarding wizard
    Wizard,

    /// edits which components appear on page 2 and page 3
    #[command(subcommand)]
    Admin(AdminCommand),

    /// lists every user with their progress
    Users,

    /// deletes a user record
    Delete {
        /// id of the user to delete
        id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    /// shows the active assignment
    Show,

    /// moves a component between pages and saves
    Move {
        component: ComponentId,

        #[arg(long, value_parser = parse_page)]
        from: Page,

        #[arg(long, value_parser = parse_page)]
        to: Page,
    },

    /// adds an unassigned component to a page and saves
    Add {
        component: ComponentId,

        #[arg(long, value_parser = parse_page)]
        page: Page,
    },
}

fn parse_page(raw: &str) -> Result<Page, String> {
    let number: u8 = raw
        .parse()
        .map_err(|_| format!("page must be 2 or 3, got {}", raw))?;
    Page::try_from(number)
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "onboard_client=info,onboard_core=info".into()),
        )
        .init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let backend = HttpBackend::new(cli.server);
    let tokens = TokenFile::new(cli.token_file);

    match cli.command {
        Command::Wizard => run_wizard(backend, &tokens).await,
        Command::Admin(command) => run_admin(&backend, command).await,
        Command::Users => {
            let users = backend.list_users().await?;
            if users.is_empty() {
                println!("no users yet");
            }
            for user in &users {
                println!("{}", render::user_row(user));
            }
            Ok(())
        }
        Command::Delete { id } => {
            backend.delete_user(id).await?;
            println!("deleted {}", id);
            Ok(())
        }
    }
}

async fn run_admin(backend: &HttpBackend, command: AdminCommand) -> Result<()> {
    let config = backend.get_config().await?;
    let mut editor = AssignmentEditor::from_config(&config);

    match command {
        AdminCommand::Show => {}
        AdminCommand::Move { component, from, to } => {
            editor.move_component(component, from, to)?;
            editor.save(backend).await?;
        }
        AdminCommand::Add { component, page } => {
            editor.add_component(component, page)?;
            editor.save(backend).await?;
        }
    }

    for page in Page::ALL {
        let labels: Vec<&str> = editor
            .components(page)
            .iter()
            .map(|c| registry::lookup(*c).label)
            .collect();
        println!("{}: {}", page, labels.join(", "));
    }
    println!();
    for (component, placement) in editor.availability() {
        println!(
            "  {:<10} {}",
            component.as_str(),
            render::availability(placement)
        );
    }
    Ok(())
}

type Input = Lines<BufReader<Stdin>>;

async fn run_wizard(backend: HttpBackend, tokens: &TokenFile) -> Result<()> {
    let saved = tokens.load()?;
    let mut wizard = Wizard::start(backend, saved).await?;
    if saved.is_some() && wizard.token().is_none() {
        tokens.clear()?;
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!();
        println!("{}", render::progress(wizard.step()));

        if !fill_step(&mut wizard, &mut input).await? {
            // Closed input; the token stays on disk for the next run
            debug!("Input closed at step {}", wizard.step().number());
            return Ok(());
        }

        match wizard.submit().await {
            Ok(Transition::Advanced(step)) => {
                if let Some(id) = wizard.token() {
                    tokens.store(id)?;
                }
                debug!("Advanced to step {}", step.number());
            }
            Ok(Transition::Completed(user)) => {
                tokens.clear()?;
                println!();
                println!("Onboarding complete for {}. Thanks!", user.email);
                return Ok(());
            }
            Err(OnboardingError::NotFound) => {
                tokens.clear()?;
                println!("Your saved progress no longer exists, starting over.");
            }
            Err(OnboardingError::StoreUnavailable(e)) => {
                return Err(e).context("the onboarding service is unavailable, please try again");
            }
            Err(_) => {
                println!("Please fix the following:");
                println!("{}", render::field_errors(wizard.errors()));
            }
        }
    }
}

/// Prompts for every field of the current step. False once input is closed.
async fn fill_step(wizard: &mut Wizard<HttpBackend>, input: &mut Input) -> Result<bool> {
    match wizard.step() {
        WizardStep::Step1 => {
            println!("{}", render::step_status(1));
            let email = wizard.form().email.clone();
            let Some(email) = prompt(input, "Email", &email).await? else {
                return Ok(false);
            };
            wizard.set_field("email", email);

            let Some(password) = prompt(input, "Password", "").await? else {
                return Ok(false);
            };
            wizard.set_field("password", password);
        }
        WizardStep::Step2 | WizardStep::Step3 => {
            println!("{}", render::step_status(wizard.step().number()));
            let components = wizard.components().to_vec();
            for component in components {
                let entry = registry::lookup(component);
                println!("-- {} --", entry.label);
                for field in entry.fields {
                    let current = wizard.form().profile(*field).to_string();
                    let Some(value) = prompt(input, render::field_label(*field), &current).await?
                    else {
                        return Ok(false);
                    };
                    wizard.set_field(field.as_str(), value);
                }
            }
        }
        WizardStep::Complete => {}
    }
    Ok(true)
}

/// Reads one line. An empty answer keeps `current`; `None` on end of input.
async fn prompt(input: &mut Input, label: &str, current: &str) -> Result<Option<String>> {
    if current.is_empty() {
        print!("{}: ", label);
    } else {
        print!("{} [{}]: ", label, current);
    }
    std::io::stdout().flush()?;

    let Some(line) = input.next_line().await? else {
        return Ok(None);
    };
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        Ok(Some(current.to_string()))
    } else {
        Ok(Some(line.to_string()))
    }
}
