//! parley - terminal chat client
//!
//! # Examples
//!
//! ```bash
//! # Sign in with an emailed code
//! parley send-otp ana@example.com
//! parley verify-otp ana@example.com 123456
//!
//! # Chat
//! parley chat "explain rust lifetimes"
//! parley chat --attach notes.py "what does this do?"
//! ```

mod cli;
mod commands;

use crate::{cli::Cli, commands::Commands};

use parley_client::{
    ChatSession, Client, ClientError, ClientResult, StateFile, StreamOutcome, TerminalView,
    compose_message,
};
use parley_core::SystemClock;
use parley_core::api::RegisterRequest;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let store = match &cli.state_dir {
        Some(dir) => StateFile::in_dir(dir),
        None => StateFile::default_location(),
    };

    match run(cli.command, cli.server, store).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{e}");
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, server: Option<String>, store: StateFile) -> ClientResult<()> {
    match command {
        Commands::SendOtp { email } => {
            let client = connect(server);
            let response = client.send_otp(&email).await?;
            println!(
                "{} (valid for {} minutes)",
                response.message,
                response.expires_in / 60
            );
        }

        Commands::VerifyOtp {
            email,
            code,
            username,
        } => {
            let client = connect(server);
            let response = client.verify_otp(&email, &code, username.as_deref()).await?;

            let mut state = store.load()?;
            state.sign_in(response.session_token, response.email.clone(), None);
            state.user_id = response.user_id.or(state.user_id);
            state.user_name = response.username.or(username).or(state.user_name);
            state.display_name = response.display_name.or(state.display_name);
            state.profile_photo = response.profile_photo.or(state.profile_photo);
            store.save(&state)?;

            println!("Signed in as {}", response.email);
        }

        Commands::Register {
            username,
            email,
            password,
            display_name,
            profile_photo,
        } => {
            let client = connect(server);
            let request = RegisterRequest {
                username,
                email,
                password,
                display_name,
                profile_photo,
            };
            let response = client.register(&request).await?;
            println!(
                "Registered {}. Check your email, then run: parley verify-otp {} <code>",
                response.email, response.email
            );
        }

        Commands::Login { email, password } => {
            let client = connect(server);
            let response = client.login(&email, &password).await?;

            let mut state = store.load()?;
            let name = response.user.display_name.clone();
            state.sign_in(response.session_token, response.user.email.clone(), Some(response.user));
            store.save(&state)?;

            println!("Welcome back, {name}");
        }

        Commands::Logout => {
            let mut state = store.load()?;
            state.sign_out();
            store.save(&state)?;
            println!("Signed out");
        }

        Commands::Chat { message, attach } => {
            let attachment = match &attach {
                Some(path) => {
                    let content = std::fs::read_to_string(path)
                        .map_err(|e| ClientError::state(path, e))?;
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    Some((name, content))
                }
                None => None,
            };
            let message = compose_message(
                &message.join(" "),
                attachment.as_ref().map(|(n, c)| (n.as_str(), c.as_str())),
            );

            let state = store.load()?;
            if !state.is_signed_in() {
                return Err(ClientError::not_signed_in());
            }

            let session = ChatSession::new(connect(server), store, state, Arc::new(SystemClock));
            let mut view = TerminalView::new(io::stdout());
            let outcome = session.send(&message, &mut view).await?;
            match outcome {
                StreamOutcome::Committed(_) => {}
                StreamOutcome::Empty => println!("(no reply)"),
                StreamOutcome::Failed(_) => return Err(ClientError::input("The reply failed")),
            }
        }

        Commands::NewChat => {
            let mut state = store.load()?;
            state.start_new_chat();
            store.save(&state)?;
            println!("The next message starts a new conversation");
        }

        Commands::History => {
            let state = store.load()?;
            TerminalView::new(io::stdout()).print_history(&state.history());
        }

        Commands::Open { id } => {
            let mut state = store.load()?;
            let turns = state.open(&id)?.to_vec();
            store.save(&state)?;

            let mut view = TerminalView::new(io::stdout().lock());
            for turn in &turns {
                view.print_turn(turn);
            }
        }
    }

    Ok(())
}

fn connect(server: Option<String>) -> Client {
    let url = match server {
        Some(url) => url,
        None => discover_server_url(),
    };
    Client::new(&url)
}

/// Discover the server URL from the port discovery file.
///
/// parley-server writes `server.json` after binding, containing the PID,
/// port and host. Exits with guidance when no live server is found.
fn discover_server_url() -> String {
    let port_path = || {
        parley_config::PortFileInfo::path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| ".parley/server.json".to_string())
    };

    match parley_config::PortFileInfo::read_live() {
        Ok(Some(info)) => info.url(),
        Ok(None) => {
            eprintln!("Error: No running parley-server found.");
            eprintln!();
            eprintln!("Checked: {}", port_path());
            eprintln!();
            eprintln!("Start the server first:");
            eprintln!("  cargo run -p parley-server");
            eprintln!();
            eprintln!("Or specify a server URL explicitly:");
            eprintln!("  parley --server http://127.0.0.1:3000 <command>");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error reading port file ({}): {}", port_path(), e);
            eprintln!();
            eprintln!("Specify a server URL explicitly:");
            eprintln!("  parley --server http://127.0.0.1:3000 <command>");
            std::process::exit(1);
        }
    }
}
