//! oms-auth binary entry point.

use std::process::ExitCode;

use oms_auth::app::{self, Page};
use oms_auth::cli::{self, Args, Command};
use oms_auth::config::Config;
use oms_auth::{flow, logging, AuthClient, AuthError, FileStorage, PersistentStore};
use tracing::{debug, error};

type Store = PersistentStore<FileStorage>;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Run 'oms-auth --help' for usage.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    logging::init(config.log_filter());
    debug!("oms-auth v{}", env!("CARGO_PKG_VERSION"));

    let state_dir = config.state_dir();
    debug!("session directory: {}", state_dir.display());
    let store = PersistentStore::open(FileStorage::new(state_dir));

    match args.command {
        Command::Status => status(&store),
        Command::Logout => {
            store.logout();
            println!("Logged out.");
            ExitCode::SUCCESS
        }
        Command::Login => login(&store, &config, &args).await,
        Command::Signup => signup(&store, &config, &args).await,
    }
}

/// Render the home page, or the redirect target when signed out.
fn status(store: &Store) -> ExitCode {
    let session = store.snapshot();
    match app::resolve(Page::Home, &session) {
        Page::Home => {
            println!("{}", app::greeting(&session));
            ExitCode::SUCCESS
        }
        page => {
            println!("Not logged in. Run 'oms-auth login' ({page}).");
            ExitCode::from(1)
        }
    }
}

fn build_client(config: &Config) -> Option<AuthClient> {
    match AuthClient::new(config.to_api_config()) {
        Ok(client) => Some(client),
        Err(e) => {
            error!("failed to build HTTP client: {e}");
            eprintln!("error: {e}");
            None
        }
    }
}

fn print_validation(err: &AuthError) {
    if let AuthError::Validation(v) = err {
        for field in &v.errors {
            eprintln!("  {}: {}", field.field, field.message);
        }
    }
}

async fn login(store: &Store, config: &Config, args: &Args) -> ExitCode {
    let Some(client) = build_client(config) else {
        return ExitCode::from(1);
    };

    let form = args.login_form();
    match flow::login(store, &client, &form, &config.api.device_token).await {
        Ok(session) => {
            println!("{}", app::greeting(&session));
            ExitCode::SUCCESS
        }
        Err(e @ AuthError::Validation(_)) => {
            eprintln!("Login form is incomplete:");
            print_validation(&e);
            ExitCode::from(2)
        }
        Err(e) => {
            let message = store.snapshot().error.unwrap_or_else(|| e.user_message());
            eprintln!("Login Failed: {message}");
            ExitCode::from(1)
        }
    }
}

async fn signup(store: &Store, config: &Config, args: &Args) -> ExitCode {
    let Some(client) = build_client(config) else {
        return ExitCode::from(1);
    };

    let form = args.signup_form();
    match flow::signup(store, &client, &form, &config.api.device_token).await {
        Ok(()) => {
            println!("Account Created Successfully!");
            println!("Your account has been created. You can now login with your credentials.");
            println!("Next: oms-auth login -e {}", form.email);
            ExitCode::SUCCESS
        }
        Err(e @ AuthError::Validation(_)) => {
            eprintln!("Signup form is incomplete:");
            print_validation(&e);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Signup Failed: {}", e.user_message());
            ExitCode::from(1)
        }
    }
}
