//! Command-line interface for oms-auth.
//!
//! Uses lexopt for minimal binary size overhead (~34KB). Each page of the
//! application is a subcommand; form fields are flags.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::validation::{LoginForm, SignupForm};

/// Subcommand to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Show the home page, or point at `login` when signed out.
    #[default]
    Status,
    Login,
    Signup,
    Logout,
}

impl FromStr for Command {
    type Err = ArgsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "status" | "home" => Ok(Command::Status),
            "login" => Ok(Command::Login),
            "signup" => Ok(Command::Signup),
            "logout" => Ok(Command::Logout),
            other => Err(ArgsError::UnknownCommand(other.to_string())),
        }
    }
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Subcommand.
    pub command: Command,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// API base URL (overrides config file).
    pub api_url: Option<String>,
    /// Directory holding the persisted session (overrides config file).
    pub state_dir: Option<PathBuf>,
    /// Device token sent with login/signup (overrides config file).
    pub device_token: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub type_code: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Args {
    /// Login form from the given flags; missing fields are empty.
    pub fn login_form(&self) -> LoginForm {
        LoginForm::new(
            self.email.clone().unwrap_or_default(),
            self.password.clone().unwrap_or_default(),
        )
    }

    /// Signup form from the given flags; missing fields are empty.
    pub fn signup_form(&self) -> SignupForm {
        SignupForm {
            name: self.name.clone().unwrap_or_default(),
            company: self.company.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            phone: self.phone.clone().unwrap_or_default(),
            type_code: self.type_code.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            confirm_password: self.confirm_password.clone().unwrap_or_default(),
        }
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut command_seen = false;
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('u') | Long("api-url") => {
                let value: String = parser.value()?.parse()?;
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(ArgsError::InvalidValue("api-url", value));
                }
                result.api_url = Some(value);
            }
            Short('s') | Long("state-dir") => {
                result.state_dir = Some(parser.value()?.parse()?);
            }
            Long("device-token") => {
                result.device_token = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Short('e') | Long("email") => {
                result.email = Some(parser.value()?.parse()?);
            }
            Short('p') | Long("password") => {
                result.password = Some(parser.value()?.parse()?);
            }
            Long("confirm-password") => {
                result.confirm_password = Some(parser.value()?.parse()?);
            }
            Short('n') | Long("name") => {
                result.name = Some(parser.value()?.parse()?);
            }
            Long("company") => {
                result.company = Some(parser.value()?.parse()?);
            }
            Long("phone") => {
                result.phone = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("type") => {
                result.type_code = Some(parser.value()?.parse()?);
            }
            Value(val) if !command_seen => {
                result.command = val.string()?.parse()?;
                command_seen = true;
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"oms-auth {version}
Sign in to the OMS API and keep the session on disk

USAGE:
    oms-auth [OPTIONS] [COMMAND]

COMMANDS:
    status      Show who is logged in (default)
    login       Log in with --email and --password
    signup      Create an account
    logout      Forget the stored session

OPTIONS:
    -c, --config <FILE>       Path to configuration file (JSON)
    -u, --api-url <URL>       API base URL [default: https://oms.wilerhub.com/api]
    -s, --state-dir <DIR>     Directory holding the persisted session
        --device-token <TOK>  Device token sent with requests [default: 1234]
    -l, --log-level <LVL>     Log level (error, warn, info, debug, trace)
    -h, --help                Print help
    -V, --version             Print version

FORM FIELDS:
    -e, --email <EMAIL>
    -p, --password <PASSWORD>
        --confirm-password <PASSWORD>   (signup)
    -n, --name <NAME>                   (signup)
        --company <NAME>                (signup)
        --phone <DIGITS>                (signup, 10 digits)
    -t, --type <CODE>                   (signup, 6 digits)

ENVIRONMENT VARIABLES:
    OMS_AUTH_API_URL        API base URL (overrides config)
    OMS_AUTH_STATE_DIR      Session directory (overrides config)
    OMS_AUTH_DEVICE_TOKEN   Device token (overrides config)
    OMS_AUTH_LOG_LEVEL      Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Log in and keep the session
    oms-auth login -e john@example.com -p secret1

    # Who am I?
    oms-auth

    # Register, then log in
    oms-auth signup -n "John Doe" --company "Acme Corp" -e john@example.com \
        --phone 4156454445 -t 123456 -p password1 --confirm-password password1
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("oms-auth {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unknown subcommand.
    UnknownCommand(String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnknownCommand(cmd) => write!(f, "unknown command: '{}'", cmd),
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
