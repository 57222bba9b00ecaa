use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use time::Duration;
use wattpush::config::{
    AppConfig, AuthConfig, DEFAULT_AUTH_COOKIE_NAME, DEFAULT_POLICY_VERSION,
    default_auth_token_ttl,
};
use wattpush::types::session::UserInfo;

#[allow(clippy::large_enum_variant)]
pub(crate) enum RunOutcome {
    Serve { addr: SocketAddr, config: AppConfig },
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    let auth = match resolve_auth_config(&cli) {
        Ok(auth) => auth,
        Err(err) => {
            eprintln!("error: {err}");
            return RunOutcome::Exit(2);
        }
    };

    match cli.command {
        Some(Command::Init(args)) => return RunOutcome::Exit(run_init(args)),
        Some(Command::AuthKey) => return RunOutcome::Exit(run_auth_key()),
        Some(Command::SessionToken(ref args)) => {
            let config = app_config(&cli, auth);
            return RunOutcome::Exit(run_session_token(&config, args));
        }
        None => {}
    }

    RunOutcome::Serve {
        addr: cli.bind,
        config: app_config(&cli, auth),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "wattpush",
    version,
    about = "Web push and notification backend for the energy community app"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[arg(long, env = "WATTPUSH_BIND", default_value = "127.0.0.1:8014")]
    bind: SocketAddr,
    #[arg(long, env = "WATTPUSH_APP_NAME", default_value = "Wattpush")]
    app_name: String,
    #[arg(long, env = "WATTPUSH_POLICY_VERSION", default_value = DEFAULT_POLICY_VERSION)]
    policy_version: String,
    #[arg(long, env = "WATTPUSH_STATE_FILE")]
    state_file: Option<PathBuf>,
    #[arg(long, env = "WATTPUSH_VAPID_PRIVATE_KEY")]
    vapid_private_key: Option<String>,
    #[arg(long, env = "WATTPUSH_VAPID_PUBLIC_KEY")]
    vapid_public_key: Option<String>,
    #[arg(long, env = "WATTPUSH_VAPID_SUBJECT")]
    vapid_subject: Option<String>,
    #[arg(long, env = "WATTPUSH_AUTH_KEY")]
    auth_key: Option<String>,
    #[arg(long, env = "WATTPUSH_AUTH_TOKEN_TTL")]
    auth_token_ttl: Option<String>,
    #[arg(long, env = "WATTPUSH_AUTH_COOKIE_NAME")]
    auth_cookie_name: Option<String>,
    #[arg(long, env = "WATTPUSH_AUTH_COOKIE_SECURE")]
    auth_cookie_secure: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh VAPID keypair.
    Init(InitArgs),
    /// Print a random session signing key.
    AuthKey,
    /// Mint a session cookie for a user id.
    SessionToken(SessionTokenArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    #[arg(long)]
    subject: Option<String>,
}

#[derive(Args, Debug)]
struct SessionTokenArgs {
    #[arg(long)]
    sub: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    name: Option<String>,
}

fn app_config(cli: &Cli, auth: Option<AuthConfig>) -> AppConfig {
    AppConfig {
        app_name: cli.app_name.clone(),
        policy_version: cli.policy_version.trim().to_string(),
        state_file: cli.state_file.clone(),
        vapid_private_key: cli.vapid_private_key.clone(),
        vapid_public_key: cli.vapid_public_key.clone(),
        vapid_subject: cli.vapid_subject.clone(),
        auth,
    }
}

fn run_init(args: InitArgs) -> i32 {
    let credentials = match wattpush::generate_vapid_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("failed to generate VAPID credentials: {err}");
            return 1;
        }
    };
    let (subject, show_subject_note) = match args.subject {
        Some(subject) => (subject, false),
        None => ("mailto:you@example.com".to_string(), true),
    };

    println!("VAPID credentials generated.");
    println!();
    println!("WATTPUSH_VAPID_PRIVATE_KEY=\"{}\"", credentials.private_key);
    println!("WATTPUSH_VAPID_PUBLIC_KEY=\"{}\"", credentials.public_key);
    println!("WATTPUSH_VAPID_SUBJECT=\"{subject}\"");
    if show_subject_note {
        println!();
        println!("Note: replace WATTPUSH_VAPID_SUBJECT with a contact URI you control.");
    }
    0
}

fn run_auth_key() -> i32 {
    let secret = match wattpush::auth::generate_auth_key() {
        Ok(secret) => secret,
        Err(err) => {
            eprintln!("failed to generate auth key: {err}");
            return 1;
        }
    };
    println!("{secret}");
    0
}

fn run_session_token(config: &AppConfig, args: &SessionTokenArgs) -> i32 {
    if config.auth.is_none() {
        eprintln!("error: session-token requires --auth-key");
        return 2;
    }
    let auth = match wattpush::auth::AuthState::from_config(config) {
        Ok(auth) => auth,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };
    let user = UserInfo {
        sub: args.sub.clone(),
        email: args.email.clone(),
        name: args.name.clone(),
    };
    match auth.issue_token(&user) {
        Ok(token) => {
            println!("{}={token}", auth.cookie_name());
            0
        }
        Err(err) => {
            eprintln!("failed to issue session token: {err}");
            1
        }
    }
}

fn resolve_auth_config(cli: &Cli) -> Result<Option<AuthConfig>, String> {
    let has_any = cli.auth_key.is_some()
        || cli.auth_token_ttl.is_some()
        || cli.auth_cookie_name.is_some()
        || cli.auth_cookie_secure;

    if !has_any {
        return Ok(None);
    }

    let auth_key = cli
        .auth_key
        .as_ref()
        .ok_or("auth is configured but --auth-key is missing")?
        .trim();
    if auth_key.is_empty() {
        return Err("auth key cannot be empty".to_string());
    }

    if let Some(name) = cli.auth_cookie_name.as_deref()
        && name.trim().is_empty()
    {
        return Err("auth cookie name cannot be empty".to_string());
    }

    let token_ttl = match cli.auth_token_ttl.as_deref() {
        Some(raw) => parse_auth_token_ttl(raw)?,
        None => default_auth_token_ttl(),
    };
    let cookie_name = cli
        .auth_cookie_name
        .as_deref()
        .map(|name| name.trim().to_string())
        .unwrap_or_else(|| DEFAULT_AUTH_COOKIE_NAME.to_string());

    Ok(Some(AuthConfig {
        key: auth_key.to_string(),
        token_ttl,
        cookie_name,
        cookie_secure: cli.auth_cookie_secure,
    }))
}

fn parse_auth_token_ttl(raw: &str) -> Result<Duration, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("auth token ttl cannot be empty".to_string());
    }

    let (amount, unit) = match value.chars().last() {
        Some(ch) if ch.is_ascii_alphabetic() => {
            (&value[..value.len() - 1], ch.to_ascii_lowercase())
        }
        _ => (value, 's'),
    };

    let amount: i64 = amount
        .parse()
        .map_err(|_| format!("invalid auth token ttl '{value}'; expected <number>[s|m|h|d]"))?;

    if amount <= 0 {
        return Err("auth token ttl must be greater than 0".to_string());
    }

    match unit {
        's' => Ok(Duration::seconds(amount)),
        'm' => Ok(Duration::minutes(amount)),
        'h' => Ok(Duration::hours(amount)),
        'd' => Ok(Duration::days(amount)),
        _ => Err(format!(
            "invalid auth token ttl '{value}'; expected <number>[s|m|h|d]"
        )),
    }
}
