use clap::{Args, Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::Value;
use std::path::PathBuf;

use digipos_gateway::config::load_config;
use digipos_gateway::upstream::UpstreamClient;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the Digipos gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

/// Output flags shared by every command.
#[derive(Args)]
struct Output {
    /// Request the structured JSON envelope instead of legacy text
    #[arg(long)]
    structured: bool,

    /// Include request diagnostics in `meta`
    #[arg(long)]
    debug: bool,
}

#[derive(Args)]
struct Account {
    #[arg(long)]
    username: String,

    #[command(flatten)]
    output: Output,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the account session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[command(flatten)]
        output: Output,
    },
    /// Confirm the one-time password sent after login
    VerifyOtp {
        #[arg(long)]
        username: String,
        #[arg(long)]
        otp: String,
        #[command(flatten)]
        output: Output,
    },
    /// Show account balance
    Balance(Account),
    /// Show account profile
    Profile(Account),
    /// List virtual accounts
    ListVa(Account),
    /// Show reward summary
    Reward(Account),
    /// Show banners
    Banner(Account),
    /// End the account session
    Logout(Account),
    /// Check SIM status of a subscriber number
    SimStatus {
        #[arg(long)]
        username: String,
        #[arg(long)]
        to: String,
        #[command(flatten)]
        output: Output,
    },
    /// Probe the configured upstream directly
    CheckUpstream {
        #[arg(short, long, default_value = "gateway.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (path, mut params, output) = match cli.command {
        Commands::Login { username, password, output } => (
            "login",
            vec![("username", username), ("password", password)],
            output,
        ),
        Commands::VerifyOtp { username, otp, output } => (
            "verify_otp",
            vec![("username", username), ("otp", otp)],
            output,
        ),
        Commands::Balance(a) => ("balance", vec![("username", a.username)], a.output),
        Commands::Profile(a) => ("profile", vec![("username", a.username)], a.output),
        Commands::ListVa(a) => ("list_va", vec![("username", a.username)], a.output),
        Commands::Reward(a) => ("reward", vec![("username", a.username)], a.output),
        Commands::Banner(a) => ("banner", vec![("username", a.username)], a.output),
        Commands::Logout(a) => ("logout", vec![("username", a.username)], a.output),
        Commands::SimStatus { username, to, output } => (
            "sim_status",
            vec![("username", username), ("to", to)],
            output,
        ),
        Commands::CheckUpstream { config } => {
            let config = load_config(&config)?;
            let client = UpstreamClient::new(&config.upstream)?;
            if client.check_health().await {
                println!("{} reachable", client.base_url());
            } else {
                eprintln!("{} unreachable", client.base_url());
                std::process::exit(1);
            }
            return Ok(());
        }
    };

    params.push(("text", (!output.structured).to_string()));
    params.push(("debug", output.debug.to_string()));

    let res = reqwest::Client::new()
        .get(format!("{}/digipos/{}", cli.url.trim_end_matches('/'), path))
        .query(&params)
        .send()
        .await?;
    print_response(res, output.structured).await
}

async fn print_response(res: reqwest::Response, structured: bool) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    println!("{}", render_body(status, &text, structured)?);
    Ok(())
}

/// Text to print for a gateway reply. A non-2xx status is an error so the
/// process exits non-zero.
fn render_body(status: StatusCode, text: &str, structured: bool) -> Result<String, Box<dyn std::error::Error>> {
    if !status.is_success() {
        return Err(format!("gateway returned status {}: {}", status, text).into());
    }

    if structured {
        let json: Value = serde_json::from_str(text)?;
        Ok(serde_json::to_string_pretty(&json)?)
    } else {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_fails() {
        let err = render_body(
            StatusCode::UNAUTHORIZED,
            "error=authentication&message=authenticationfailed",
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("401"));
        assert!(render_body(StatusCode::SERVICE_UNAVAILABLE, "{}", true).is_err());
    }

    #[test]
    fn test_success_bodies() {
        let text = "ngrs={1000=0}&linkaja=3230&finpay=0";
        assert_eq!(render_body(StatusCode::OK, text, false).unwrap(), text);

        let pretty = render_body(StatusCode::OK, r#"{"parse":"SUCCESS"}"#, true).unwrap();
        assert_eq!(pretty, "{\n  \"parse\": \"SUCCESS\"\n}");
    }
}
