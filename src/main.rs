use anyhow::{Context, Result};
use clap::Parser;
use hrex::{
    BearerAuthorization, HttpClientConfiguration, HttpClientFactory, HttpParameter, HttpRequest,
    RequestMethod, Response,
};
use std::sync::Arc;

/// hrex - retrying HTTP client
///
/// Issue a GET or POST with bounded retries on server errors and network
/// failures.
///
/// Examples:
///   hrex get https://api.example.com/1/status.json -p id=20
///   hrex --retry-count 3 post https://api.example.com/1/update -p "status=hello world"
#[derive(Parser, Debug)]
#[command(author, version = env!("HREX_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Retries after the first failed attempt
    #[arg(long, env = "HREX_RETRY_COUNT", default_value_t = 0, global = true)]
    retry_count: u32,

    /// Seconds to wait between attempts
    #[arg(long, env = "HREX_RETRY_INTERVAL", default_value_t = 5, global = true)]
    retry_interval: u64,

    /// Connect timeout in milliseconds
    #[arg(long, env = "HREX_CONNECT_TIMEOUT", default_value_t = 20_000, global = true)]
    connect_timeout: u64,

    /// Read timeout in milliseconds
    #[arg(long, env = "HREX_READ_TIMEOUT", default_value_t = 120_000, global = true)]
    read_timeout: u64,

    #[arg(long, env = "HREX_PROXY_HOST", global = true)]
    proxy_host: Option<String>,

    #[arg(long, env = "HREX_PROXY_PORT", global = true)]
    proxy_port: Option<u16>,

    #[arg(long, env = "HREX_PROXY_USER", global = true)]
    proxy_user: Option<String>,

    #[arg(long, env = "HREX_PROXY_PASSWORD", global = true, hide_env_values = true)]
    proxy_password: Option<String>,

    #[arg(long, env = "HREX_USER_AGENT", global = true)]
    user_agent: Option<String>,

    /// Bearer token sent as the Authorization header
    #[arg(long, env = "HREX_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Print the status line and headers before the body
    #[arg(long, short = 'i', global = true)]
    include: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Send a GET request; parameters go to the query string
    Get(RequestArgs),

    /// Send a form-encoded POST request
    Post(RequestArgs),
}

#[derive(clap::Args, Debug)]
struct RequestArgs {
    #[arg(value_name = "URL")]
    url: String,

    /// Request parameter as name=value
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Extra header as "Name: value"
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", s))
}

impl Cli {
    fn configuration(&self) -> HttpClientConfiguration {
        HttpClientConfiguration {
            http_retry_count: self.retry_count,
            http_retry_interval_seconds: self.retry_interval,
            http_connection_timeout: self.connect_timeout,
            http_read_timeout: self.read_timeout,
            http_proxy_host: self.proxy_host.clone(),
            http_proxy_port: self.proxy_port,
            http_proxy_user: self.proxy_user.clone(),
            http_proxy_password: self.proxy_password.clone(),
            user_agent: self.user_agent.clone(),
        }
    }

    fn request(&self) -> HttpRequest {
        let (method, args) = match &self.command {
            Commands::Get(args) => (RequestMethod::Get, args),
            Commands::Post(args) => (RequestMethod::Post, args),
        };

        let mut builder = HttpRequest::builder(method, args.url.as_str()).parameters(
            args.params
                .iter()
                .map(|(name, value)| HttpParameter::new(name, value)),
        );
        for (name, value) in &args.headers {
            builder = builder.header(name, value);
        }
        if let Some(token) = &self.token {
            builder = builder.authorization(Arc::new(BearerAuthorization::new(token)));
        }
        builder.build()
    }
}

async fn print_response(mut response: Response, include: bool) -> Result<()> {
    if include {
        println!("HTTP {}", response.status_code());
        for (name, value) in response.raw_headers() {
            println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
        println!();
    }
    let body = response
        .as_string()
        .await
        .context("Failed to read response body")?;
    println!("{}", body);
    response.close();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let factory = HttpClientFactory::new();
    let client = factory.get_instance(&cli.configuration());
    let request = cli.request();

    let response = client
        .execute(&request)
        .await
        .with_context(|| format!("{} {} failed", request.method(), request.url()))?;

    print_response(response, cli.include).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_get_parsing() {
        let cli = Cli::try_parse_from([
            "hrex",
            "get",
            "https://api.example.com/search",
            "-p",
            "q=rust lang",
            "-H",
            "X-Client: sdk",
        ])
        .unwrap();

        let request = cli.request();
        assert_eq!(request.method(), RequestMethod::Get);
        assert_eq!(
            request.url_with_query(),
            "https://api.example.com/search?q=rust+lang"
        );
        assert_eq!(request.request_headers()["X-Client"], "sdk");
        assert!(request.authorization().is_none());
    }

    #[test]
    fn test_cli_post_with_token() {
        let cli = Cli::try_parse_from([
            "hrex",
            "--token",
            "abc",
            "post",
            "https://api.example.com/update",
            "-p",
            "status=hi=there",
        ])
        .unwrap();

        let request = cli.request();
        assert_eq!(request.method(), RequestMethod::Post);
        assert_eq!(request.form_body().as_deref(), Some("status=hi%3Dthere"));
        let auth = request.authorization().unwrap();
        assert_eq!(
            auth.authorization_header(&request).as_deref(),
            Some("Bearer abc")
        );
    }

    #[test]
    fn test_cli_global_retry_options() {
        let cli = Cli::try_parse_from([
            "hrex",
            "get",
            "http://localhost/",
            "--retry-count",
            "3",
            "--retry-interval",
            "1",
            "--proxy-host",
            "proxy.local",
            "--proxy-port",
            "8080",
        ])
        .unwrap();

        let conf = cli.configuration();
        assert_eq!(conf.http_retry_count, 3);
        assert_eq!(conf.http_retry_interval_seconds, 1);
        assert!(conf.is_proxy_configured());
    }

    #[test]
    fn test_cli_rejects_malformed_param() {
        let result = Cli::try_parse_from(["hrex", "get", "http://localhost/", "-p", "novalue"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["hrex", "http://localhost/"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Accept:  application/json "),
            Ok(("Accept".to_string(), "application/json".to_string()))
        );
        assert!(parse_header(": nothing").is_err());
        assert!(parse_header("NoColon").is_err());
    }
}
