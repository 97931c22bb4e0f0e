mod auth;
mod browse;
mod favorites;
mod output;
mod pantry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pantry_core::{
    message, ApiError, AuthStore, DiskStorage, GoogleOAuthConfig, HttpApiClient, LanguageStore,
    Locale, MessageKey, SortOrder, Storage, TimeBucket,
};
use serde::Deserialize;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pantry")]
#[command(about = "Pantry CLI: find recipes for what you already have", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, global = true, env = "PANTRY_API_URL", default_value = "http://localhost:3000")]
    server: String,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true, env = "PANTRY_HTTP_TIMEOUT_MS", default_value_t = 10_000)]
    timeout_ms: u64,

    /// Where saved state lives (default: ~/.pantry/state)
    #[arg(long, global = true, env = "PANTRY_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ping the server (unauthenticated)
    Ping,
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Print the Google consent URL
    GoogleUrl {
        #[arg(long)]
        client_id: Option<String>,
        #[arg(long)]
        redirect_uri: Option<String>,
    },
    /// Finish Google sign-in
    Google {
        /// Authorization code
        #[arg(long, conflicts_with = "redirect_url")]
        code: Option<String>,
        /// The full URL Google redirected to
        #[arg(long)]
        redirect_url: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Show the signed-in user
    Me,
    /// Show or switch the language (en, ru)
    Lang { locale: Option<Locale> },
    /// List ingredients by category; selected ones are marked
    Ingredients,
    /// Add ingredients (by id or name) to what you have
    Select {
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Remove ingredients from what you have
    Unselect {
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Clear the ingredient selection
    Clear,
    /// List meal types, kitchens and diets usable as filters
    Tags,
    /// Search recipes. Filters are remembered between runs
    Search {
        #[arg(long)]
        meal_type: Option<String>,
        #[arg(long)]
        kitchen: Option<String>,
        /// Comma-separated; recipes must match all of them
        #[arg(long = "diet", value_delimiter = ',')]
        diets: Option<Vec<String>>,
        /// Text to look for in titles and descriptions
        #[arg(long, short)]
        query: Option<String>,
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortOrder>,
        #[arg(long, value_parser = parse_time)]
        by_time: Option<TimeBucket>,
        /// Forget saved filters first
        #[arg(long)]
        reset: bool,
        #[arg(long, default_value_t = 10)]
        limit: i64,
        /// How many pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show a recipe with what you have and what you need
    Show {
        id: i32,
        /// Let the server compute the match
        #[arg(long)]
        server_match: bool,
    },
    /// Random picks for breakfast, lunch and dinner
    Suggest {
        #[arg(long, default_value_t = 4)]
        per_section: i64,
    },
    /// Saved recipes
    Favorites {
        #[command(subcommand)]
        action: Option<FavoriteAction>,
    },
}

#[derive(Subcommand)]
enum FavoriteAction {
    List,
    Add { id: i32 },
    Remove { id: i32 },
}

fn parse_sort(s: &str) -> Result<SortOrder, String> {
    SortOrder::parse(s).ok_or_else(|| {
        "expected newest, oldest, cook_time_asc, cook_time_desc, title or random".to_string()
    })
}

fn parse_time(s: &str) -> Result<TimeBucket, String> {
    TimeBucket::parse(s)
        .ok_or_else(|| "expected under_15, under_30, under_60 or over_60".to_string())
}

#[derive(Deserialize)]
struct PingResponse {
    message: String,
}

async fn ping(server: &str, timeout: Duration, out: &mut dyn Write) -> Result<()> {
    let url = format!("{}/api/test/unauthed-ping", server.trim_end_matches('/'));
    let response: PingResponse = reqwest::Client::new()
        .get(&url)
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?
        .error_for_status()?
        .json()
        .await?;
    writeln!(out, "{}", response.message)?;
    Ok(())
}

fn google_config(client_id: Option<String>, redirect_uri: Option<String>) -> Result<GoogleOAuthConfig> {
    match (client_id, redirect_uri) {
        (Some(client_id), Some(redirect_uri)) => Ok(GoogleOAuthConfig::new(client_id, redirect_uri)),
        _ => GoogleOAuthConfig::from_env()
            .context("Pass --client-id and --redirect-uri or set GOOGLE_CLIENT_ID and GOOGLE_REDIRECT_URI"),
    }
}

/// Localized headline for an API failure.
fn describe(locale: Locale, error: &ApiError) -> &'static str {
    let key = match error {
        ApiError::NotFound => MessageKey::NotFound,
        ApiError::Unauthorized(_) => MessageKey::LoginRequired,
        ApiError::ConnectionRefused(_) | ApiError::Network(_) | ApiError::Timeout(_) => {
            MessageKey::NetworkError
        }
        _ => MessageKey::GenericError,
    };
    message(locale, key)
}

async fn run(cli: Cli, storage: &dyn Storage, out: &mut dyn Write) -> Result<()> {
    let timeout = Duration::from_millis(cli.timeout_ms);
    let api = HttpApiClient::builder()
        .base_url(&cli.server)
        .timeout(timeout)
        .token(AuthStore::load(storage).token().map(str::to_string))
        .build()?;

    match cli.command {
        Commands::Ping => ping(&cli.server, timeout, out).await,
        Commands::Signup {
            email,
            password,
            name,
        } => auth::signup(&api, storage, out, email, password, name).await,
        Commands::Login { email, password } => auth::login(&api, storage, out, email, password).await,
        Commands::GoogleUrl {
            client_id,
            redirect_uri,
        } => auth::google_url(storage, out, &google_config(client_id, redirect_uri)?),
        Commands::Google { code, redirect_url } => {
            auth::google(&api, storage, out, code, redirect_url).await
        }
        Commands::Logout => auth::logout(storage, out),
        Commands::Me => auth::me(&api, storage, out).await,
        Commands::Lang { locale } => pantry::lang(storage, out, locale),
        Commands::Ingredients => pantry::list(&api, storage, out).await,
        Commands::Select { items } => pantry::select(&api, storage, out, &items).await,
        Commands::Unselect { items } => pantry::unselect(&api, storage, out, &items).await,
        Commands::Clear => pantry::clear(storage, out),
        Commands::Tags => pantry::tags(&api, storage, out).await,
        Commands::Search {
            meal_type,
            kitchen,
            diets,
            query,
            sort,
            by_time,
            reset,
            limit,
            pages,
        } => {
            let args = browse::FilterArgs {
                meal_type,
                kitchen,
                diets,
                search: query,
                sort,
                by_time,
                reset,
            };
            browse::search(&api, storage, out, &args, limit, pages).await
        }
        Commands::Show { id, server_match } => {
            browse::show(&api, storage, out, id, server_match).await
        }
        Commands::Suggest { per_section } => browse::suggest(&api, storage, out, per_section).await,
        Commands::Favorites { action } => match action.unwrap_or(FavoriteAction::List) {
            FavoriteAction::List => favorites::list(&api, storage, out).await,
            FavoriteAction::Add { id } => favorites::add(&api, storage, out, id).await,
            FavoriteAction::Remove { id } => favorites::remove(&api, storage, out, id).await,
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let storage = DiskStorage::new(cli.state_dir.clone().unwrap_or_else(DiskStorage::default_dir));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Err(err) = run(cli, &storage, &mut out).await {
        let locale = LanguageStore::load(&storage).locale;
        if let Some(api_error) = err.downcast_ref::<ApiError>() {
            if matches!(api_error, ApiError::Unauthorized(_)) {
                auth::forget_session(&storage)?;
            }
            let headline = describe(locale, api_error);
            return Err(err.context(headline));
        }
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_flags() {
        let cli = Cli::try_parse_from([
            "pantry",
            "search",
            "--diet",
            "vegan,gluten_free",
            "--sort",
            "cook_time_asc",
            "--by-time",
            "under_30",
            "-q",
            "soup",
        ])
        .unwrap();
        match cli.command {
            Commands::Search {
                diets,
                sort,
                by_time,
                query,
                pages,
                ..
            } => {
                assert_eq!(diets, Some(vec!["vegan".to_string(), "gluten_free".to_string()]));
                assert_eq!(sort, Some(SortOrder::CookTimeAsc));
                assert_eq!(by_time, Some(TimeBucket::Under30));
                assert_eq!(query.as_deref(), Some("soup"));
                assert_eq!(pages, 1);
            }
            _ => panic!("expected search"),
        }

        assert!(Cli::try_parse_from(["pantry", "search", "--sort", "popular"]).is_err());
    }

    #[test]
    fn test_lang_parses_locale() {
        let cli = Cli::try_parse_from(["pantry", "lang", "ru-RU"]).unwrap();
        assert!(matches!(cli.command, Commands::Lang { locale: Some(Locale::Ru) }));
        assert!(Cli::try_parse_from(["pantry", "lang", "de"]).is_err());
    }

    #[test]
    fn test_describe_is_localized() {
        assert_eq!(describe(Locale::Ru, &ApiError::NotFound), "Рецепт не найден.");
        assert_eq!(
            describe(Locale::En, &ApiError::ConnectionRefused("x".into())),
            "Cannot reach the server."
        );
    }

    #[tokio::test]
    async fn test_state_survives_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path().to_path_buf());
        let mut out = Vec::new();
        pantry::lang(&storage, &mut out, Some(Locale::Ru)).unwrap();

        let reopened = DiskStorage::new(dir.path().to_path_buf());
        assert_eq!(LanguageStore::load(&reopened).locale, Locale::Ru);
    }
}
