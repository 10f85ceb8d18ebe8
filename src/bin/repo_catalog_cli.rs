use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use repo_catalog::classifier::{Classifier, ClassifierRules, default_classifier};
use repo_catalog::formatter::{
    TimezoneOffset, bookmark_feed_markdown_with_timezone, bookmarks_markdown_with_timezone,
    catalog_page_markdown, classification_markdown, languages_markdown,
    popular_repositories_markdown_with_timezone, repository_markdown_with_timezone,
    repository_stats_markdown, spotlight_markdown_with_timezone,
    user_profile_markdown_with_timezone, user_profile_with_stats_markdown_with_timezone,
};
use repo_catalog::github::GitHubClient;
use repo_catalog::services::bookmarks::{DEFAULT_FEED_PAGE_SIZE, DEFAULT_POPULAR_SAMPLE_SIZE};
use repo_catalog::services::{
    BookmarkService, CatalogService, CatalogSettings, LanguageService, SpotlightService,
    UserService, default_data_dir,
};
use repo_catalog::tools::functions;
use repo_catalog::types::{
    BookmarkId, OutputOption, Spotlight, UserId, UserProfileUpdate, parse_spotlight_reply,
    time_until_next_refresh,
};

/// Parse timezone if provided, otherwise use local timezone
fn parse_timezone_or_default(timezone: Option<String>) -> Option<TimezoneOffset> {
    timezone
        .and_then(|tz| TimezoneOffset::parse(&tz))
        .or_else(|| Some(TimezoneOffset::from_local()))
}

#[derive(Parser)]
#[command(name = "repo-catalog-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Repository Catalog CLI - browse a curated catalog of popular GitHub repositories, bookmark them and share the activity"
)]
#[command(
    long_about = "Repository Catalog CLI pages through GitHub's most-starred repositories with language runtimes, frameworks, tutorials, curated lists and unmaintained projects filtered out. Page totals are estimated from the share of repositories that pass the filter. Users keep profiles and public or private bookmarks in a local data directory, which also feeds the activity feed, popularity ranking and the language filter list. Output is markdown or JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Output format for results - markdown for reading, json for programmatic use
    #[arg(long, global = true, default_value = "markdown")]
    format: OutputFormat,
    /// GitHub personal access token (can also be set via REPO_CATALOG_GITHUB_TOKEN or GITHUB_TOKEN)
    #[arg(long, global = true)]
    github_token: Option<String>,
    /// Timezone for datetime formatting in output (e.g., "JST", "+09:00", "UTC")
    #[arg(long, global = true)]
    timezone: Option<String>,
    /// Request timeout in seconds for GitHub API calls (default: 10 seconds)
    #[arg(long, global = true)]
    request_timeout: Option<u64>,
    /// Directory holding languages, bookmarks, users and spotlights (default: platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// TOML file replacing the built-in exclusion rules
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    /// Only catalog repositories with more stars than this (default: 1000)
    #[arg(long, global = true)]
    min_stars: Option<u32>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Clone, ValueEnum)]
enum OutputOptionCli {
    Light,
    Rich,
}

impl From<OutputOptionCli> for OutputOption {
    fn from(cli_option: OutputOptionCli) -> Self {
        match cli_option {
            OutputOptionCli::Light => OutputOption::Light,
            OutputOptionCli::Rich => OutputOption::Rich,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of the filtered catalog, optionally narrowed by language and free text
    Browse {
        /// 1-based page number
        #[arg(short, long)]
        page: Option<u32>,
        /// Repositories per page (default: 12, max: 50)
        #[arg(long)]
        per_page: Option<u32>,
        /// Language filter (e.g., "rust"); "all" means no filter
        #[arg(short, long)]
        language: Option<String>,
        /// Free-text search added to the query
        #[arg(short, long)]
        query: Option<String>,
        /// light shows one line per repository, rich shows topics, counters and dates
        #[arg(long, default_value = "light")]
        output: OutputOptionCli,
    },
    /// Fetch a repository and explain whether the catalog excludes it
    Check {
        /// Repository as owner/name or GitHub URL
        repository: String,
    },
    /// Fetch and display repositories from GitHub
    Show {
        /// Repositories as owner/name or GitHub URL
        repositories: Vec<String>,
    },
    /// Manage the languages offered as catalog filters
    Languages {
        #[command(subcommand)]
        command: LanguageCommands,
    },
    /// Manage bookmarks of a user
    Bookmark {
        #[command(subcommand)]
        command: BookmarkCommands,
    },
    /// Show public bookmark activity, newest first
    Feed {
        /// Only show the activity of this user
        #[arg(short, long)]
        user: Option<String>,
        /// Bookmarks per page (default: 10)
        #[arg(long)]
        page_size: Option<usize>,
        /// RFC 3339 cursor from the previous page; only older bookmarks are shown
        #[arg(long)]
        before: Option<String>,
    },
    /// Rank repositories by bookmarks among the latest public bookmarks
    Popular {
        /// Number of latest public bookmarks to rank (default: 5)
        #[arg(long)]
        sample_size: Option<usize>,
    },
    /// Show bookmark statistics of a repository
    Stats {
        /// Repository as owner/name, GitHub URL or numeric id
        repository: String,
    },
    /// Manage user profiles
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Validate and keep curator-picked spotlights
    Spotlight {
        #[command(subcommand)]
        command: SpotlightCommands,
    },
}

#[derive(Subcommand)]
enum LanguageCommands {
    /// List languages ordered by name
    List,
    /// Add a language; names must be unique
    Add {
        name: String,
        /// User adding the language
        #[arg(short, long)]
        user: Option<String>,
    },
}

#[derive(Subcommand)]
enum BookmarkCommands {
    /// Bookmark a repository (bookmarking it again is a no-op)
    Add {
        /// Repository as owner/name or GitHub URL
        repository: String,
        /// Bookmarking user; needs a profile
        #[arg(short, long)]
        user: String,
        /// Keep the bookmark out of public feeds
        #[arg(long)]
        private: bool,
    },
    /// Remove a bookmark
    Remove {
        /// Repository as owner/name, GitHub URL or numeric id
        repository: String,
        #[arg(short, long)]
        user: String,
    },
    /// List all bookmarks of a user, newest first
    List {
        #[arg(short, long)]
        user: String,
    },
    /// Make a bookmark public or private
    Privacy {
        bookmark_id: String,
        #[arg(short, long)]
        user: String,
        /// Make the bookmark public instead of private
        #[arg(long)]
        public: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a profile
    Create {
        user_id: String,
        #[arg(short, long)]
        name: String,
        #[arg(long)]
        photo_url: Option<String>,
    },
    /// Show a profile with its public bookmark statistics
    Show { user_id: String },
    /// Update profile fields; omitted fields are left unchanged
    Update {
        user_id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        photo_url: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Comma separated interests
        #[arg(long, value_delimiter = ',')]
        interests: Option<Vec<String>>,
    },
}

#[derive(Subcommand)]
enum SpotlightCommands {
    /// Validate a curator JSON reply against recent spotlights
    Validate {
        /// File with the curator reply `{"repositories": [...]}`
        file: PathBuf,
        /// Fill in GitHub details for every accepted entry
        #[arg(long)]
        enrich: bool,
        /// Store the accepted entries as the latest spotlight
        #[arg(long)]
        record: bool,
        /// Curator notes stored with the spotlight
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show the latest spotlight and the time until the next one
    Latest,
}

/// Settings shared by every command
struct CliContext {
    format: OutputFormat,
    github_token: Option<String>,
    timezone: Option<TimezoneOffset>,
    request_timeout: Option<Duration>,
    data_dir: PathBuf,
}

impl CliContext {
    fn github_client(&self) -> Result<GitHubClient> {
        GitHubClient::new(self.github_token.clone(), self.request_timeout)
            .map_err(|e| anyhow::anyhow!("Failed to create GitHub client: {}", e))
    }

    fn print<T: Serialize>(&self, value: &T, markdown: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Markdown => println!("{}", markdown()),
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider early to prevent "no process-level CryptoProvider available" panics
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("repo_catalog=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let github_token = cli
        .github_token
        .or_else(|| env::var("REPO_CATALOG_GITHUB_TOKEN").ok())
        .or_else(|| env::var("GITHUB_TOKEN").ok());

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()
            .map_err(|e| anyhow::anyhow!("Failed to get data directory: {}", e))?,
    };

    let ctx = CliContext {
        format: cli.format,
        github_token,
        timezone: parse_timezone_or_default(cli.timezone),
        request_timeout: cli.request_timeout.map(Duration::from_secs),
        data_dir,
    };

    match cli.command {
        Commands::Browse {
            page,
            per_page,
            language,
            query,
            output,
        } => {
            let classifier = load_classifier(cli.rules.as_deref())?;
            let mut settings = CatalogSettings::default();
            if let Some(min_stars) = cli.min_stars {
                settings.min_stars = min_stars;
            }
            let catalog = CatalogService::with_classifier(ctx.github_client()?, classifier, settings);

            let result = functions::catalog::list_catalog_page(
                &catalog,
                page,
                per_page,
                language.as_deref(),
                query,
            )
            .await?;

            let rich = OutputOption::from(output) == OutputOption::Rich;
            ctx.print(&result, || {
                catalog_page_markdown(&result, rich, ctx.timezone.as_ref()).0
            })?;
        }
        Commands::Check { repository } => {
            let classifier = load_classifier(cli.rules.as_deref())?;
            let (candidate, classification) = functions::catalog::check_repository(
                &ctx.github_client()?,
                &classifier,
                &repository,
            )
            .await?;

            let value = serde_json::json!({
                "repository": candidate,
                "classification": classification,
            });
            ctx.print(&value, || {
                format!(
                    "{}\n{}",
                    classification_markdown(&classification).0,
                    repository_markdown_with_timezone(&candidate, ctx.timezone.as_ref()).0
                )
            })?;
        }
        Commands::Show { repositories } => {
            let repository_ids = repositories
                .iter()
                .map(|r| functions::catalog::parse_repository_reference(r))
                .collect::<Result<Vec<_>>>()?;
            let fetched = ctx.github_client()?.fetch_repositories(&repository_ids).await;

            ctx.print(&fetched, || {
                if fetched.is_empty() {
                    return "No repositories found.".to_string();
                }
                fetched
                    .iter()
                    .map(|r| repository_markdown_with_timezone(r, ctx.timezone.as_ref()).0)
                    .collect::<Vec<_>>()
                    .join("---\n")
            })?;
        }
        Commands::Languages { command } => handle_languages_command(&ctx, command)?,
        Commands::Bookmark { command } => handle_bookmark_command(&ctx, command).await?,
        Commands::Feed {
            user,
            page_size,
            before,
        } => {
            let page_size = page_size.unwrap_or(DEFAULT_FEED_PAGE_SIZE);
            let feed = match user {
                Some(user) => {
                    let before = functions::bookmarks::parse_feed_cursor(before.as_deref())?;
                    BookmarkService::new(&ctx.data_dir)?.user_feed(
                        &UserId::from(user),
                        page_size,
                        before,
                    )
                }
                None => functions::bookmarks::public_feed(&ctx.data_dir, page_size, before.as_deref())?,
            };
            ctx.print(&feed, || {
                bookmark_feed_markdown_with_timezone(&feed, ctx.timezone.as_ref()).0
            })?;
        }
        Commands::Popular { sample_size } => {
            let popular = functions::bookmarks::popular_repositories(
                &ctx.data_dir,
                sample_size.unwrap_or(DEFAULT_POPULAR_SAMPLE_SIZE),
            )?;
            ctx.print(&popular, || {
                popular_repositories_markdown_with_timezone(&popular, ctx.timezone.as_ref()).0
            })?;
        }
        Commands::Stats { repository } => {
            let stats = functions::bookmarks::repository_stats(
                &ctx.github_client()?,
                &ctx.data_dir,
                &repository,
            )
            .await?;
            ctx.print(&stats, || repository_stats_markdown(&stats).0)?;
        }
        Commands::User { command } => handle_user_command(&ctx, command)?,
        Commands::Spotlight { command } => handle_spotlight_command(&ctx, command).await?,
    }

    Ok(())
}

fn load_classifier(rules: Option<&Path>) -> Result<Arc<Classifier>> {
    match rules {
        Some(path) => {
            let rules = ClassifierRules::load(path)
                .with_context(|| format!("Failed to load rules from {}", path.display()))?;
            Ok(Arc::new(Classifier::new(rules)))
        }
        None => Ok(default_classifier()),
    }
}

fn handle_languages_command(ctx: &CliContext, command: LanguageCommands) -> Result<()> {
    let mut languages = LanguageService::new(&ctx.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to open languages: {}", e))?;

    match command {
        LanguageCommands::List => {
            let list = languages.list_languages(false)?;
            ctx.print(&list, || languages_markdown(&list).0)?;
        }
        LanguageCommands::Add { name, user } => {
            let language = languages
                .add_language(&name, user.map(UserId::from))
                .map_err(|e| anyhow::anyhow!("Failed to add language: {}", e))?;
            ctx.print(&language, || {
                format!("Added language '{}' (filter: {})", language.name, language.filter_value())
            })?;
        }
    }

    Ok(())
}

async fn handle_bookmark_command(ctx: &CliContext, command: BookmarkCommands) -> Result<()> {
    let mut bookmarks = BookmarkService::new(&ctx.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to open bookmarks: {}", e))?;

    match command {
        BookmarkCommands::Add {
            repository,
            user,
            private,
        } => {
            let user_id = UserId::from(user);
            let users = UserService::new(&ctx.data_dir)?;
            let profile = users.get_profile(&user_id).with_context(|| {
                format!(
                    "User '{}' has no profile, create one with `user create` first",
                    user_id
                )
            })?;

            let repository_id = functions::catalog::parse_repository_reference(&repository)?;
            let candidate = ctx.github_client()?.fetch_repository(&repository_id).await?;

            let bookmark = bookmarks
                .add_bookmark(&user_id, profile.summary(), &candidate, !private)
                .map_err(|e| anyhow::anyhow!("Failed to add bookmark: {}", e))?;
            ctx.print(&bookmark, || {
                format!("Bookmarked {} (id: {})", bookmark.repo.full_name, bookmark.id)
            })?;
        }
        BookmarkCommands::Remove { repository, user } => {
            let user_id = UserId::from(user);
            let repo_id = match repository.trim().parse::<u64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    let repository_id =
                        functions::catalog::parse_repository_reference(&repository)?;
                    bookmarks.find_repository_id(&repository_id)
                }
            };

            let removed = match repo_id {
                Some(repo_id) => bookmarks
                    .remove_bookmark(&user_id, repo_id)
                    .map_err(|e| anyhow::anyhow!("Failed to remove bookmark: {}", e))?,
                None => false,
            };
            ctx.print(&serde_json::json!({ "removed": removed }), || {
                if removed {
                    format!("Removed bookmark of {}", repository)
                } else {
                    format!("{} was not bookmarked by {}", repository, user_id)
                }
            })?;
        }
        BookmarkCommands::List { user } => {
            let list = bookmarks.user_bookmarks(&UserId::from(user));
            ctx.print(&list, || {
                bookmarks_markdown_with_timezone(&list, ctx.timezone.as_ref()).0
            })?;
        }
        BookmarkCommands::Privacy {
            bookmark_id,
            user,
            public,
        } => {
            let bookmark = bookmarks
                .update_privacy(
                    &BookmarkId::from(bookmark_id.as_str()),
                    &UserId::from(user),
                    public,
                )
                .map_err(|e| anyhow::anyhow!("Failed to update bookmark: {}", e))?;
            ctx.print(&bookmark, || {
                format!(
                    "Bookmark of {} is now {}",
                    bookmark.repo.full_name,
                    if bookmark.is_public { "public" } else { "private" }
                )
            })?;
        }
    }

    Ok(())
}

fn handle_user_command(ctx: &CliContext, command: UserCommands) -> Result<()> {
    let mut users = UserService::new(&ctx.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to open users: {}", e))?;

    match command {
        UserCommands::Create {
            user_id,
            name,
            photo_url,
        } => {
            let profile = users
                .create_profile(UserId::from(user_id), name, photo_url)
                .map_err(|e| anyhow::anyhow!("Failed to create profile: {}", e))?;
            ctx.print(&profile, || {
                user_profile_markdown_with_timezone(&profile, ctx.timezone.as_ref()).0
            })?;
        }
        UserCommands::Show { user_id } => {
            let bookmarks = BookmarkService::new(&ctx.data_dir)?;
            let stats = users
                .profile_with_stats(&UserId::from(user_id), &bookmarks)
                .map_err(|e| anyhow::anyhow!("Failed to load profile: {}", e))?;
            ctx.print(&stats, || {
                user_profile_with_stats_markdown_with_timezone(&stats, ctx.timezone.as_ref()).0
            })?;
        }
        UserCommands::Update {
            user_id,
            name,
            photo_url,
            bio,
            interests,
        } => {
            let update = UserProfileUpdate {
                display_name: name,
                photo_url,
                bio,
                interests,
            };
            let profile = users
                .update_profile(&UserId::from(user_id), update)
                .map_err(|e| anyhow::anyhow!("Failed to update profile: {}", e))?;
            ctx.print(&profile, || {
                user_profile_markdown_with_timezone(&profile, ctx.timezone.as_ref()).0
            })?;
        }
    }

    Ok(())
}

async fn handle_spotlight_command(ctx: &CliContext, command: SpotlightCommands) -> Result<()> {
    let mut spotlights = SpotlightService::new(&ctx.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to open spotlights: {}", e))?;

    match command {
        SpotlightCommands::Validate {
            file,
            enrich,
            record,
            notes,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let previously_featured = spotlights.recently_featured();
            let mut entries = parse_spotlight_reply(&content, &previously_featured)?;

            if enrich {
                let ids: Vec<_> = entries.iter().map(|e| e.full_name.clone()).collect();
                let details = ctx.github_client()?.fetch_repositories(&ids).await;
                for entry in &mut entries {
                    entry.details = details
                        .iter()
                        .find(|d| d.full_name == entry.full_name)
                        .cloned();
                }
            }

            let spotlight = Spotlight::new(entries, notes, previously_featured);
            if record {
                spotlights.record(spotlight.clone())?;
            }

            ctx.print(&spotlight, || {
                spotlight_markdown_with_timezone(&spotlight, ctx.timezone.as_ref()).0
            })?;
        }
        SpotlightCommands::Latest => {
            let (minutes, seconds) = time_until_next_refresh(chrono::Utc::now());
            let latest = spotlights.latest();
            ctx.print(&latest, || match latest {
                Some(spotlight) => format!(
                    "{}\nnext spotlight in {}m {}s",
                    spotlight_markdown_with_timezone(spotlight, ctx.timezone.as_ref()).0,
                    minutes,
                    seconds
                ),
                None => "No spotlight recorded yet.".to_string(),
            })?;
        }
    }

    Ok(())
}
