use clap::{Parser, Subcommand};
use serde_json::Value;
use skasc_client::components::api::{AuthResponse, CallRequest};
use skasc_client::components::session::LoggingNavigator;
use skasc_client::components::ui::{TerminalSurface, UiHelper};
use skasc_client::components::{EventRecord, EventRecordBuilder};
use skasc_client::config::DEFAULT_OVERLAY_PATH;
use skasc_client::error::{other_error, ClientResult, Error};
use skasc_client::startup::{self, ClientContext};
use skasc_client::utils::time::format_date;
use skasc_client::utils::validation::validate_email;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "skasc")]
#[command(about = "SKASC event manager client", long_about = None)]
struct Cli {
    /// Event type used as the default for events saved to the cache
    #[arg(long, global = true)]
    event_type_hint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and keep its token
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Log in and keep the token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored token and user
    Logout,
    /// Show the logged-in user
    Whoami {
        /// Ask the server instead of reading the stored record
        #[arg(long)]
        remote: bool,
    },
    /// Check that the server is up
    Health,
    /// Events stored on the server
    Events {
        #[command(subcommand)]
        action: EventsAction,
    },
    /// Ask the voice agent to call a college about an event
    Call {
        #[arg(long)]
        event_id: i64,
        #[arg(long)]
        college: String,
        #[arg(long)]
        phone: String,
    },
    /// Generate a poster from a JSON payload
    Poster {
        #[arg(long)]
        json: String,
    },
    /// Generate a certificate from a JSON payload
    Certificate {
        #[arg(long)]
        json: String,
    },
    /// Fetch a generated design
    Download {
        #[command(subcommand)]
        action: DownloadAction,
    },
    /// Events kept in local storage
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Write the effective configuration to an overlay file
    SaveConfig {
        #[arg(long, default_value = DEFAULT_OVERLAY_PATH)]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
enum EventsAction {
    /// Create an event from a JSON payload
    Create {
        #[arg(long)]
        json: String,
    },
    /// List my events
    List,
}

#[derive(Subcommand)]
enum DownloadAction {
    Poster { id: String },
    Certificate { id: String },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Save an event from a JSON object
    Save {
        #[arg(long)]
        json: String,
    },
    /// List cached events
    List,
    /// Show one cached event
    Get { id: String },
    /// Merge top-level JSON fields into a cached event
    Update {
        id: String,
        #[arg(long)]
        json: String,
    },
    /// Remove a cached event
    Delete { id: String },
    /// Remove every cached event
    Clear,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    startup::init_logging()?;

    // Load configuration
    let config = startup::load_config()?;

    let ctx = ClientContext::build(
        config,
        Arc::new(LoggingNavigator::new()),
        Arc::new(TerminalSurface),
    )
    .await?;

    if let Some(hint) = &cli.event_type_hint {
        ctx.session.set_event_type_hint(hint).await?;
    }

    let result = run(&ctx, cli.command).await;
    if let Err(e) = &result {
        ctx.ui.show_error(&e.to_string());
    }

    ctx.shutdown().await?;

    // The error was already shown through the UI
    if result.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(ctx: &ClientContext, command: Commands) -> ClientResult<()> {
    match command {
        Commands::Register {
            email,
            password,
            name,
        } => {
            check_email(&email)?;
            let data =
                with_loading(&ctx.ui, ctx.api.register(&email, &password, &name)).await?;
            let auth = AuthResponse::from_value(&data);
            ctx.ui.show_success_modal(
                auth.message.as_deref().unwrap_or("Registration successful"),
                None,
            );
        }
        Commands::Login { email, password } => {
            check_email(&email)?;
            let data = with_loading(&ctx.ui, ctx.api.login(&email, &password)).await?;
            let auth = AuthResponse::from_value(&data);
            ctx.ui.show_success_modal(
                auth.message.as_deref().unwrap_or("Login successful"),
                None,
            );
        }
        Commands::Logout => {
            ctx.session.logout().await?;
            info!("Logged out");
        }
        Commands::Whoami { remote } => {
            let user = if remote {
                require_auth(ctx).await?;
                Some(with_loading(&ctx.ui, ctx.api.get_current_user()).await?)
            } else {
                ctx.session.current_user().await?
            };
            match user {
                Some(user) => print_json(&user)?,
                None => println!("Not logged in"),
            }
        }
        Commands::SaveConfig { path } => {
            ctx.config.save_overlay(&path)?;
            info!("Configuration saved to {}", path.display());
        }
        Commands::Health => {
            let health = with_loading(&ctx.ui, ctx.api.health()).await?;
            print_json(&health)?;
        }
        Commands::Events { action } => {
            require_auth(ctx).await?;
            match action {
                EventsAction::Create { json } => {
                    let payload = parse_json(&json)?;
                    let response = with_loading(&ctx.ui, ctx.api.create_event(&payload)).await?;
                    print_json(&response)?;
                    ctx.ui.show_success_modal("Event created successfully", None);
                }
                EventsAction::List => {
                    let response = with_loading(&ctx.ui, ctx.api.get_my_events()).await?;
                    print_remote_events(ctx, &response);
                }
            }
        }
        Commands::Call {
            event_id,
            college,
            phone,
        } => {
            require_auth(ctx).await?;
            let call = CallRequest {
                event_id,
                college_name: college,
                phone_number: phone,
            };
            let response = with_loading(&ctx.ui, ctx.api.initiate_call(&call)).await?;
            print_json(&response)?;
            ctx.ui.show_success_modal("Voice call initiated", None);
        }
        Commands::Poster { json } => {
            require_auth(ctx).await?;
            let payload = parse_json(&json)?;
            let response = with_loading(&ctx.ui, ctx.api.generate_poster(&payload)).await?;
            print_json(&response)?;
            ctx.ui.show_success_modal("Poster generated successfully", None);
        }
        Commands::Certificate { json } => {
            require_auth(ctx).await?;
            let payload = parse_json(&json)?;
            let response =
                with_loading(&ctx.ui, ctx.api.generate_certificate(&payload)).await?;
            print_json(&response)?;
            ctx.ui.show_success_modal("Certificate generated successfully", None);
        }
        Commands::Download { action } => {
            let response = match action {
                DownloadAction::Poster { id } => {
                    with_loading(&ctx.ui, ctx.api.download_poster(&id)).await?
                }
                DownloadAction::Certificate { id } => {
                    with_loading(&ctx.ui, ctx.api.download_certificate(&id)).await?
                }
            };
            print_json(&response)?;
        }
        Commands::Cache { action } => run_cache(ctx, action).await?,
    }

    Ok(())
}

async fn run_cache(ctx: &ClientContext, action: CacheAction) -> ClientResult<()> {
    match action {
        CacheAction::Save { json } => {
            let builder = EventRecordBuilder::from_value(parse_json(&json)?)?;
            let id = ctx.events.save_event(builder).await?;
            println!("{}", id);
        }
        CacheAction::List => {
            let events = ctx.events.get_all_events().await?;
            if events.is_empty() {
                println!("No cached events");
            }
            for event in &events {
                print_cached_event(ctx, event);
            }
        }
        CacheAction::Get { id } => match ctx.events.get_event_by_id(&id).await? {
            Some(event) => print_json(&event)?,
            None => return Err(Error::NotFound(format!("event {}", id))),
        },
        CacheAction::Update { id, json } => {
            let partial = match parse_json(&json)? {
                Value::Object(map) => map,
                _ => return Err(other_error("Update payload must be a JSON object")),
            };
            let event = ctx.events.update_event(&id, partial).await?;
            print_json(&event)?;
        }
        CacheAction::Delete { id } => {
            let removed = ctx.events.delete_event(&id).await?;
            println!("Removed {} event(s)", removed);
        }
        CacheAction::Clear => {
            ctx.events.clear_all_events().await?;
            println!("Cache cleared");
        }
    }

    Ok(())
}

/// Show the loading overlay for the duration of `fut`
async fn with_loading<T>(ui: &UiHelper, fut: impl Future<Output = ClientResult<T>>) -> ClientResult<T> {
    ui.show_loading();
    let result = fut.await;
    ui.hide_loading();
    result
}

async fn require_auth(ctx: &ClientContext) -> ClientResult<()> {
    if ctx.session.require_auth().await {
        Ok(())
    } else {
        Err(other_error("Not logged in. Run `skasc login` first."))
    }
}

fn check_email(email: &str) -> ClientResult<()> {
    if validate_email(email) {
        Ok(())
    } else {
        Err(other_error("Only @skasc.ac.in emails allowed"))
    }
}

fn parse_json(raw: &str) -> ClientResult<Value> {
    Ok(serde_json::from_str(raw)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> ClientResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_date(ctx: &ClientContext, raw: &str) -> String {
    format_date(raw, ctx.config.tz()).unwrap_or_else(|| raw.to_string())
}

fn print_cached_event(ctx: &ClientContext, event: &EventRecord) {
    let name = event
        .field("event_name")
        .and_then(Value::as_str)
        .unwrap_or("(unnamed)");
    println!(
        "{}  {}  [{} / {}]  {}",
        event.id,
        name,
        event.event_type,
        event.status,
        display_date(ctx, &event.created_at)
    );
}

fn print_remote_events(ctx: &ClientContext, response: &Value) {
    let empty = Vec::new();
    let events = response
        .get("events")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    if events.is_empty() {
        println!("No events yet");
        return;
    }

    for event in events {
        let field = |name: &str| -> String {
            match event.get(name) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            }
        };
        println!(
            "#{}  {}  [{}]  theme: {}  team limit: {}  {}",
            field("id"),
            field("event_name"),
            field("event_type"),
            field("theme"),
            field("team_limit"),
            display_date(ctx, &field("created_at"))
        );
        let form = field("google_form_link");
        if !form.is_empty() {
            println!("    form: {}", form);
        }
    }
}
