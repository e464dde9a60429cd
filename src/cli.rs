//! Command-line interface.
//!
//! Without a subcommand the TUI starts. The other subcommands run one request
//! (or a few pages) and print the result, for scripting.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing::info;

use crate::api::{auth, ApiError, DataGateway, DeliveryClient};
use crate::catalog::{validate_custom_date, DateRange};
use crate::config::{Config, ConfigError, Profile};
use crate::controller::{self, FetchOutcome, ListScreen, PageRequest};
use crate::error::{AppError, Result};
use crate::routing::NavigationContext;
use crate::screen::{CollectionType, Screen};

#[derive(Parser, Debug)]
#[command(name = "dispatchdesk")]
#[command(about = "Browse delivery orders, collections and complaints")]
#[command(version)]
pub struct Cli {
    /// Profile to use instead of the configured default
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the terminal UI (default)
    Tui {
        /// Screen to open first
        #[arg(long, value_enum, default_value = "orders")]
        screen: Resource,

        /// Collection type when opening on collections
        #[arg(short = 't', long = "type", value_parser = parse_collection_type)]
        collection_type: Option<CollectionType>,

        /// Open the orders list restricted to these IDs (comma-separated)
        #[arg(long)]
        order_ids: Option<String>,

        /// Open the collections list restricted to these IDs (comma-separated)
        #[arg(long)]
        collection_ids: Option<String>,
    },

    /// Print one or more pages of a list
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Mark a complaint as closed
    CloseComplaint {
        /// Complaint ID
        id: String,
    },

    /// Manage the session token stored in the OS keyring
    #[command(subcommand)]
    Token(TokenCommand),

    /// Configuration file helpers
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum TokenCommand {
    /// Store a token for the profile, read from stdin when omitted
    Set {
        token: Option<String>,
    },
    /// Remove the stored token for the profile
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the configuration file location
    Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Resource {
    Orders,
    Collections,
    Complaints,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Which list to fetch
    #[arg(value_enum)]
    pub resource: Resource,

    /// Collection type: returned, money, dispatched, driver
    #[arg(short = 't', long = "type", value_parser = parse_collection_type)]
    pub collection_type: Option<CollectionType>,

    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Bind the search text to one field (e.g. order_id, customer_phone)
    #[arg(long)]
    pub search_by: Option<String>,

    /// Status filter action (e.g. delivered, pending, open)
    #[arg(long)]
    pub status: Option<String>,

    /// today, yesterday, this_week, this_month, this_year or custom
    #[arg(long, value_parser = parse_date_range)]
    pub date_range: Option<DateRange>,

    /// Day for the custom date range (YYYY-MM-DD); implies --date-range custom
    #[arg(long, value_parser = validate_custom_date)]
    pub date: Option<String>,

    /// Restrict to these record IDs (comma-separated)
    #[arg(long)]
    pub ids: Option<String>,

    /// Number of pages to fetch
    #[arg(long, default_value_t = 1)]
    pub pages: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_collection_type(s: &str) -> std::result::Result<CollectionType, String> {
    s.parse()
}

fn parse_date_range(s: &str) -> std::result::Result<DateRange, String> {
    s.parse()
}

/// Pick the profile named on the command line, or the configured default.
pub fn resolve_profile<'a>(config: &'a Config, name: Option<&str>) -> Result<&'a Profile> {
    match name {
        Some(name) => Ok(config.get_profile(name)?),
        None => config.get_default_profile().ok_or_else(|| {
            AppError::Config(ConfigError::ValidationError(
                "no profiles configured".to_string(),
            ))
        }),
    }
}

impl Resource {
    /// The screen for this resource. `--type` is only valid for collections.
    pub fn screen(self, collection_type: Option<CollectionType>) -> Result<Screen> {
        match (self, collection_type) {
            (Resource::Orders, None) => Ok(Screen::Orders),
            (Resource::Complaints, None) => Ok(Screen::Complaints),
            (Resource::Collections, kind) => Ok(Screen::Collections(kind.unwrap_or_default())),
            (_, Some(_)) => Err(AppError::invalid_argument(
                "--type only applies to collections",
            )),
        }
    }
}

impl ListArgs {
    pub fn screen(&self) -> Result<Screen> {
        self.resource.screen(self.collection_type)
    }

    /// Build a controller with every filter from the arguments applied.
    pub fn build_screen(&self, business_user_id: Option<String>) -> Result<Box<dyn ListScreen>> {
        if self.pages == 0 {
            return Err(AppError::invalid_argument("--pages must be at least 1"));
        }

        let screen = self.screen()?;
        let mut list = controller::for_screen(screen, business_user_id);
        let catalog = list.catalog().clone();

        if let Some(ids) = &self.ids {
            let binding = screen.id_list_binding().ok_or_else(|| {
                AppError::invalid_argument(format!("--ids is not supported for {}", screen))
            })?;
            list.sync_route(&NavigationContext::with_param(binding.route_param, ids.as_str()));
        }

        if let Some(key) = &self.search_by {
            let option = catalog.search_by(key).cloned().ok_or_else(|| {
                let known: Vec<&str> = catalog.search_by.iter().map(|o| o.action.as_str()).collect();
                AppError::invalid_argument(format!(
                    "unknown search field '{}' (expected one of: {})",
                    key,
                    known.join(", ")
                ))
            })?;
            list.set_search_by(Some(option));
        }

        if let Some(text) = &self.search {
            list.set_search_text(text.clone());
        }

        if let Some(status) = &self.status {
            let option = catalog.filter(status).cloned().ok_or_else(|| {
                let known: Vec<&str> = catalog.filter_by.iter().map(|o| o.action.as_str()).collect();
                AppError::invalid_argument(format!(
                    "unknown status '{}' (expected one of: {})",
                    status,
                    known.join(", ")
                ))
            })?;
            list.set_filter(Some(option));
        }

        let range = match (self.date_range, &self.date) {
            (Some(range), Some(_)) if !range.is_custom() => {
                return Err(AppError::invalid_argument(
                    "--date only applies to the custom date range",
                ))
            }
            (None, Some(_)) => Some(DateRange::Custom),
            (Some(DateRange::Custom), None) => {
                return Err(AppError::invalid_argument(
                    "--date-range custom needs --date",
                ))
            }
            (range, _) => range,
        };
        if let Some(date) = &self.date {
            list.set_custom_date(date.clone());
        }
        if let Some(range) = range {
            list.set_date_range(catalog.date_range(range).cloned());
        }

        Ok(list)
    }
}

/// Fetch the requested pages through a gateway.
///
/// Unlike the TUI, a failed page aborts the command.
pub async fn fetch_pages<G: DataGateway>(
    gateway: &G,
    list: &mut dyn ListScreen,
    pages: u32,
) -> Result<()> {
    let mut request = Some(list.refresh());
    let mut fetched = 0;

    while let Some(current) = request.take() {
        fetch_one(gateway, list, &current).await?;
        fetched += 1;
        if fetched < pages {
            request = list.load_more();
        }
    }

    info!(pages = fetched, loaded = list.len(), total = list.total_records(), "List fetched");
    Ok(())
}

async fn fetch_one<G: DataGateway>(
    gateway: &G,
    list: &mut dyn ListScreen,
    request: &PageRequest,
) -> Result<()> {
    let page = gateway
        .get_page::<Value>(&request.endpoint, &request.query)
        .await?;

    match list.apply_untyped(request, Ok(page)) {
        FetchOutcome::Applied { .. } | FetchOutcome::Stale => Ok(()),
        FetchOutcome::Failed => Err(AppError::Api(ApiError::InvalidResponse(
            list.last_error().unwrap_or("malformed page").to_string(),
        ))),
    }
}

pub async fn cmd_list(config: &Config, profile: Option<&str>, args: &ListArgs) -> Result<()> {
    let profile = resolve_profile(config, profile)?;
    let client = DeliveryClient::new(profile, &config.settings)?;

    let mut list = args.build_screen(profile.business_user_id.clone())?;
    fetch_pages(&client, list.as_mut(), args.pages).await?;

    let mut out = io::stdout().lock();
    if args.json {
        let body = json!({
            "data": list.items_json().map_err(|e| AppError::other(e.to_string()))?,
            "metadata": {"total_records": list.total_records()},
        });
        writeln!(
            out,
            "{}",
            serde_json::to_string_pretty(&body).map_err(|e| AppError::other(e.to_string()))?
        )?;
    } else {
        write_table(&mut out, list.headers(), &list.rows())?;
        writeln!(out, "\nShowing {} of {}", list.len(), list.total_records())?;
    }
    Ok(())
}

/// Left-aligned columns padded to the widest cell.
pub fn write_table(out: &mut impl Write, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.to_vec()))?;
    for row in rows {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

pub async fn cmd_close_complaint(config: &Config, profile: Option<&str>, id: &str) -> Result<()> {
    let profile = resolve_profile(config, profile)?;
    let client = DeliveryClient::new(profile, &config.settings)?;
    client.close_complaint(id).await?;
    println!("Complaint {} closed", id);
    Ok(())
}

pub fn cmd_token(config: &Config, profile: Option<&str>, command: &TokenCommand) -> Result<()> {
    let profile = resolve_profile(config, profile)?;
    match command {
        TokenCommand::Set { token } => {
            let token = match token {
                Some(token) => token.clone(),
                None => {
                    eprint!("Session token for '{}': ", profile.name);
                    io::stderr().flush()?;
                    let mut line = String::new();
                    io::stdin().lock().read_line(&mut line)?;
                    line
                }
            };
            let token = token.trim();
            if token.is_empty() {
                return Err(AppError::invalid_argument("token cannot be empty"));
            }
            auth::store_token(&profile.name, token)?;
            println!("Token stored for profile '{}'", profile.name);
        }
        TokenCommand::Clear => {
            auth::delete_token(&profile.name)?;
            println!("Token removed for profile '{}'", profile.name);
        }
    }
    Ok(())
}

pub fn cmd_config_path() -> Result<PathBuf> {
    Ok(Config::config_path()?)
}
