//! CLI definition and dispatch.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use stockroom_core::ProductId;
use stockroom_products::{NewProduct, Product, ProductChanges};

use crate::adapter::RestAdapter;
use crate::auth_flow::AuthFlow;
use crate::collection::{NOT_LOGGED_IN, ProductCollection};
use crate::config::ClientConfig;
use crate::session::Session;
use crate::view::{render_product, render_products};

#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(version)]
#[command(about = "Manage the Stockroom product catalogue")]
pub struct Cli {
    /// Backend base URL (overrides STOCKROOM_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in and remember the access token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored access token
    Logout,
    /// Show whether a session is active
    Status,
    /// List all products
    List,
    /// Add a product
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        price: f64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        stock: i64,
    },
    /// Edit a product; omitted fields keep their current value, an empty --description clears it
    Edit {
        id: ProductId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        price: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        stock: Option<i64>,
    },
    /// Delete a product
    Remove { id: ProductId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Everything a command needs, wired around one shared session.
pub struct App {
    session: Arc<Session>,
    auth: AuthFlow,
    products: ProductCollection,
}

impl App {
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> Self {
        let adapter = Arc::new(RestAdapter::new(config.api_url.clone()));
        Self {
            auth: AuthFlow::new(adapter.clone(), session.clone()),
            products: ProductCollection::new(adapter, session.clone(), config.sync_mode),
            session,
        }
    }

    pub fn products(&self) -> &ProductCollection {
        &self.products
    }

    /// Run one command. User-facing failures are written to `err` and reported
    /// as [`Outcome::Failure`]; only I/O on the writers is an `Err`.
    pub async fn run(&self, command: Command, out: &mut dyn Write, err: &mut dyn Write) -> Result<Outcome> {
        match command {
            Command::Login { username, password } => match self.auth.login(&username, &password).await {
                Ok(_) => {
                    writeln!(out, "Logged in as {username}.")?;
                    Ok(Outcome::Success)
                }
                Err(e) => fail(err, &e.user_message()),
            },
            Command::Logout => {
                self.auth.logout()?;
                writeln!(out, "Logged out.")?;
                Ok(Outcome::Success)
            }
            Command::Status => {
                if self.session.is_authenticated() {
                    writeln!(out, "Logged in.")?;
                } else {
                    writeln!(out, "{NOT_LOGGED_IN}")?;
                }
                Ok(Outcome::Success)
            }
            Command::List => {
                if !self.session.is_authenticated() {
                    return fail(err, NOT_LOGGED_IN);
                }
                match self.products.load().await {
                    Ok(()) => {
                        writeln!(out, "{}", render_products(&self.products.products()))?;
                        Ok(Outcome::Success)
                    }
                    Err(e) => fail(err, e.user_message()),
                }
            }
            Command::Add {
                name,
                description,
                price,
                stock,
            } => {
                if !self.session.is_authenticated() {
                    return fail(err, NOT_LOGGED_IN);
                }
                let input = NewProduct {
                    name,
                    description,
                    price,
                    stock,
                };
                match self.products.add(input).await {
                    Ok(product) => {
                        writeln!(out, "Added product {}.", product.id)?;
                        writeln!(out, "{}", render_product(&product))?;
                        Ok(Outcome::Success)
                    }
                    Err(e) => fail(err, e.user_message()),
                }
            }
            Command::Edit {
                id,
                name,
                description,
                price,
                stock,
            } => {
                if !self.session.is_authenticated() {
                    return fail(err, NOT_LOGGED_IN);
                }
                if let Err(e) = self.products.load().await {
                    return fail(err, e.user_message());
                }
                let Some(current) = self.products.find(id) else {
                    return fail(err, "Product not found.");
                };

                let changes = overlay(current, name, description, price, stock);
                match self.products.edit(id, changes).await {
                    Ok(product) => {
                        writeln!(out, "Updated product {}.", product.id)?;
                        writeln!(out, "{}", render_product(&product))?;
                        Ok(Outcome::Success)
                    }
                    Err(e) => fail(err, e.user_message()),
                }
            }
            Command::Remove { id } => {
                if !self.session.is_authenticated() {
                    return fail(err, NOT_LOGGED_IN);
                }
                match self.products.remove(id).await {
                    Ok(()) => {
                        writeln!(out, "Deleted product {id}.")?;
                        Ok(Outcome::Success)
                    }
                    Err(e) => fail(err, e.user_message()),
                }
            }
        }
    }
}

/// Full record for the PUT body: the current values with the given flags applied.
///
/// `--description ""` clears the description; the backend stores an empty
/// description as none.
fn overlay(
    current: Product,
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    stock: Option<i64>,
) -> ProductChanges {
    ProductChanges {
        name: Some(name.unwrap_or(current.name)),
        description: description.or(current.description),
        price: Some(price.unwrap_or(current.price)),
        stock: Some(stock.unwrap_or(current.stock)),
    }
}

fn fail(err: &mut dyn Write, message: &str) -> Result<Outcome> {
    writeln!(err, "{message}")?;
    Ok(Outcome::Failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_login_with_short_flags() {
        let cli = Cli::try_parse_from(["stockroom", "login", "-u", "admin", "-p", "secret123"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Login {
                username: "admin".to_string(),
                password: "secret123".to_string(),
            }
        );
        assert_eq!(cli.api_url, None);
    }

    #[test]
    fn parses_edit_with_global_api_url() {
        let cli = Cli::try_parse_from([
            "stockroom",
            "edit",
            "3",
            "--stock",
            "12",
            "--api-url",
            "http://example.test:8000",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://example.test:8000"));
        assert_eq!(
            cli.command,
            Command::Edit {
                id: ProductId::new(3),
                name: None,
                description: None,
                price: None,
                stock: Some(12),
            }
        );
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!(Cli::try_parse_from(["stockroom", "remove", "abc"]).is_err());
    }

    #[test]
    fn overlay_keeps_unspecified_fields() {
        let now = NaiveDate::from_ymd_opt(2025, 9, 28)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let current = Product {
            id: ProductId::new(1),
            name: "Mouse".to_string(),
            description: Some("Wireless".to_string()),
            price: 20.0,
            stock: 5,
            created_at: now,
            updated_at: now,
        };

        let changes = overlay(current, None, None, Some(18.5), None);
        assert_eq!(changes.name.as_deref(), Some("Mouse"));
        assert_eq!(changes.description.as_deref(), Some("Wireless"));
        assert_eq!(changes.price, Some(18.5));
        assert_eq!(changes.stock, Some(5));
    }

    #[test]
    fn overlay_passes_empty_description_through() {
        let now = NaiveDate::from_ymd_opt(2025, 9, 28)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let current = Product {
            id: ProductId::new(1),
            name: "Mouse".to_string(),
            description: Some("Wireless".to_string()),
            price: 20.0,
            stock: 5,
            created_at: now,
            updated_at: now,
        };

        let changes = overlay(current, None, Some(String::new()), None, None);
        assert_eq!(changes.description.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn product_commands_require_a_session() {
        let app = App::new(&ClientConfig::default(), Arc::new(Session::in_memory()));
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let outcome = app.run(Command::List, &mut out, &mut err).await.unwrap();

        assert_eq!(outcome, Outcome::Failure);
        assert!(out.is_empty());
        assert_eq!(String::from_utf8(err).unwrap(), "Not logged in.\n");
    }

    #[tokio::test]
    async fn status_reports_session() {
        let session = Arc::new(Session::in_memory());
        let app = App::new(&ClientConfig::default(), session.clone());

        let (mut out, mut err) = (Vec::new(), Vec::new());
        app.run(Command::Status, &mut out, &mut err).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Not logged in.\n");

        session.login("tok").unwrap();
        let mut out = Vec::new();
        app.run(Command::Status, &mut out, &mut err).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Logged in.\n");
    }
}
