use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::{info, warn, Level};

use estate_desk::api::{AdminUpdate, ApiClient};
use estate_desk::config::Config;
use estate_desk::feed::{FeedEvent, FeedStorage, NotificationFeed};
use estate_desk::media::MediaProxy;
use estate_desk::models::{
    Agent, Category, NewAgent, NewProperty, Notification, NotificationKind, Property,
};
use estate_desk::search::{self, CountFilter, SearchParams, SortKey};

/// Workbench for the brokerage backend: browse listings the way the public
/// site filters them, manage records, and follow the notification feed.
#[derive(Parser)]
#[command(name = "estate-desk", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Browse and manage property listings
    #[command(subcommand)]
    Properties(PropertiesCommand),
    /// Browse and manage agents
    #[command(subcommand)]
    Agents(AgentsCommand),
    /// Manage dashboard accounts
    #[command(subcommand)]
    Admins(AdminsCommand),
    /// The notification feed
    #[command(subcommand)]
    Notifications(NotificationsCommand),
}

#[derive(Subcommand)]
enum PropertiesCommand {
    /// List listings, filtered and sorted like the public site
    List(ListArgs),
    /// One listing with its agent card and related listings
    Show { id: String },
    /// Create a listing
    Add(AddArgs),
    /// Delete a listing
    Rm { id: String },
}

#[derive(Args)]
struct ListArgs {
    /// buy | rent | off-plan | commercial-rent | commercial-buy
    #[arg(long)]
    category: Option<String>,
    /// Substring match over address, state, country and title
    #[arg(long)]
    location: Option<String>,
    /// Exact property type, e.g. "Apartment"
    #[arg(long = "type")]
    property_type: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    /// All, Studio, a number, or "3+"
    #[arg(long)]
    beds: Option<String>,
    #[arg(long)]
    baths: Option<String>,
    /// Comma-separated amenities that must all be present
    #[arg(long)]
    amenities: Option<String>,
    /// recent | price-desc | price-asc | bedrooms-desc | bedrooms-asc
    #[arg(long)]
    sort: Option<String>,
    /// Raw query string as the site would send it, e.g. "beds=3%2B&sort=price-asc"
    #[arg(long)]
    query: Option<String>,
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    price: f64,
    /// buy | rent | off-plan | commercial-rent | commercial-buy
    #[arg(long)]
    category: String,
    /// Property type, e.g. "Villa"
    #[arg(long = "type")]
    property_type: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    bedrooms: Option<u32>,
    #[arg(long)]
    bathrooms: Option<u32>,
    /// Floor area in square feet
    #[arg(long)]
    size: Option<f64>,
    #[arg(long)]
    description: Option<String>,
    /// Comma-separated amenities
    #[arg(long)]
    amenities: Option<String>,
    /// Id of the listing agent
    #[arg(long)]
    agent: Option<String>,
}

#[derive(Subcommand)]
enum AgentsCommand {
    /// All agents
    List,
    /// One agent's card
    Show { id: String },
    /// Create an agent
    Add {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete an agent
    Rm { id: String },
}

#[derive(Subcommand)]
enum AdminsCommand {
    /// All dashboard accounts
    List,
    /// Update an account
    Set {
        id: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Delete an account
    Rm { id: String },
}

#[derive(Subcommand)]
enum NotificationsCommand {
    /// Current feed, newest first
    List,
    /// Record a notification by hand
    Add {
        /// e.g. system, property-added, agent-deleted
        #[arg(long, default_value = "system")]
        kind: String,
        message: String,
        #[arg(long)]
        entity_id: Option<String>,
        #[arg(long)]
        entity_name: Option<String>,
    },
    /// Mark one notification read
    Read { id: String },
    /// Mark every notification read
    ReadAll,
    /// Delete one notification
    Rm { id: String },
    /// Empty the feed
    Clear,
    /// Poll the backend and print feed changes as they happen
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    info!("🏠 Estate Desk");
    info!(api = %config.api_url, "Talking to the brokerage backend");

    let client = ApiClient::new(&config.api_url)?
        .with_media_proxy(MediaProxy::new(&config.api_url, config.aws_bucket.clone()));

    match cli.command {
        Command::Properties(command) => run_properties(command, &client, &config).await,
        Command::Agents(command) => run_agents(command, &client, &config).await,
        Command::Admins(command) => run_admins(command, &client, &config).await,
        Command::Notifications(command) => run_notifications(command, &client, &config).await,
    }
}

async fn run_properties(
    command: PropertiesCommand,
    client: &ApiClient,
    config: &Config,
) -> Result<()> {
    match command {
        PropertiesCommand::List(args) => {
            let mut params = match &args.query {
                Some(query) => SearchParams::from_query(query),
                None => SearchParams {
                    location: args.location.clone(),
                    property_type: args.property_type.clone(),
                    min_price: args.min_price.filter(|v| v.is_finite()),
                    max_price: args.max_price.filter(|v| v.is_finite()),
                    beds: args.beds.as_deref().map(CountFilter::beds).unwrap_or_default(),
                    baths: args.baths.as_deref().map(CountFilter::baths).unwrap_or_default(),
                    amenities: args.amenities.as_deref().map(split_list).unwrap_or_default(),
                    sort: args.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
                    ..SearchParams::default()
                },
            };
            // The category comes from the page, never from the query string.
            params.category = args
                .category
                .as_deref()
                .map(|c| c.parse::<Category>())
                .transpose()?;

            let listings = client.list_properties().await?;
            let matched = search::run(&listings, &params);
            info!("✅ {} of {} listings match", matched.len(), listings.len());

            if args.json {
                println!("{}", serde_json::to_string_pretty(&matched)?);
            } else {
                print_properties(&matched);
            }
            Ok(())
        }
        PropertiesCommand::Show { id } => {
            let property = client.get_property(&id).await?;
            print_properties(std::slice::from_ref(&property));

            if let Some(agent_id) = &property.agent {
                match client.get_agent(agent_id).await {
                    Ok(agent) => print_agent(&agent),
                    Err(e) => warn!(error = %e, "Could not load the agent card"),
                }
            }

            match client.list_properties().await {
                Ok(listings) => {
                    let related = search::related(&property, &listings, 4);
                    if !related.is_empty() {
                        info!("📋 Related listings");
                        print_properties(&related);
                    }
                }
                Err(e) => warn!(error = %e, "Could not load related listings"),
            }
            Ok(())
        }
        PropertiesCommand::Add(args) => {
            let new = NewProperty {
                title: args.title.clone(),
                description: args.description.clone().unwrap_or_default(),
                address: args.address.clone(),
                country: args.country.clone().unwrap_or_default(),
                state: args.state.clone().unwrap_or_default(),
                zip: None,
                category: args.category.parse()?,
                property_type: args.property_type.clone(),
                price: args.price,
                size: args.size.unwrap_or_default(),
                bedrooms: args.bedrooms.unwrap_or_default(),
                bathrooms: args.bathrooms.unwrap_or_default(),
                kitchens: 0,
                rooms: 0,
                media: Vec::new(),
                featured_image: None,
                amenities: args.amenities.as_deref().map(split_list).unwrap_or_default(),
                agent: args.agent.clone(),
            };
            let created = client.create_property(&new).await?;
            info!("✅ Created \"{}\" with id {}", created.title, created.id);

            let feed = open_feed(config, client)?;
            record_change(
                &feed,
                NotificationKind::PropertyAdded,
                format!("Property \"{}\" was added", created.title),
                Some(created.id.clone()),
                Some(created.title.clone()),
            )
            .await;
            Ok(())
        }
        PropertiesCommand::Rm { id } => {
            // Best effort: the title makes a nicer notification.
            let title = client.get_property(&id).await.map(|p| p.title).ok();
            client.delete_property(&id).await?;
            info!("✅ Deleted property {id}");

            let feed = open_feed(config, client)?;
            let message = match &title {
                Some(title) => format!("Property \"{title}\" was deleted"),
                None => format!("Property {id} was deleted"),
            };
            record_change(&feed, NotificationKind::PropertyDeleted, message, Some(id), title).await;
            Ok(())
        }
    }
}

async fn run_agents(command: AgentsCommand, client: &ApiClient, config: &Config) -> Result<()> {
    match command {
        AgentsCommand::List => {
            let agents = client.list_agents().await?;
            info!("✅ {} agents", agents.len());
            for agent in &agents {
                print_agent(agent);
            }
            Ok(())
        }
        AgentsCommand::Show { id } => {
            let agent = client.get_agent(&id).await?;
            print_agent(&agent);
            Ok(())
        }
        AgentsCommand::Add {
            full_name,
            email,
            phone,
        } => {
            let new = NewAgent {
                full_name,
                email,
                phone,
                whatsapp: None,
                image: None,
                bio: None,
                social_links: Vec::new(),
                languages: Vec::new(),
                vcard: None,
            };
            let created = client.create_agent(&new).await?;
            info!("✅ Created agent \"{}\" with id {}", created.full_name, created.id);

            let feed = open_feed(config, client)?;
            record_change(
                &feed,
                NotificationKind::AgentAdded,
                format!("Agent \"{}\" was added", created.full_name),
                Some(created.id.clone()),
                Some(created.full_name.clone()),
            )
            .await;
            Ok(())
        }
        AgentsCommand::Rm { id } => {
            let name = client.get_agent(&id).await.map(|a| a.full_name).ok();
            client.delete_agent(&id).await?;
            info!("✅ Deleted agent {id}");

            let feed = open_feed(config, client)?;
            let message = match &name {
                Some(name) => format!("Agent \"{name}\" was deleted"),
                None => format!("Agent {id} was deleted"),
            };
            record_change(&feed, NotificationKind::AgentDeleted, message, Some(id), name).await;
            Ok(())
        }
    }
}

async fn run_admins(command: AdminsCommand, client: &ApiClient, config: &Config) -> Result<()> {
    match command {
        AdminsCommand::List => {
            let admins = client.list_admins().await?;
            info!("✅ {} accounts", admins.len());
            for (i, admin) in admins.iter().enumerate() {
                println!("{}. {}", i + 1, admin.username);
                if let Some(full_name) = &admin.full_name {
                    println!("   Name: {full_name}");
                }
                if let Some(email) = &admin.email {
                    println!("   Email: {email}");
                }
                println!("   ID: {}", admin.id);
                println!();
            }
            Ok(())
        }
        AdminsCommand::Set {
            id,
            username,
            full_name,
            email,
        } => {
            let update = AdminUpdate {
                username,
                full_name,
                email,
            };
            let admin = client.update_admin(&id, &update).await?;
            info!("✅ Updated account \"{}\"", admin.username);

            let feed = open_feed(config, client)?;
            record_change(
                &feed,
                NotificationKind::AdminUpdated,
                format!("Admin \"{}\" was updated", admin.username),
                Some(admin.id.clone()),
                Some(admin.username.clone()),
            )
            .await;
            Ok(())
        }
        AdminsCommand::Rm { id } => {
            client.delete_admin(&id).await?;
            info!("✅ Deleted account {id}");

            let feed = open_feed(config, client)?;
            record_change(
                &feed,
                NotificationKind::AdminDeleted,
                format!("Admin {id} was deleted"),
                Some(id),
                None,
            )
            .await;
            Ok(())
        }
    }
}

async fn run_notifications(
    command: NotificationsCommand,
    client: &ApiClient,
    config: &Config,
) -> Result<()> {
    let feed = open_feed(config, client)?;
    match command {
        NotificationsCommand::List => {
            let items = feed.fetch_all().await?;
            if items.is_empty() {
                info!("🔔 No notifications");
                return Ok(());
            }
            info!("🔔 {} notifications, {} unread", items.len(), feed.unread_count());
            print_notifications(&items);
            Ok(())
        }
        NotificationsCommand::Add {
            kind,
            message,
            entity_id,
            entity_name,
        } => {
            let record = feed.add(kind.parse()?, message, entity_id, entity_name).await?;
            if record.is_local() {
                info!("💾 Backend unreachable; kept locally as {}", record.id);
            } else {
                info!("✅ Recorded as {}", record.id);
            }
            Ok(())
        }
        NotificationsCommand::Read { id } => {
            feed.mark_read(&id).await?;
            info!("✅ Marked {id} read; {} still unread", feed.unread_count());
            Ok(())
        }
        NotificationsCommand::ReadAll => {
            feed.mark_all_read().await?;
            info!("✅ All read");
            Ok(())
        }
        NotificationsCommand::Rm { id } => {
            feed.delete(&id).await?;
            info!("✅ Deleted {id}");
            Ok(())
        }
        NotificationsCommand::Clear => {
            feed.clear_all().await?;
            info!("✅ Feed cleared");
            Ok(())
        }
        NotificationsCommand::Watch => watch(&feed, config.poll_secs).await,
    }
}

/// Single poll loop: one timer refreshes the feed for the whole process, and
/// feed events print as they are applied.
async fn watch(feed: &NotificationFeed, poll_secs: u64) -> Result<()> {
    let mut events = feed.subscribe();
    let mut ticker = tokio::time::interval(Duration::from_secs(poll_secs));
    info!(every_secs = poll_secs, "Watching the notification feed; Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let items = feed.fetch_all().await?;
                info!(total = items.len(), unread = feed.unread_count(), "Feed refreshed");
            }
            event = events.recv() => match event {
                Ok(event) => describe_event(&event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                break;
            }
        }
    }
    Ok(())
}

fn describe_event(event: &FeedEvent) {
    match event {
        FeedEvent::Added(n) => info!("🔔 {}", n.message),
        FeedEvent::MarkedRead(id) => info!("Read: {id}"),
        FeedEvent::MarkedAllRead => info!("All notifications marked read"),
        FeedEvent::Deleted(id) => info!("Deleted: {id}"),
        FeedEvent::Cleared => info!("Feed cleared"),
        FeedEvent::RolledBack => warn!("The backend refused a change; it was rolled back"),
    }
}

fn open_feed(config: &Config, client: &ApiClient) -> Result<NotificationFeed> {
    let storage = match &config.cache_dir {
        Some(dir) => FeedStorage::at_path(dir.join("notifications.json")),
        None => FeedStorage::default_location()?,
    };
    NotificationFeed::open(Arc::new(client.clone()), storage)
}

/// Record a change in the feed without letting a failure block the command
/// that caused it.
async fn record_change(
    feed: &NotificationFeed,
    kind: NotificationKind,
    message: String,
    entity_id: Option<String>,
    entity_name: Option<String>,
) {
    if let Err(e) = feed.add(kind, message, entity_id, entity_name).await {
        warn!(error = %e, "Could not record the notification");
    }
}

fn print_properties(properties: &[Property]) {
    for (i, property) in properties.iter().enumerate() {
        println!("{}. {} ({})", i + 1, property.title, property.price);
        println!("   {} | {}", property.category, property.property_type);
        println!(
            "   {} bed, {} bath, {} sqft",
            property.bedrooms, property.bathrooms, property.size
        );
        println!("   {}, {}, {}", property.address, property.state, property.country);
        if !property.amenities.is_empty() {
            println!("   Amenities: {}", property.amenities.join(", "));
        }
        println!("   ID: {}", property.id);
        println!();
    }
}

fn print_agent(agent: &Agent) {
    println!("{}", agent.full_name);
    if let Some(email) = &agent.email {
        println!("   Email: {email}");
    }
    if let Some(phone) = &agent.phone {
        println!("   Phone: {phone}");
    }
    if !agent.languages.is_empty() {
        println!("   Languages: {}", agent.languages.join(", "));
    }
    for link in &agent.social_links {
        println!("   {}: {}", link.platform, link.url);
    }
    println!("   ID: {}", agent.id);
    println!();
}

fn print_notifications(items: &[Notification]) {
    for (i, item) in items.iter().enumerate() {
        let marker = if item.read { "  " } else { "• " };
        println!("{}. {}{}", i + 1, marker, item.message);
        println!("   {} | {}", item.time_ago, item.kind.as_str());
        if let Some(created_by) = &item.created_by {
            println!("   By: {created_by}");
        }
        println!("   ID: {}", item.id);
        println!();
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
