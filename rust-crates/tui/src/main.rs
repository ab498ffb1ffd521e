use board_core::{
    scheduler::{
        DEFAULT_TICK_RATE,
        MAX_TICK_RATE,
    },
    session::SessionContext,
};
use board_tui::{
    client::{
        self,
        AppConfig,
    },
    config_client::ServerClient,
};
use clap::{
    ArgGroup,
    Parser,
    Subcommand,
};
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use session_store::{
    PlayerIdentity,
    SessionStore,
    resolve_session_dir,
};
use std::{
    path::PathBuf,
    sync::OnceLock,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
};
use url::Url;

const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
const LOG_FILE_PREFIX: &str = "board-client.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(version, about = "Terminal client for a live board game room", long_about = None)]
struct Args {
    /// HTTP base URL of the game server; the WebSocket URL is derived from it
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server_url: Url,

    /// Where the player identity is kept (defaults to ~/.board-client)
    #[arg(long)]
    session_dir: Option<String>,

    /// Log directory (defaults to <session dir>/logs)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a player name with the server and remember the issued id
    Register {
        #[arg(short, long)]
        name: String,
    },
    /// List the rooms open on the server
    Rooms,
    /// Open a new room hosted by the stored player and print its id
    CreateRoom,
    /// Join a room and open the live board
    #[command(group(ArgGroup::new("target").args(["room", "create"]).required(true)))]
    Play {
        #[arg(short, long)]
        room: Option<String>,

        /// Open a new room hosted by this player and join it
        #[arg(long)]
        create: bool,

        /// Use this player id instead of the stored one, and remember it
        #[arg(long, requires = "name")]
        player_id: Option<String>,

        #[arg(long)]
        name: Option<String>,

        /// Frames per second for animation and redraw
        #[arg(
            long,
            default_value_t = DEFAULT_TICK_RATE,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_TICK_RATE))
        )]
        tick_rate: u32,
    },
}

fn init_tracing(log_dir: PathBuf) {
    let appender = rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
}

async fn register(server_url: &Url, store: &SessionStore, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(eyre!("--name must not be blank"));
    }
    let server = ServerClient::new(server_url.as_str())?;
    let identity = server.register(name).await?;
    store
        .save(&identity)
        .map_err(|e| eyre!(e))
        .wrap_err("saving player identity")?;
    tracing::info!(player_id = %identity.player_id, "registered player");
    println!(
        "Registered {} as player {} (saved to {})",
        identity.player_name,
        identity.player_id,
        store.path().display()
    );
    Ok(())
}

async fn list_rooms(server_url: &Url) -> Result<()> {
    let server = ServerClient::new(server_url.as_str())?;
    let rooms = server.list_rooms().await?;
    if rooms.is_empty() {
        println!("No open rooms on {server}");
        return Ok(());
    }
    for room in rooms {
        let state = if room.game_started { "in game" } else { "waiting" };
        println!(
            "{}  {}/{} players  {state}",
            room.room_id, room.players, room.max_players
        );
    }
    Ok(())
}

async fn create_room(server_url: &Url, host: &PlayerIdentity) -> Result<String> {
    let server = ServerClient::new(server_url.as_str())?;
    let room_id = server.create_room(&host.player_id).await?;
    tracing::info!(%room_id, host = %host.player_id, "created room");
    Ok(room_id)
}

fn resolve_identity(
    store: &SessionStore,
    player_id: Option<String>,
    name: Option<String>,
) -> Result<PlayerIdentity> {
    if let (Some(player_id), Some(name)) = (player_id, name) {
        let identity = PlayerIdentity::new(player_id, name);
        store
            .save(&identity)
            .map_err(|e| eyre!(e))
            .wrap_err("saving player identity")?;
        return Ok(identity);
    }
    store
        .load()
        .map_err(|e| eyre!(e))
        .wrap_err("loading player identity")?
        .ok_or_else(|| {
            eyre!(
                "No player identity at {}; run `board-client register --name <name>` first",
                store.path().display()
            )
        })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let session_dir = resolve_session_dir(args.session_dir.as_deref());
    let log_dir = args.log_dir.unwrap_or_else(|| session_dir.join("logs"));
    init_tracing(log_dir);
    tracing::info!("starting board client");

    let store = SessionStore::new(&session_dir)
        .map_err(|e| eyre!(e))
        .wrap_err("opening session store")?;
    match args.command {
        Command::Register { name } => register(&args.server_url, &store, &name).await,
        Command::Rooms => list_rooms(&args.server_url).await,
        Command::CreateRoom => {
            let host = resolve_identity(&store, None, None)?;
            let room_id = create_room(&args.server_url, &host).await?;
            println!("Created room {room_id}");
            Ok(())
        }
        Command::Play {
            room,
            create,
            player_id,
            name,
            tick_rate,
        } => {
            let identity = resolve_identity(&store, player_id, name)?;
            let room = if create {
                create_room(&args.server_url, &identity).await?
            } else {
                room.unwrap_or_default().trim().to_string()
            };
            if room.is_empty() {
                return Err(eyre!("--room must not be blank"));
            }
            let session =
                SessionContext::new(room, identity.player_id, identity.player_name);
            let config = AppConfig {
                tick_rate,
                ..AppConfig::new(args.server_url, session)
            };
            client::run_app(config).await
        }
    }
}
