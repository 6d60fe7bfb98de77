use std::time::Duration;

use clap::{Parser, Subcommand};
use hunt_logic::{Coordinate, DEFAULT_STEP_LENGTH_METERS, HuntSettings};
use hunt_test_shared::*;
use interprocess::local_socket::{tokio::Stream, traits::tokio::Stream as _};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// How long to wait for more responses before hanging up
const QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Parser)]
struct Cli {
    /// Name of the local socket the test daemon is listening on
    socket: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new hunt
    Start {
        /// Latitude of the treasure, defaults to the built-in target
        #[arg(long, allow_hyphen_values = true, requires = "target_long")]
        target_lat: Option<f64>,
        /// Longitude of the treasure
        #[arg(long, allow_hyphen_values = true, requires = "target_lat")]
        target_long: Option<f64>,
        /// Length of a step in meters
        #[arg(long, default_value_t = DEFAULT_STEP_LENGTH_METERS)]
        step_length: f64,
        /// Act as if the player refused location access
        #[arg(long)]
        deny: bool,
    },
    /// Send a GPS fix to the running hunt
    Fix {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        long: f64,
    },
    /// Print the current state of the hunt
    State,
    /// Quit the running hunt
    Quit,
}

impl Commands {
    fn into_request(self) -> Result<TestingRequest> {
        Ok(match self {
            Self::Start {
                target_lat,
                target_long,
                step_length,
                deny,
            } => {
                let target = match target_lat.zip(target_long) {
                    Some((lat, long)) => Coordinate::new(lat, long).context("Invalid target")?,
                    None => HuntSettings::default().target,
                };
                let settings =
                    HuntSettings::new(target, step_length).context("Invalid hunt settings")?;
                TestingRequest::StartHunt {
                    settings,
                    grant_location: !deny,
                }
            }
            Self::Fix { lat, long } => {
                TestingRequest::Fix(Coordinate::new(lat, long).context("Invalid fix")?)
            }
            Self::State => TestingRequest::GetState,
            Self::Quit => TestingRequest::Quit,
        })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let cli = Cli::parse();

    let req = cli.command.into_request()?;

    let socket_name = get_socket_name(cli.socket.clone()).context("Failed to get socket name")?;

    let stream = Stream::connect(socket_name)
        .await
        .context("Failed to connect to socket")?;

    let mut recv = BufReader::new(&stream);
    let mut send = &stream;

    send.write_all(&encode_line(&req)?)
        .await
        .context("Failed to send request")?;

    let mut line = String::with_capacity(256);
    loop {
        line.clear();
        match tokio::time::timeout(QUIET_PERIOD, recv.read_line(&mut line)).await {
            Ok(Ok(0)) | Err(_) => break,
            Ok(Ok(_)) => {
                let resp = serde_json::from_str::<TestingResponse>(&line)
                    .context("Daemon sent a bad response")?;
                println!("{resp:?}");
            }
            Ok(Err(why)) => bail!("Failed to read from daemon: {why}"),
        }
    }

    Ok(())
}
