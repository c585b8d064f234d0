use std::{env, fs, io};

use comms::specs::server::ServerSpec;
use log::{error, info};
use tokio::{signal, task};

use parameter_server::service::ServerBuilder;

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let path = env::var("SPEC").map_err(io::Error::other)?;
    let mut spec = ServerSpec::from_json(&fs::read_to_string(&path)?)?;

    if let Ok(port) = env::var("PORT") {
        spec.port = port.parse().map_err(io::Error::other)?;
    }

    let service = ServerBuilder::new().build(&spec).map_err(io::Error::other)?;
    info!("workers should reach the parameter server at {}", service.master_addr());

    tokio::select! {
        _ = service.stopped() => {}
        _ = signal::ctrl_c() => {
            info!("received SIGTERM");
        }
    }

    let exhausted = service.budget_exhausted();
    task::spawn_blocking(move || service.stop()).await??;

    if exhausted {
        error!("the error budget was exhausted, exiting");
        return Err(io::Error::other("error budget exhausted"));
    }

    Ok(())
}
