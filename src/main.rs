//! `korri-tx` binary: transmit one frame every period on a SocketCAN
//! interface until ctrl-c or a send failure.
//!
//! ```bash
//! sudo ip link add dev vcan0 type vcan && sudo ip link set up vcan0
//! korri-tx --interface vcan0 --period-ms 100
//! ```
use std::process::ExitCode;

use clap::Parser;

use korri_tx::protocol::{periodic::DEFAULT_PERIOD_MS, transport::DEFAULT_INTERFACE};

/// Periodic CAN frame transmitter.
#[derive(Parser, Debug)]
#[command(name = "korri-tx", version, about)]
struct Args {
    /// CAN interface to bind.
    #[arg(short, long, default_value = DEFAULT_INTERFACE)]
    interface: String,

    /// Transmit period in milliseconds.
    #[arg(short, long, default_value_t = DEFAULT_PERIOD_MS)]
    period_ms: u64,
}

#[cfg(target_os = "linux")]
#[tokio::main]
async fn main() -> ExitCode {
    use korri_tx::config::TxConfig;
    use korri_tx::protocol::{
        lifecycle::LifecycleController,
        periodic::run_state::{RunState, StopReason},
    };
    use std::time::Duration;

    korri_tx::trace::init_tracing();
    let args = Args::parse();
    let config = TxConfig::new(args.interface).with_period(Duration::from_millis(args.period_ms));

    let mut controller = match LifecycleController::initialize(&config) {
        Ok(controller) => controller,
        Err(err) => {
            tracing::error!(%err, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    let stop = controller.run_control();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("interrupt received, stopping transmitter");
                stop.request_stop(StopReason::Requested);
            }
            Err(err) => tracing::error!(%err, "cannot listen for ctrl-c"),
        }
    });

    let state = controller.wait().await;
    let report = controller.shutdown().await;

    match state {
        RunState::StoppingFaulted => {
            if let Some(fault) = report.and_then(|report| report.fault) {
                tracing::error!(%fault, "transmitter stopped on failure");
            }
            ExitCode::FAILURE
        }
        _ => {
            tracing::info!("quitting...");
            ExitCode::SUCCESS
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn main() -> ExitCode {
    let _ = Args::parse();
    eprintln!("korri-tx requires Linux SocketCAN");
    ExitCode::FAILURE
}
