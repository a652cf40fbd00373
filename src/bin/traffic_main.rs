// traffic_main.rs
use std::process::ExitCode;

use traffic_lights::cli::{parse_args, UsageError};
use traffic_lights::communication::console::{banner, render, OutputFormat};
use traffic_lights::communication::event_channel;
use traffic_lights::{run_simulation, SimulationConfig, SimulationError};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            println!("{e}");
            return ExitCode::from(2);
        }
    };

    let config = match &args.config_path {
        Some(path) => match SimulationConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };
    if let Err(SimulationError::VehicleCountOutOfRange { .. }) =
        config.check_vehicle_count(args.vehicle_count)
    {
        println!("{}", UsageError::InvalidCount);
        return ExitCode::from(2);
    }

    if args.format == OutputFormat::Console {
        println!("{}", banner(args.vehicle_count));
    }

    let (events, mut rx) = event_channel();
    let format = args.format;
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(line) = render(&event, format) {
                println!("{line}");
            } else {
                log::debug!("{}", event);
            }
        }
    });

    let result = run_simulation(args.vehicle_count, config, events).await;
    if let Err(e) = printer.await {
        log::error!("Event printer failed: {}", e);
    }

    match result {
        Ok(report) => {
            log::info!("Vehicles per direction: {:?}", report.vehicles_per_direction);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Simulation failed: {e}");
            ExitCode::FAILURE
        }
    }
}
