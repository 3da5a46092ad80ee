use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use eduview::app::{build_dispatcher, run_command, today};
use eduview::cli::{Cli, Command};
use eduview::config::{Settings, settings_from_cli};
use eduview::controller::Controller;
use eduview::domain::EduError;
use eduview::logging::{init_file_logging, init_stderr_logging};
use eduview::model::{Model, Status};
use eduview::store::ClientStore;
use eduview::ui::DashboardUI;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(cli: Cli) -> Result<(), EduError> {
    let settings = settings_from_cli(&cli)?;
    match cli.command {
        None | Some(Command::Dashboard) => {
            init_file_logging(&settings.log_file, cli.verbose)?;
            let result = dashboard(&settings);
            ratatui::restore();
            result
        }
        Some(command) => {
            init_stderr_logging(cli.verbose)?;
            run_command(command, &settings, today(), &mut io::stdout().lock())
        }
    }
}

fn dashboard(settings: &Settings) -> Result<(), EduError> {
    info!("Starting eduview dashboard");
    let store = ClientStore::open(&settings.state_file)?;
    let dispatcher = build_dispatcher(settings)?;
    let mut model = Model::init(settings, store, dispatcher);
    let ui = DashboardUI::new();
    let controller = Controller::new(settings.event_poll_time);

    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(model.get_uidata(), f))?;

        // Handle events and map to a Message
        let message = controller.handle_event(&model)?;
        model.update(message)?;
        model.poll_workers()?;
    }
    info!("Bye");
    Ok(())
}
