use anyhow::{Context, Result};
use password_prowler::cli::{CliInterface, display_suggestion, parse_cli, resolve_catalog};
use password_prowler::logging;
use password_prowler::tui::TuiInterface;
use password_prowler::{GameError, GameSession, LocalAdvisor, PasswordAdvisor, game_loop};
use std::io;

fn main() -> Result<()> {
    let cli = parse_cli();

    let log_path = if cli.tui {
        logging::default_log_path()
    } else {
        None
    };
    logging::init(log_path.as_deref()).context("failed to initialise logging")?;

    let advisor = LocalAdvisor;
    if let Some(password) = &cli.suggest {
        display_suggestion(&advisor.suggest(password));
        return Ok(());
    }

    let mut catalog = resolve_catalog(&cli)
        .map_err(GameError::from)
        .context("cannot start a game")?;
    log::info!("Loaded {} passwords", catalog.len());

    let mut session = GameSession::new(cli.settings());
    let mut rng = rand::rng();

    if cli.tui {
        let mut interface = TuiInterface::new().context("failed to start the terminal UI")?;
        game_loop(&mut session, &mut catalog, &advisor, &mut rng, &mut interface);
    } else {
        let stdin = io::stdin();
        let mut interface = CliInterface::new(stdin.lock());
        game_loop(&mut session, &mut catalog, &advisor, &mut rng, &mut interface);
    }

    Ok(())
}
