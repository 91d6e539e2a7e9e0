pub mod io;
pub mod menu;
pub mod output;

use std::io::{stdin, stdout, IsTerminal};
use std::path::Path;

use crate::config::ConfigManager;
use crate::core::AccountStore;
use crate::errors::CliError;
use crate::storage::CsvFileStorage;

pub use io::{EditorSource, LineSource, ScriptSource};
pub use menu::Menu;
pub use output::{Console, OutputPreferences};

/// Loads settings and the ledger from `base`, then runs the menu on the
/// process's stdin and stdout.
pub fn run_cli(base: &Path) -> Result<(), CliError> {
    let config = ConfigManager::in_dir(base).load()?;
    let storage = CsvFileStorage::new(config.ledger_path_in(base));
    let (store, metadata) = AccountStore::open(Box::new(storage), config.sync_policy)?;

    let out = stdout();
    let prefs = OutputPreferences {
        color: config.color && out.is_terminal(),
    };
    let console = Console::new(out.lock(), prefs);

    if stdin().is_terminal() {
        let mut menu = Menu::new(store, EditorSource::new()?, console);
        menu.greet(&metadata)?;
        menu.run()
    } else {
        let mut menu = Menu::new(store, ScriptSource::new(stdin().lock()), console);
        menu.greet(&metadata)?;
        menu.run()
    }
}
