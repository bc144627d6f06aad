//! Implementation of the `sidelock watch` command.
//!
//! Follows a target file's lock status, printing one line per settled
//! state. The command is a full coordination participant: it claims the
//! lock when nobody holds it and releases it on exit. External changes to
//! the marker are folded in on every poll tick.

use crate::cli::{WatchArgs, parse_strategy};
use sidelock::error::Result;
use sidelock::lock::LockFile;
use std::thread;
use std::time::Duration;

pub fn cmd_watch(args: WatchArgs) -> Result<()> {
    let identity = args.identity.resolve()?;
    let strategy = parse_strategy(&args.strategy)?;

    let mut lock = LockFile::new(identity);
    lock.set_strategy(strategy);
    lock.on_settled(|status| println!("{}", status));

    eprintln!("sidelock watch started");
    eprintln!("  file:     {}", args.file.display());
    eprintln!("  strategy: {}", args.strategy);
    eprintln!("  interval: {}ms", args.interval_ms);
    eprintln!();

    lock.set_path(&args.file);

    if args.once {
        return Ok(());
    }

    loop {
        lock.poll();
        thread::sleep(Duration::from_millis(args.interval_ms.max(50)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::IdentityArgs;
    use sidelock::lock::marker_path_for;
    use tempfile::TempDir;

    fn watch_args(file: std::path::PathBuf) -> WatchArgs {
        WatchArgs {
            file,
            interval_ms: 50,
            once: true,
            strategy: "multiple_read_single_write".to_string(),
            identity: IdentityArgs {
                identity: None,
                app_name: Some("test-watch".to_string()),
                app_version: None,
                org: None,
                domain: None,
            },
        }
    }

    #[test]
    fn watch_once_on_existing_file_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("doc.txt");
        std::fs::write(&file, "contents").unwrap();

        let result = cmd_watch(watch_args(file.clone()));
        assert!(result.is_ok());

        // The watcher claimed while running and released on drop.
        assert!(!marker_path_for(&file).exists());
    }

    #[test]
    fn watch_once_on_missing_file_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("absent.txt");

        let result = cmd_watch(watch_args(file));
        assert!(result.is_ok());
    }

    #[test]
    fn watch_bad_strategy_is_user_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("doc.txt");
        std::fs::write(&file, "contents").unwrap();

        let mut args = watch_args(file);
        args.strategy = "nonsense".to_string();

        assert!(cmd_watch(args).is_err());
    }
}
