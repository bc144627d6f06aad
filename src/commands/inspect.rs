//! Implementation of the `sidelock inspect` command.
//!
//! Prints the marker document for a target file without participating in
//! coordination — nothing is claimed, watched, or deleted.

use crate::cli::InspectArgs;
use sidelock::error::{Result, SidelockError};
use sidelock::lock::{LockDocument, marker_path_for};

pub fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let marker = marker_path_for(&args.file);

    if !marker.exists() {
        println!("No lock marker for '{}'.", args.file.display());
        return Ok(());
    }

    let doc = LockDocument::from_file(&marker)?;
    if doc.is_empty() {
        return Err(SidelockError::MalformedDocument(format!(
            "lock file '{}' carries an empty document",
            marker.display()
        )));
    }

    println!("Lock marker: {}", marker.display());
    println!("  Name:       {}", doc.name);
    if let Some(pid) = doc.pid {
        println!("  PID:        {}", pid);
    }
    println!("  Id:         {}", doc.id);
    println!("  Version:    {}", doc.version);
    println!("  Org:        {}", doc.org);
    println!("  Domain:     {}", doc.domain);
    println!("  Timestamp:  {}", doc.timestamp);
    if let Some(owner) = &doc.owner {
        println!("  Owner:      {}", owner);
    }
    for (key, value) in &doc.extra {
        println!("  {}: {}", key, value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidelock::identity::AppIdentity;
    use tempfile::TempDir;

    #[test]
    fn inspect_without_marker_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("doc.txt");
        std::fs::write(&file, "contents").unwrap();

        let result = cmd_inspect(InspectArgs { file });
        assert!(result.is_ok());
    }

    #[test]
    fn inspect_valid_marker_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("doc.txt");
        std::fs::write(&file, "contents").unwrap();

        let identity = AppIdentity::new("scribe", "1.0", "Acme", "acme.example");
        let doc = LockDocument::new(&identity, "token-1");
        std::fs::write(marker_path_for(&file), doc.to_json().unwrap()).unwrap();

        let result = cmd_inspect(InspectArgs { file });
        assert!(result.is_ok());
    }

    #[test]
    fn inspect_garbage_marker_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("doc.txt");
        std::fs::write(&file, "contents").unwrap();
        std::fs::write(marker_path_for(&file), "not json").unwrap();

        let result = cmd_inspect(InspectArgs { file });
        assert!(matches!(
            result,
            Err(SidelockError::MalformedDocument(_))
        ));
    }

    #[test]
    fn inspect_empty_marker_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("doc.txt");
        std::fs::write(&file, "contents").unwrap();
        std::fs::write(marker_path_for(&file), "{}").unwrap();

        let result = cmd_inspect(InspectArgs { file });
        assert!(matches!(
            result,
            Err(SidelockError::MalformedDocument(_))
        ));
    }
}
