//! Commands shared by `destinations` and `stories`.

use crate::app::App;
use crate::cli::print_notices;
use crate::core::{Entity, LocalImage};
use crate::error::{Error, Result};
use dialoguer::Confirm;
use std::path::Path;

/// Read an image argument: a `data:` URI or a file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the URI is malformed.
pub fn read_image(arg: &str) -> Result<LocalImage> {
    if arg.starts_with("data:") {
        LocalImage::from_data_uri(arg)
    } else {
        LocalImage::from_path(Path::new(arg))
    }
}

/// Print one line per entity.
///
/// # Errors
///
/// Returns an error if the list cannot be loaded.
pub fn list<E: Entity>(app: &App, line: impl Fn(&E) -> String) -> Result<()> {
    let board = app.load_board::<E>()?;
    if board.items().is_empty() {
        println!("No {} yet.", E::KIND.plural());
        return Ok(());
    }

    for item in board.items() {
        println!("{}", line(item));
    }
    println!("{}", "─".repeat(60));
    println!("Showing {} {}", board.items().len(), E::KIND.plural());
    Ok(())
}

/// Show one entity through the read-only dialog.
///
/// # Errors
///
/// Returns an error if the list cannot be loaded or `id` is unknown.
pub fn show<E: Entity>(
    app: &App,
    id: &E::Id,
    details: impl Fn(&E) -> Vec<(&'static str, String)>,
) -> Result<()> {
    let mut board = app.load_board::<E>()?;
    let entity = board
        .get(id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("{} {id}", E::KIND)))?;
    board.open_view(&entity);

    let dialog = board.dialog();
    println!("{}", dialog.heading());
    println!("{}", "─".repeat(60));
    for (label, value) in details(&entity) {
        println!("{label:<12} {value}");
    }
    if let Some(draft) = dialog.draft() {
        println!("{:<12} {}", "Image", draft.preview.src());
    }
    board.cancel();
    Ok(())
}

/// Create a new entity from `fill` and an optional image.
///
/// # Errors
///
/// Returns an error without an admin session, or if the upload or insert
/// fails.
pub fn add<E: Entity>(app: &App, image: Option<&str>, fill: impl FnOnce(&mut E)) -> Result<()> {
    let gate = app.gate();
    let mut board = app.load_board::<E>()?;
    board.open_add(gate)?;
    board.edit_draft(gate, fill)?;
    if let Some(arg) = image {
        board.choose_image(gate, read_image(arg)?)?;
    }

    let saved = board.save(gate, app.content(), app.objects())?;
    print_notices(&mut board);
    println!("id: {}", saved.id());
    Ok(())
}

/// Apply `change` (and an optional new image) to an existing entity.
///
/// # Errors
///
/// Returns an error without an admin session, if `id` is unknown, or if the
/// upload or update fails.
pub fn edit<E: Entity>(
    app: &App,
    id: &E::Id,
    image: Option<&str>,
    change: impl FnOnce(&mut E),
) -> Result<()> {
    let gate = app.gate();
    let mut board = app.load_board::<E>()?;
    board.open_edit(gate, id)?;
    board.edit_draft(gate, change)?;
    if let Some(arg) = image {
        board.choose_image(gate, read_image(arg)?)?;
    }

    board.save(gate, app.content(), app.objects())?;
    print_notices(&mut board);
    Ok(())
}

/// Delete an entity after confirmation (skipped with `yes`).
///
/// # Errors
///
/// Returns an error without an admin session, if `id` is unknown, if the
/// prompt fails, or if the store rejects the delete.
pub fn delete<E: Entity>(app: &App, id: &E::Id, yes: bool) -> Result<()> {
    let gate = app.gate();
    let mut board = app.load_board::<E>()?;
    board.request_delete(gate, id)?;

    let confirmed = yes
        || Confirm::new()
            .with_prompt(format!(
                "Are you sure you want to delete this {}?",
                E::KIND.label().to_lowercase()
            ))
            .default(false)
            .interact()?;
    if !confirmed {
        board.decline_delete();
        println!("Operation cancelled");
        return Ok(());
    }

    board.confirm_delete(gate, app.content())?;
    print_notices(&mut board);
    Ok(())
}

/// Overwrite `field` when a new value was given.
pub fn set_if(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_image_accepts_data_uri() {
        let image = read_image("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(image.extension, "png");
    }

    #[test]
    fn read_image_reads_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kyoto.jpg");
        std::fs::write(&path, b"jpeg").unwrap();
        let image = read_image(path.to_str().unwrap()).unwrap();
        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(image.bytes, b"jpeg");
    }

    #[test]
    fn read_image_missing_file_fails() {
        assert!(read_image("/definitely/not/here.png").is_err());
    }

    #[test]
    fn set_if_only_overwrites_given_values() {
        let mut field = "old".to_string();
        set_if(&mut field, None);
        assert_eq!(field, "old");
        set_if(&mut field, Some("new".to_string()));
        assert_eq!(field, "new");
    }
}
