//! Startup seeding of polls from a directory of `.properties` files.
//!
//! Each file holds `title`, `message` and `optN_title`/`optN_link` pairs
//! numbered from 1. Reading stops at the first incomplete pair.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use sqlx::AnyConnection;
use tracing::{debug, info, warn};

use crate::{
    dao::SqlDao,
    error::DaoError,
    properties::{Properties, PropertiesError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSeed {
    pub title: String,
    pub message: String,
    pub options: Vec<OptionSeed>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSeed {
    pub title: String,
    pub link: String,
}

pub fn read_poll_file(path: &Path) -> Result<PollSeed, PropertiesError> {
    let props = Properties::read(path)?;

    let title = props.require("title")?.to_owned();
    let message = props.require("message")?.to_owned();

    let mut options = Vec::new();
    for n in 1.. {
        let (Some(title), Some(link)) = (
            props.get(&format!("opt{n}_title")),
            props.get(&format!("opt{n}_link")),
        ) else {
            break;
        };
        options.push(OptionSeed {
            title: title.to_owned(),
            link: link.to_owned(),
        });
    }

    Ok(PollSeed {
        title,
        message,
        options,
    })
}

/// Every `.properties` file below `dir`, in path order. Symlinks are not followed.
fn seed_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();

            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && path.extension().is_some_and(|ext| ext == "properties") {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

pub async fn apply_seed(dao: &SqlDao, conn: &mut AnyConnection, seed: &PollSeed) -> Result<i64, DaoError> {
    let poll_id = dao.add_poll_if_absent(conn, &seed.title, &seed.message).await?;

    for option in &seed.options {
        dao.add_poll_option_if_absent(conn, &option.title, &option.link, poll_id, 0)
            .await?;
    }

    Ok(poll_id)
}

/// Loads every seed file under `dir`. Unreadable files are skipped.
///
/// Returns how many polls were applied.
pub async fn load_polls(dao: &SqlDao, conn: &mut AnyConnection, dir: &Path) -> Result<usize, DaoError> {
    let files = match seed_files(dir) {
        Ok(files) => files,
        Err(e) => {
            warn!("Skipping poll seeding, cannot read {}: {e}", dir.display());
            return Ok(0);
        }
    };

    let mut applied = 0;
    for path in files {
        let seed = match read_poll_file(&path) {
            Ok(seed) => seed,
            Err(e) => {
                warn!("Skipping seed file {}: {e}", path.display());
                continue;
            }
        };

        let poll_id = apply_seed(dao, conn, &seed).await?;
        debug!(poll_id, options = seed.options.len(), "Seeded poll '{}'", seed.title);
        applied += 1;
    }

    info!("Seeded {applied} poll(s) from {}", dir.display());
    Ok(applied)
}
