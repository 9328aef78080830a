//! Anki package (`.apkg`) writing and reading.
//!
//! A package is a zip archive with three kinds of members:
//!
//! | Member | Content |
//! |---|---|
//! | `collection.anki2` | SQLite collection, schema version 11 |
//! | `media` | JSON map from member name to media file name, `{"0": "dog_1a2b3c4d.jpg"}` |
//! | `0`, `1`, ... | The media files themselves |
//!
//! The collection holds one note type with a `Front` and a `Back` field and
//! one deck. Every card of the [`Deck`] becomes one note and one card.
//!
//! Ids are stable where Anki cares about stability: the deck id is derived
//! from the deck name and note GUIDs from the deck name plus both fields, so
//! re-importing a rebuilt package updates notes instead of duplicating them.
//!
//! The archive is written next to its destination as `<name>.apkg.tmp` and
//! renamed into place once complete. On failure the temp file is removed, so
//! a package path either holds a complete package or nothing new.

use crate::deck::Deck;
use crate::workdir::{PACKAGE_TMP_SUFFIX, leftovers};
use rusqlite::{Connection, params};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const COLLECTION_MEMBER: &str = "collection.anki2";
const MEDIA_MEMBER: &str = "media";
const FIELD_SEPARATOR: char = '\x1f';
const SCHEMA_VERSION: i64 = 11;
const DEFAULT_DECK_ID: i64 = 1;
const MODEL_ID: i64 = 1607392319;
const MODEL_NAME: &str = "WordFlash Basic";

const CARD_CSS: &str = ".card { font-family: arial; font-size: 24px; text-align: center; \
color: black; background-color: white; }\n.image img { max-width: 90%; max-height: 60vh; }";

const SCHEMA: &str = "
CREATE TABLE col (
    id integer primary key, crt integer not null, mod integer not null,
    scm integer not null, ver integer not null, dty integer not null,
    usn integer not null, ls integer not null, conf text not null,
    models text not null, decks text not null, dconf text not null,
    tags text not null
);
CREATE TABLE notes (
    id integer primary key, guid text not null, mid integer not null,
    mod integer not null, usn integer not null, tags text not null,
    flds text not null, sfld integer not null, csum integer not null,
    flags integer not null, data text not null
);
CREATE TABLE cards (
    id integer primary key, nid integer not null, did integer not null,
    ord integer not null, mod integer not null, usn integer not null,
    type integer not null, queue integer not null, due integer not null,
    ivl integer not null, factor integer not null, reps integer not null,
    lapses integer not null, left integer not null, odue integer not null,
    odid integer not null, flags integer not null, data text not null
);
CREATE TABLE revlog (
    id integer primary key, cid integer not null, usn integer not null,
    ease integer not null, ivl integer not null, lastIvl integer not null,
    factor integer not null, time integer not null, type integer not null
);
CREATE TABLE graves (
    usn integer not null, oid integer not null, type integer not null
);
CREATE INDEX ix_notes_usn ON notes (usn);
CREATE INDEX ix_cards_usn ON cards (usn);
CREATE INDEX ix_revlog_usn ON revlog (usn);
CREATE INDEX ix_cards_nid ON cards (nid);
CREATE INDEX ix_cards_sched ON cards (did, queue, due);
CREATE INDEX ix_revlog_cid ON revlog (cid);
CREATE INDEX ix_notes_csum ON notes (csum);
";

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Deck '{0}' has no cards")]
    EmptyDeck(String),
    #[error("Media file missing: {0}")]
    MissingMedia(PathBuf),
    #[error("Not a valid package: {0}")]
    Invalid(String),
}

/// What was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    pub path: PathBuf,
    pub notes: usize,
    pub media: usize,
}

/// One note read back from a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNote {
    pub front: String,
    pub back: String,
    pub tags: Vec<String>,
}

/// Contents of a package, as far as `inspect` and tests need them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageContents {
    pub deck_names: Vec<String>,
    pub notes: Vec<StoredNote>,
    /// Media file names in member order.
    pub media: Vec<String>,
}

/// Write `deck` to `path` atomically.
pub fn write_package(deck: &Deck, path: &Path) -> Result<PackageSummary, PackageError> {
    if deck.is_empty() {
        return Err(PackageError::EmptyDeck(deck.name.clone()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = temp_path_for(path);
    leftovers().track(&tmp_path);
    let result = write_archive(deck, &tmp_path)
        .and_then(|media| fs::rename(&tmp_path, path).map(|_| media).map_err(Into::into));
    leftovers().untrack(&tmp_path);
    match result {
        Ok(media) => {
            log::info!("Wrote {} ({} notes, {} media)", path.display(), deck.len(), media);
            Ok(PackageSummary {
                path: path.to_path_buf(),
                notes: deck.len(),
                media,
            })
        }
        Err(e) => {
            if tmp_path.exists()
                && let Err(rm) = fs::remove_file(&tmp_path)
            {
                log::warn!("Could not remove {}: {}", tmp_path.display(), rm);
            }
            Err(e)
        }
    }
}

/// `<path>.tmp`, matching the leftover pattern swept at startup.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(PACKAGE_TMP_SUFFIX);
    path.with_file_name(name)
}

/// Write the archive to `path`. Returns the number of media files.
fn write_archive(deck: &Deck, path: &Path) -> Result<usize, PackageError> {
    let scratch = tempfile::tempdir()?;
    let collection_path = scratch.path().join(COLLECTION_MEMBER);
    write_collection(deck, &collection_path)?;

    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(COLLECTION_MEMBER, options)?;
    zip.write_all(&fs::read(&collection_path)?)?;

    let media_files = deck.media_files();
    let mut media_map = BTreeMap::new();
    for (i, file) in media_files.iter().enumerate() {
        let bytes = fs::read(file).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PackageError::MissingMedia(file.clone()),
            _ => PackageError::Io(e),
        })?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PackageError::MissingMedia(file.clone()))?;
        zip.start_file(i.to_string(), options)?;
        zip.write_all(&bytes)?;
        media_map.insert(i.to_string(), name);
    }

    zip.start_file(MEDIA_MEMBER, options)?;
    zip.write_all(serde_json::to_string(&media_map)?.as_bytes())?;
    zip.finish()?;
    Ok(media_files.len())
}

fn write_collection(deck: &Deck, path: &Path) -> Result<(), PackageError> {
    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    let now = chrono::Utc::now();
    let now_ms = now.timestamp_millis();
    let now_s = now.timestamp();
    let deck_id = deck_id(&deck.name);

    conn.execute(
        "INSERT INTO col (id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf, tags)
         VALUES (1, ?1, ?2, ?2, ?3, 0, 0, 0, ?4, ?5, ?6, ?7, '{}')",
        params![
            now_s - now_s % 86_400,
            now_ms,
            SCHEMA_VERSION,
            collection_conf().to_string(),
            models_json(deck_id, now_s).to_string(),
            decks_json(&deck.name, deck_id, now_s).to_string(),
            deck_conf_json().to_string(),
        ],
    )?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut insert_note = tx.prepare(
            "INSERT INTO notes (id, guid, mid, mod, usn, tags, flds, sfld, csum, flags, data)
             VALUES (?1, ?2, ?3, ?4, -1, ?5, ?6, ?7, ?8, 0, '')",
        )?;
        let mut insert_card = tx.prepare(
            "INSERT INTO cards (id, nid, did, ord, mod, usn, type, queue, due, ivl, factor,
                                reps, lapses, left, odue, odid, flags, data)
             VALUES (?1, ?2, ?3, 0, ?4, -1, 0, 0, ?5, 0, 0, 0, 0, 0, 0, 0, 0, '')",
        )?;
        for (i, card) in deck.cards.iter().enumerate() {
            let id = now_ms + i as i64;
            let fields = format!("{}{}{}", card.front_html, FIELD_SEPARATOR, card.back_html);
            let sort_field = plain_text(&card.front_html);
            let tags = if card.tags.is_empty() {
                String::new()
            } else {
                format!(" {} ", card.tags.join(" "))
            };
            insert_note.execute(params![
                id,
                note_guid(&deck.name, &card.front_html, &card.back_html),
                MODEL_ID,
                now_s,
                tags,
                fields,
                sort_field,
                field_checksum(&sort_field),
            ])?;
            insert_card.execute(params![id, id, deck_id, now_s, i as i64 + 1])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// =============================================================================
// Ids and checksums
// =============================================================================

fn sha256_prefix(parts: &[&str]) -> u64 {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Stable deck id in `[2^30, 2^31)`, clear of Anki's default deck.
pub fn deck_id(name: &str) -> i64 {
    (1 << 30) + (sha256_prefix(&["deck", name]) % (1 << 30)) as i64
}

/// Stable note GUID: 16 hex digits over deck name and both fields.
pub fn note_guid(deck_name: &str, front: &str, back: &str) -> String {
    format!("{:016x}", sha256_prefix(&[deck_name, front, back]))
}

/// Duplicate-detection checksum over the sort field (SHA-256 based).
fn field_checksum(text: &str) -> i64 {
    (sha256_prefix(&[text]) >> 32) as i64
}

const TEXT_OPEN: &str = r#"<div class="text">"#;

/// The exact text of a face, as written into its text block. `None` when
/// the face has no text. Whitespace and bracketed text are kept verbatim.
pub fn face_text(html: &str) -> Option<String> {
    let start = html.find(TEXT_OPEN)? + TEXT_OPEN.len();
    let len = html[start..].find("</div>")?;
    Some(unescape(&html[start..start + len]))
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Readable one-line summary of a face for listings: tags and sound
/// references removed, whitespace collapsed. Lossy for text that itself
/// contains `[sound:...]` or runs of spaces; use [`face_text`] for the
/// exact text.
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('<') {
            rest = after.find('>').map_or("", |end| &after[end + 1..]);
            out.push(' ');
        } else if let Some(after) = rest.strip_prefix("[sound:") {
            rest = after.find(']').map_or("", |end| &after[end + 1..]);
        } else {
            let first = rest.chars().next().map_or(1, char::len_utf8);
            let next = rest[first..]
                .find(['<', '['])
                .map_or(rest.len(), |i| i + first);
            out.push_str(&rest[..next]);
            rest = &rest[next..];
        }
    }
    unescape(&out).split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// Collection JSON
// =============================================================================

fn collection_conf() -> serde_json::Value {
    json!({
        "activeDecks": [DEFAULT_DECK_ID],
        "curDeck": DEFAULT_DECK_ID,
        "newSpread": 0,
        "collapseTime": 1200,
        "timeLim": 0,
        "estTimes": true,
        "dueCounts": true,
        "curModel": null,
        "nextPos": 1,
        "sortType": "noteFld",
        "sortBackwards": false,
        "addToCur": true
    })
}

fn models_json(deck_id: i64, now_s: i64) -> serde_json::Value {
    let field = |name: &str, ord: u32| {
        json!({
            "name": name, "ord": ord, "sticky": false, "rtl": false,
            "font": "Arial", "size": 20, "media": []
        })
    };
    json!({
        MODEL_ID.to_string(): {
            "id": MODEL_ID,
            "name": MODEL_NAME,
            "type": 0,
            "mod": now_s,
            "usn": -1,
            "sortf": 0,
            "did": deck_id,
            "tmpls": [{
                "name": "Card 1",
                "ord": 0,
                "qfmt": "{{Front}}",
                "afmt": "{{FrontSide}}<hr id=answer>{{Back}}",
                "did": null,
                "bqfmt": "",
                "bafmt": ""
            }],
            "flds": [field("Front", 0), field("Back", 1)],
            "css": CARD_CSS,
            "latexPre": "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\begin{document}\n",
            "latexPost": "\\end{document}",
            "tags": [],
            "vers": [],
            "req": [[0, "any", [0, 1]]]
        }
    })
}

fn deck_json(id: i64, name: &str, now_s: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "mod": now_s,
        "usn": -1,
        "desc": "",
        "dyn": 0,
        "collapsed": false,
        "newToday": [0, 0],
        "revToday": [0, 0],
        "lrnToday": [0, 0],
        "timeToday": [0, 0],
        "conf": 1,
        "extendNew": 10,
        "extendRev": 50
    })
}

fn decks_json(name: &str, deck_id: i64, now_s: i64) -> serde_json::Value {
    json!({
        DEFAULT_DECK_ID.to_string(): deck_json(DEFAULT_DECK_ID, "Default", now_s),
        deck_id.to_string(): deck_json(deck_id, name, now_s),
    })
}

fn deck_conf_json() -> serde_json::Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "dyn": false,
            "maxTaken": 60,
            "timer": 0,
            "autoplay": true,
            "replayq": true,
            "new": {
                "delays": [1, 10], "ints": [1, 4, 7], "initialFactor": 2500,
                "perDay": 20, "order": 1, "separate": true, "bury": true
            },
            "lapse": {
                "delays": [10], "mult": 0, "minInt": 1, "leechFails": 8, "leechAction": 0
            },
            "rev": {
                "perDay": 200, "ease4": 1.3, "fuzz": 0.05, "ivlFct": 1,
                "maxIvl": 36500, "bury": true
            }
        }
    })
}

// =============================================================================
// Reading
// =============================================================================

/// Read notes and media names back from a package.
pub fn read_package(path: &Path) -> Result<PackageContents, PackageError> {
    let mut archive = ZipArchive::new(File::open(path)?)?;

    let media = match archive.by_name(MEDIA_MEMBER) {
        Ok(mut member) => {
            let mut json = String::new();
            member.read_to_string(&mut json)?;
            let map: BTreeMap<String, String> = serde_json::from_str(&json)?;
            let mut entries: Vec<(u64, String)> = map
                .into_iter()
                .map(|(k, v)| {
                    k.parse::<u64>()
                        .map(|n| (n, v))
                        .map_err(|_| PackageError::Invalid(format!("media key '{k}'")))
                })
                .collect::<Result<_, _>>()?;
            entries.sort();
            entries.into_iter().map(|(_, name)| name).collect()
        }
        Err(zip::result::ZipError::FileNotFound) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let scratch = tempfile::tempdir()?;
    let collection_path = scratch.path().join(COLLECTION_MEMBER);
    {
        let mut member = archive
            .by_name(COLLECTION_MEMBER)
            .map_err(|_| PackageError::Invalid(format!("no {COLLECTION_MEMBER}")))?;
        let mut out = File::create(&collection_path)?;
        io::copy(&mut member, &mut out)?;
    }

    let conn = Connection::open(&collection_path)?;
    let decks: String = conn.query_row("SELECT decks FROM col", [], |row| row.get(0))?;
    let decks: BTreeMap<String, serde_json::Value> = serde_json::from_str(&decks)?;
    let deck_names = decks
        .values()
        .filter(|d| d["id"].as_i64() != Some(DEFAULT_DECK_ID))
        .filter_map(|d| d["name"].as_str().map(str::to_string))
        .collect();

    let mut stmt = conn.prepare("SELECT flds, tags FROM notes ORDER BY id")?;
    let notes = stmt
        .query_map([], |row| {
            let flds: String = row.get(0)?;
            let tags: String = row.get(1)?;
            Ok((flds, tags))
        })?
        .map(|row| -> Result<StoredNote, PackageError> {
            let (flds, tags) = row?;
            let mut fields = flds.splitn(2, FIELD_SEPARATOR);
            Ok(StoredNote {
                front: fields.next().unwrap_or_default().to_string(),
                back: fields.next().unwrap_or_default().to_string(),
                tags: tags.split_whitespace().map(str::to_string).collect(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PackageContents {
        deck_names,
        notes,
        media,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{ResolvedMedia, assemble};
    use tempfile::TempDir;

    fn text_deck(n: usize) -> Deck {
        let mut deck = Deck::new("Capitals");
        for i in 1..=n {
            deck.cards.push(
                assemble(
                    ResolvedMedia::text(format!("Capital of country {i}?")),
                    ResolvedMedia::text(format!("City {i}")),
                )
                .with_tags(vec!["Capitals".into()]),
            );
        }
        deck
    }

    #[test]
    fn roundtrip_preserves_notes_in_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("capitals.apkg");
        let summary = write_package(&text_deck(5), &path).unwrap();
        assert_eq!(summary.notes, 5);
        assert_eq!(summary.media, 0);

        let contents = read_package(&path).unwrap();
        assert_eq!(contents.deck_names, ["Capitals"]);
        assert_eq!(contents.notes.len(), 5);
        for (i, note) in contents.notes.iter().enumerate() {
            assert_eq!(plain_text(&note.front), format!("Capital of country {}?", i + 1));
            assert_eq!(plain_text(&note.back), format!("City {}", i + 1));
            assert_eq!(note.tags, ["Capitals"]);
        }
        assert!(contents.media.is_empty());
    }

    #[test]
    fn media_files_are_stored_flat() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("dog_1.jpg");
        let audio = tmp.path().join("Hund_2.mp3");
        fs::write(&image, b"jpg").unwrap();
        fs::write(&audio, b"ID3").unwrap();
        let mut deck = Deck::new("Animals");
        deck.cards.push(assemble(
            ResolvedMedia {
                image_path: Some(image),
                ..ResolvedMedia::default()
            },
            ResolvedMedia {
                text: Some("Hund".into()),
                image_path: None,
                audio_path: Some(audio),
            },
        ));

        let path = tmp.path().join("out").join("animals.apkg");
        let summary = write_package(&deck, &path).unwrap();
        assert_eq!(summary.media, 2);

        let contents = read_package(&path).unwrap();
        assert_eq!(contents.media, ["dog_1.jpg", "Hund_2.mp3"]);
        assert!(contents.notes[0].front.contains(r#"<img src="dog_1.jpg">"#));
        assert!(contents.notes[0].back.contains("[sound:Hund_2.mp3]"));

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut first = String::new();
        archive.by_name("0").unwrap().read_to_string(&mut first).unwrap();
        assert_eq!(first, "jpg");
    }

    #[test]
    fn missing_media_leaves_no_partial_output() {
        let tmp = TempDir::new().unwrap();
        let mut deck = Deck::new("Broken");
        deck.cards.push(assemble(
            ResolvedMedia {
                image_path: Some(tmp.path().join("vanished.jpg")),
                ..ResolvedMedia::default()
            },
            ResolvedMedia::text("x"),
        ));
        let path = tmp.path().join("broken.apkg");

        let result = write_package(&deck, &path);

        assert!(matches!(result, Err(PackageError::MissingMedia(_))));
        assert!(!path.exists());
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn empty_deck_is_refused() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.apkg");
        assert!(matches!(
            write_package(&Deck::new("Empty"), &path),
            Err(PackageError::EmptyDeck(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn existing_package_is_replaced() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("capitals.apkg");
        write_package(&text_deck(2), &path).unwrap();
        write_package(&text_deck(3), &path).unwrap();
        assert_eq!(read_package(&path).unwrap().notes.len(), 3);
    }

    #[test]
    fn temp_path_matches_sweep_pattern() {
        let tmp = temp_path_for(Path::new("out/My_Deck.apkg"));
        assert_eq!(tmp, PathBuf::from("out/My_Deck.apkg.tmp"));
        assert!(tmp.to_string_lossy().ends_with(PACKAGE_TMP_SUFFIX));
    }

    #[test]
    fn ids_are_stable() {
        assert_eq!(deck_id("Animals"), deck_id("Animals"));
        assert_ne!(deck_id("Animals"), deck_id("Capitals"));
        assert!(deck_id("Animals") >= 1 << 30);
        assert_eq!(note_guid("d", "a", "b"), note_guid("d", "a", "b"));
        assert_ne!(note_guid("d", "a", "b"), note_guid("d", "ab", ""));
        assert_eq!(note_guid("d", "a", "b").len(), 16);
    }

    #[test]
    fn plain_text_strips_markup() {
        assert_eq!(
            plain_text(r#"<div class="text">a &lt; b</div><div class="image"><img src="x.jpg"></div>[sound:x.mp3]"#),
            "a < b"
        );
        assert_eq!(plain_text(""), "");
        assert_eq!(plain_text("[not sound]"), "[not sound]");
    }

    #[test]
    fn face_text_reads_back_exact_text() {
        let tmp = TempDir::new().unwrap();
        let audio = tmp.path().join("a_1.mp3");
        fs::write(&audio, b"ID3").unwrap();
        let question = "Which tag plays  [sound:x.mp3]  in Anki?";
        let answer = "<b>bold</b> & \"quoted\"";
        let mut deck = Deck::new("Markup");
        deck.cards.push(assemble(
            ResolvedMedia {
                text: Some(question.into()),
                image_path: None,
                audio_path: Some(audio),
            },
            ResolvedMedia::text(answer),
        ));
        let path = tmp.path().join("markup.apkg");
        write_package(&deck, &path).unwrap();

        let note = &read_package(&path).unwrap().notes[0];
        assert_eq!(face_text(&note.front).as_deref(), Some(question));
        assert_eq!(face_text(&note.back).as_deref(), Some(answer));
        // the listing form is lossy for such text
        assert_eq!(plain_text(&note.front), "Which tag plays in Anki?");
    }

    #[test]
    fn face_text_without_text_block() {
        assert_eq!(face_text(r#"<div class="image"><img src="x.jpg"></div>"#), None);
        assert_eq!(face_text(""), None);
    }

    #[test]
    fn reading_garbage_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("junk.apkg");
        fs::write(&path, b"not a zip").unwrap();
        assert!(read_package(&path).is_err());
    }
}
