//! Session records and their durable store.
//!
//! This module contains [`GameSession`], the per-player record, [`StateFile`], the JSON file the
//! records are mirrored to, and [`Store`], the shared in-memory map every engine call goes
//! through. The store writes the whole map back to disk after every mutation.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    fs::{self, File},
    io::{self, ErrorKind, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::{error::PersistenceError, grid::Grid, pathfinding, types::PlayerId};

/// Ordered mapping of every stored session, as written to the state file.
pub type SessionMap = BTreeMap<PlayerId, GameSession>;

/// One player's maze game.
///
/// This structure is the record kept per player and mirrored to the state file. `width` and
/// `height` always match the dimensions of `grid`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    /// Current maze, with the player at its live position.
    #[serde(alias = "maze")]
    pub grid: Grid,
    /// Current level, starting at 1.
    pub level: u32,
    /// Moves made on the current level.
    pub moves: u64,
    /// Width of the current maze.
    pub width: usize,
    /// Height of the current maze.
    pub height: usize,
}

impl GameSession {
    /// Starts a level-one session on `grid`.
    pub const fn new(grid: Grid) -> Self {
        let width = grid.width();
        let height = grid.height();

        Self {
            grid,
            level: 1,
            moves: 0,
            width,
            height,
        }
    }

    /// Checks that the recorded dimensions agree with the grid and that its goal can be reached.
    fn check_consistency(&self, player: &PlayerId) -> Result<(), PersistenceError> {
        if self.width != self.grid.width() || self.height != self.grid.height() {
            return Err(PersistenceError::Inconsistent {
                player: player.clone(),
                width: self.width,
                height: self.height,
                grid_width: self.grid.width(),
                grid_height: self.grid.height(),
            });
        }
        if !pathfinding::reachable(&self.grid, self.grid.player(), self.grid.goal()) {
            return Err(PersistenceError::Unreachable {
                player: player.clone(),
            });
        }

        Ok(())
    }
}

/// Outcome of a mutating store call.
///
/// The in-memory change has been applied by the time this value exists; `durability` tells
/// whether writing it to the state file worked too. A failed write is never rolled back, the
/// progress simply may not survive a restart.
#[derive(Debug)]
#[must_use]
pub struct Committed<T> {
    /// Result of the operation itself.
    pub value: T,
    /// Result of mirroring the store to disk.
    pub durability: Result<(), PersistenceError>,
}

impl<T> Committed<T> {
    /// Pairs a value with the result of the write that followed it.
    pub const fn new(value: T, durability: Result<(), PersistenceError>) -> Self {
        Self { value, durability }
    }

    /// Wraps a value produced without touching the store.
    pub const fn unchanged(value: T) -> Self {
        Self {
            value,
            durability: Ok(()),
        }
    }

    /// Returns whether the change reached the state file.
    pub const fn is_durable(&self) -> bool {
        self.durability.is_ok()
    }

    /// Transforms the value, keeping the write result.
    pub fn map<U, F: FnOnce(T) -> U>(self, op: F) -> Committed<U> {
        Committed {
            value: op(self.value),
            durability: self.durability,
        }
    }

    /// Collapses into a plain result, treating a failed write as an error.
    ///
    /// # Errors
    ///
    /// This function returns the persistence error if the write failed.
    pub fn into_result(self) -> Result<T, PersistenceError> {
        self.durability.map(|()| self.value)
    }
}

/// JSON file holding every session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateFile {
    /// Location of the file.
    path: PathBuf,
}

impl StateFile {
    /// Points at the state file at `path`; nothing is read or created yet.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Returns the location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the sibling the file is staged in before being renamed into place.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");

        self.path.with_file_name(name)
    }

    /// Reads every stored session.
    ///
    /// A missing or blank file holds no sessions.
    ///
    /// # Errors
    ///
    /// This function returns an error if the file cannot be read, is not a valid session
    /// mapping, records dimensions that disagree with a grid, or holds a grid whose goal the
    /// player cannot reach.
    pub fn load(&self) -> Result<SessionMap, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(SessionMap::new()),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(SessionMap::new());
        }

        let sessions: SessionMap =
            serde_json::from_str(&contents).map_err(|source| PersistenceError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        for (player, session) in &sessions {
            session.check_consistency(player)?;
        }

        Ok(sessions)
    }

    /// Replaces the file with `sessions`.
    ///
    /// The mapping is written to [`StateFile::temp_path`], synced, and renamed over the file, so
    /// a crash mid-write leaves either the old or the new contents behind, never a mix.
    ///
    /// # Errors
    ///
    /// This function returns an error if encoding fails or if the temporary file cannot be
    /// written or renamed. The temporary file is cleaned up on a best-effort basis.
    pub fn save(&self, sessions: &SessionMap) -> Result<(), PersistenceError> {
        let mut encoded = serde_json::to_vec(sessions).map_err(PersistenceError::Encode)?;
        encoded.push(b'\n');

        let temp = self.temp_path();
        let write = || -> io::Result<()> {
            let mut file = File::create(&temp)?;
            file.write_all(&encoded)?;
            file.sync_all()?;
            fs::rename(&temp, &self.path)
        };

        write().map_err(|source| {
            if let Err(err) = fs::remove_file(&temp) {
                log::debug!("could not clean up {}: {err}", temp.display());
            }
            PersistenceError::Write {
                path: self.path.clone(),
                source,
            }
        })
    }
}

/// Lockable cell holding one player's session.
///
/// The slot is emptied before it is unlinked from the map, so a caller still holding the `Arc`
/// after a stop sees `None` rather than a detached session.
pub(crate) type Slot = Arc<Mutex<Option<GameSession>>>;

/// Shared session map mirrored to a [`StateFile`].
///
/// Lookups take the map lock only long enough to clone a slot handle; all work on a session
/// happens under that session's own mutex, so different players never wait on each other.
/// Locks are always taken in the order save lock, map lock, session lock.
#[derive(Debug)]
pub struct Store {
    /// Durable mirror of the map.
    file: StateFile,
    /// Live sessions keyed by player.
    sessions: RwLock<BTreeMap<PlayerId, Slot>>,
    /// Serializes whole-file writes.
    save_lock: Mutex<()>,
}

impl Store {
    /// Loads the sessions stored in `file`.
    ///
    /// # Errors
    ///
    /// This function returns the error of [`StateFile::load`]; the caller decides whether to
    /// fall back to an empty store.
    pub fn open(file: StateFile) -> Result<Self, PersistenceError> {
        let sessions = file.load()?;
        log::info!(
            "loaded {} maze session(s) from {}",
            sessions.len(),
            file.path().display()
        );

        Ok(Self::with_sessions(file, sessions))
    }

    /// Builds a store from sessions already in memory, without reading `file`.
    pub fn with_sessions(file: StateFile, sessions: SessionMap) -> Self {
        let sessions = sessions
            .into_iter()
            .map(|(player, session)| (player, Arc::new(Mutex::new(Some(session)))))
            .collect();

        Self {
            file,
            sessions: RwLock::new(sessions),
            save_lock: Mutex::new(()),
        }
    }

    /// Returns the file the store is mirrored to.
    pub const fn file(&self) -> &StateFile {
        &self.file
    }

    /// Returns the number of active sessions.
    pub fn len(&self) -> usize {
        self.slots()
            .into_iter()
            .filter(|(_, slot)| slot.lock().is_some())
            .count()
    }

    /// Returns whether no session is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns whether `player` has an active session.
    pub fn contains(&self, player: &PlayerId) -> bool {
        self.slot(player).is_some_and(|slot| slot.lock().is_some())
    }

    /// Returns a copy of the session of `player`.
    pub fn get(&self, player: &PlayerId) -> Option<GameSession> {
        self.slot(player).and_then(|slot| slot.lock().clone())
    }

    /// Stores `session` for `player`, replacing any previous one, and saves.
    pub fn put(&self, player: PlayerId, session: GameSession) -> Committed<Option<GameSession>> {
        let previous = {
            let mut sessions = self.sessions.write();
            if let Some(slot) = sessions.get(&player) {
                slot.lock().replace(session)
            } else {
                let _ = sessions.insert(player, Arc::new(Mutex::new(Some(session))));
                None
            }
        };

        Committed::new(previous, self.persist())
    }

    /// Removes the session of `player` and saves.
    ///
    /// Nothing is written when the player had no session.
    pub fn remove(&self, player: &PlayerId) -> Committed<Option<GameSession>> {
        let Some(slot) = self.slot(player) else {
            return Committed::unchanged(None);
        };
        let Some(previous) = slot.lock().take() else {
            return Committed::unchanged(None);
        };
        self.unlink(player, &slot);

        Committed::new(Some(previous), self.persist())
    }

    /// Returns a consistent copy of every active session.
    ///
    /// Each session is copied under its own lock, one at a time.
    pub fn snapshot(&self) -> SessionMap {
        self.slots()
            .into_iter()
            .filter_map(|(player, slot)| {
                let session = slot.lock().clone()?;
                Some((player, session))
            })
            .collect()
    }

    /// Writes every active session to the state file.
    ///
    /// # Errors
    ///
    /// This function returns the error of [`StateFile::save`]. The failure is also logged.
    pub fn persist(&self) -> Result<(), PersistenceError> {
        let _guard = self.save_lock.lock();
        let snapshot = self.snapshot();

        match self.file.save(&snapshot) {
            Ok(()) => {
                log::debug!(
                    "saved {} maze session(s) to {}",
                    snapshot.len(),
                    self.file.path().display()
                );
                Ok(())
            }
            Err(err) => {
                log::warn!("maze progress may not survive a restart: {err}");
                Err(err)
            }
        }
    }

    /// Returns the slot of `player`, if any.
    pub(crate) fn slot(&self, player: &PlayerId) -> Option<Slot> {
        self.sessions.read().get(player).map(Arc::clone)
    }

    /// Installs `session` for `player` unless the player already has an active one.
    ///
    /// The check and the insertion happen under the map's write lock. The session is handed back
    /// when the player turned out to be busy.
    pub(crate) fn insert_new(
        &self,
        player: PlayerId,
        session: GameSession,
    ) -> Result<(), GameSession> {
        let mut sessions = self.sessions.write();
        if let Some(slot) = sessions.get(&player) {
            let mut current = slot.lock();
            if current.is_some() {
                return Err(session);
            }
            *current = Some(session);
        } else {
            let _ = sessions.insert(player, Arc::new(Mutex::new(Some(session))));
        }

        Ok(())
    }

    /// Drops the map entry of `player` if it still points at `slot` and the slot is still empty.
    ///
    /// A slot refilled by a start or a put between emptying and unlinking stays in place.
    pub(crate) fn unlink(&self, player: &PlayerId, slot: &Slot) {
        let mut sessions = self.sessions.write();
        if sessions
            .get(player)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.lock().is_none())
        {
            let _ = sessions.remove(player);
        }
    }

    /// Clones every slot handle out of the map.
    fn slots(&self) -> Vec<(PlayerId, Slot)> {
        self.sessions
            .read()
            .iter()
            .map(|(player, slot)| (player.clone(), Arc::clone(slot)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::{generator::generate_seeded, testing::scratch_state_file};

    /// Builds a session on a seeded maze with the given progress.
    fn session(side: usize, seed: u64, level: u32, moves: u64) -> GameSession {
        let grid = generate_seeded(side, side, seed).expect("generation should succeed");
        GameSession {
            level,
            moves,
            ..GameSession::new(grid)
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_dir, path) = scratch_state_file("missing");
        let file = StateFile::new(path);

        assert_eq!(file.load().expect("missing file should load").len(), 0);
    }

    #[test]
    fn test_load_blank_file_is_empty() {
        let (_dir, path) = scratch_state_file("blank");
        let file = StateFile::new(path);
        fs::write(file.path(), "\n  \n").expect("scratch file should be writable");

        assert!(file.load().expect("blank file should load").is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let (_dir, path) = scratch_state_file("round-trip");
        let file = StateFile::new(path);
        let sessions: SessionMap = [
            (PlayerId::from(1_u64), session(5, 1, 1, 0)),
            (PlayerId::from(2_u64), session(9, 2, 3, 17)),
            (PlayerId::from("guest"), session(13, 3, 8, 250)),
        ]
        .into_iter()
        .collect();

        file.save(&sessions).expect("save should succeed");
        let loaded = file.load().expect("saved file should load");

        assert_eq!(loaded, sessions, "every key must survive the round trip");
        assert!(!file.temp_path().exists(), "the staging file is renamed away");
    }

    #[test]
    fn test_save_overwrites_previous_contents() {
        let (_dir, path) = scratch_state_file("overwrite");
        let file = StateFile::new(path);
        let first: SessionMap = [(PlayerId::from(1_u64), session(5, 1, 1, 0))]
            .into_iter()
            .collect();

        file.save(&first).expect("first save should succeed");
        file.save(&SessionMap::new())
            .expect("second save should succeed");

        assert!(file.load().expect("file should load").is_empty());
    }

    #[test]
    fn test_load_malformed_json() {
        let (_dir, path) = scratch_state_file("malformed");
        let file = StateFile::new(path);
        fs::write(file.path(), "{\"1\": {\"grid\": [").expect("scratch file should be writable");

        assert!(matches!(
            file.load(),
            Err(PersistenceError::Malformed { .. })
        ));
    }

    #[test]
    fn test_load_unknown_cell_tag() {
        let (_dir, path) = scratch_state_file("bad-tag");
        let file = StateFile::new(path);
        let json = r#"{"1": {"grid": [["X","X","X"],["X","@","F"],["X","X","X"]],
            "level": 1, "moves": 0, "width": 3, "height": 3}}"#;
        fs::write(file.path(), json).expect("scratch file should be writable");

        assert!(matches!(
            file.load(),
            Err(PersistenceError::Malformed { .. })
        ));
    }

    #[test]
    fn test_load_inconsistent_dimensions() {
        let (_dir, path) = scratch_state_file("inconsistent");
        let file = StateFile::new(path);
        let json = r#"{"7": {"grid": [["\u2593","\u2593","\u2593"],["\u2593","@","F"],["\u2593","\u2593","\u2593"]],
            "level": 2, "moves": 4, "width": 5, "height": 5}}"#;
        fs::write(file.path(), json).expect("scratch file should be writable");

        assert!(matches!(
            file.load(),
            Err(PersistenceError::Inconsistent { width: 5, grid_width: 3, .. })
        ));
    }

    #[test]
    fn test_load_accepts_legacy_maze_key() {
        let (_dir, path) = scratch_state_file("legacy");
        let file = StateFile::new(path);
        let json = r#"{"123456789": {"maze": [
            ["\u2593","\u2593","\u2593","\u2593","\u2593"],
            ["\u2593","@","\u2591","F","\u2593"],
            ["\u2593","\u2593","\u2593","\u2593","\u2593"]],
            "level": 4, "moves": 12, "width": 5, "height": 3}}"#;
        fs::write(file.path(), json).expect("scratch file should be writable");

        let sessions = file.load().expect("legacy file should load");
        let session = sessions
            .get(&PlayerId::from(123_456_789_u64))
            .expect("the legacy session should be keyed by its id");

        assert_eq!(session.level, 4);
        assert_eq!(session.moves, 12);
        assert_eq!(session.grid.goal().col, 3);
    }

    #[test]
    fn test_load_rejects_walled_off_goal() {
        let (_dir, path) = scratch_state_file("walled-off");
        let json = r#"{"5": {"grid": [
            ["\u2593","\u2593","\u2593","\u2593","\u2593"],
            ["\u2593","@","\u2593","F","\u2593"],
            ["\u2593","\u2591","\u2593","\u2591","\u2593"],
            ["\u2593","\u2593","\u2593","\u2593","\u2593"]],
            "level": 1, "moves": 3, "width": 5, "height": 4}}"#;
        fs::write(&path, json).expect("scratch file should be writable");

        assert!(matches!(
            StateFile::new(&path).load(),
            Err(PersistenceError::Unreachable { player }) if player == PlayerId::from(5_u64)
        ));
        assert!(
            Store::open(StateFile::new(&path)).is_err(),
            "a store never opens over a maze that cannot be finished"
        );
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let (_dir, path) = scratch_state_file("no-dir");
        let path = path.with_file_name("absent").join("maze_games.json");
        let file = StateFile::new(path);

        assert!(matches!(
            file.save(&SessionMap::new()),
            Err(PersistenceError::Write { .. })
        ));
    }

    #[test]
    fn test_store_write_through() {
        let (_dir, path) = scratch_state_file("write-through");
        let store = Store::open(StateFile::new(&path)).expect("store should open");
        let player = PlayerId::from(42_u64);

        let put = store.put(player.clone(), session(7, 11, 2, 5));
        assert!(put.is_durable(), "put should reach the disk");
        assert_eq!(put.value, None);

        let reopened = Store::open(StateFile::new(&path)).expect("store should reopen");
        assert_eq!(reopened.get(&player), store.get(&player));
        assert_eq!(reopened.len(), 1);

        let removed = store.remove(&player);
        assert!(removed.is_durable(), "remove should reach the disk");
        assert!(removed.value.is_some());
        assert!(!store.contains(&player));

        let reopened = Store::open(StateFile::new(&path)).expect("store should reopen");
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_store_remove_absent_is_noop() {
        let (_dir, path) = scratch_state_file("remove-absent");
        let store = Store::open(StateFile::new(path)).expect("store should open");
        let removed = store.remove(&PlayerId::from("nobody"));

        assert_eq!(removed.value, None);
        assert!(removed.is_durable());
        assert!(!store.file().path().exists(), "nothing changed, nothing written");
    }

    #[test]
    fn test_store_put_replaces() {
        let (_dir, path) = scratch_state_file("replace");
        let store = Store::open(StateFile::new(path)).expect("store should open");
        let player = PlayerId::from("p");

        assert!(store.put(player.clone(), session(5, 1, 1, 0)).is_durable());
        let replaced = store.put(player.clone(), session(5, 2, 6, 3));

        assert_eq!(replaced.value.map(|old| old.level), Some(1));
        assert_eq!(store.get(&player).map(|current| current.level), Some(6));
    }

    #[test]
    fn test_store_failed_save_keeps_memory() {
        let (_dir, path) = scratch_state_file("failing");
        let path = path.with_file_name("absent").join("maze_games.json");
        let store = Store::with_sessions(StateFile::new(path), SessionMap::new());
        let player = PlayerId::from(9_u64);

        let put = store.put(player.clone(), session(5, 4, 1, 0));

        assert!(matches!(
            put.durability,
            Err(PersistenceError::Write { .. })
        ));
        assert!(store.contains(&player), "a failed save must not roll back");
    }

    #[test]
    fn test_store_insert_new_refuses_active() {
        let (_dir, path) = scratch_state_file("insert-new");
        let store = Store::with_sessions(StateFile::new(path), SessionMap::new());
        let player = PlayerId::from(1_u64);

        assert!(store.insert_new(player.clone(), session(5, 1, 1, 0)).is_ok());
        assert!(store.insert_new(player.clone(), session(5, 2, 1, 0)).is_err());

        assert!(store.remove(&player).is_durable());
        assert!(store.insert_new(player, session(5, 3, 1, 0)).is_ok());
    }

    #[test]
    fn test_unlink_keeps_a_refilled_slot() {
        let (_dir, path) = scratch_state_file("refilled");
        let store = Store::open(StateFile::new(path)).expect("store should open");
        let player = PlayerId::from(3_u64);
        assert!(store.put(player.clone(), session(5, 1, 2, 9)).is_durable());

        let slot = store.slot(&player).expect("the player has a slot");
        assert!(slot.lock().take().is_some(), "the slot held the old game");
        assert!(
            store.insert_new(player.clone(), session(5, 2, 1, 0)).is_ok(),
            "an emptied slot takes a new game"
        );
        store.unlink(&player, &slot);

        assert_eq!(
            store.get(&player).map(|current| (current.level, current.moves)),
            Some((1, 0)),
            "the new game must survive the late unlink"
        );

        assert!(slot.lock().take().is_some(), "the slot held the new game");
        store.unlink(&player, &slot);
        assert!(store.slot(&player).is_none(), "an empty slot is unlinked");
    }

    #[test]
    fn test_store_concurrent_puts_persist_everything() {
        let (_dir, path) = scratch_state_file("concurrent");
        let store = Arc::new(Store::open(StateFile::new(path)).expect("store should open"));

        let handles: Vec<_> = (0..8_u64)
            .map(|id| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let put = store.put(PlayerId::from(id), session(5, id, 1, 0));
                    assert!(put.is_durable(), "every concurrent put should be saved");
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread should not panic");
        }

        let loaded = store.file().load().expect("file should load");
        assert_eq!(loaded.len(), 8);
        assert_eq!(loaded, store.snapshot());
    }
}
