use std::sync::atomic::{AtomicU8, AtomicU32, Ordering};

/// Global counter for auto-incrementing player IDs.
static PLAYER_ID_COUNTER: AtomicU8 = AtomicU8::new(0);
/// Global counter for auto-incrementing card instance IDs (starts at 1, 0 is reserved).
static CARD_ID_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Player identifier, index-based for efficiency.
///
/// A match always has exactly two players, index 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u8);

/// Card instance identifier, unique per physical copy.
///
/// Two copies of the same card in a deck get distinct IDs; the ID follows
/// the copy through every zone for the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct CardId(pub u32);

impl PlayerId {
    /// Create a new player ID with auto-incrementing counter.
    pub fn new() -> Self {
        Self(PLAYER_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create a player ID from a specific index (for when you need explicit control).
    pub fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The other seat in a two-player match.
    pub fn opponent(self) -> Self {
        Self(self.0 ^ 1)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl CardId {
    /// Create a new card ID with auto-incrementing counter.
    pub fn new() -> Self {
        Self(CARD_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create a card ID from a specific value (for when you need explicit control).
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}
