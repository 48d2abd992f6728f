//! Static lookup tables mapping raw game codes to label values.
//!
//! Every table is a plain `(code, label)` slice. A lookup either yields the
//! mapped label or, for unmapped codes, the synthesized `Unknown_<code>`
//! placeholder. Faction resolution is the exception: an unmapped race has
//! no faction and callers drop the row.

use std::borrow::Cow;
use std::fmt;

/// An immutable code → label table.
#[derive(Debug, Clone, Copy)]
pub struct LookupTable {
    entries: &'static [(i64, &'static str)],
}

impl LookupTable {
    pub const fn new(entries: &'static [(i64, &'static str)]) -> Self {
        Self { entries }
    }

    /// Exact lookup without fallback.
    pub fn get(&self, code: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    /// Label for `code`, or `Unknown_<code>` when the table has no entry.
    pub fn label(&self, code: i64) -> Cow<'static, str> {
        match self.get(code) {
            Some(label) => Cow::Borrowed(label),
            None => Cow::Owned(format!("Unknown_{code}")),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The two playable factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Faction {
    Alliance,
    Horde,
}

impl Faction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Alliance => "Alliance",
            Faction::Horde => "Horde",
        }
    }

    /// Faction for a race code. `None` for races without a mapping.
    pub fn from_race(race: i64) -> Option<Self> {
        RACE_FACTIONS
            .iter()
            .find(|(r, _)| *r == race)
            .map(|(_, faction)| *faction)
    }

    /// Faction for a battleground team id (0 = Alliance, 1 = Horde).
    pub fn from_team(team: i64) -> Option<Self> {
        match team {
            0 => Some(Faction::Alliance),
            1 => Some(Faction::Horde),
            _ => None,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RACE_FACTIONS: &[(i64, Faction)] = &[
    (1, Faction::Alliance),  // Human
    (2, Faction::Horde),     // Orc
    (3, Faction::Alliance),  // Dwarf
    (4, Faction::Alliance),  // Night Elf
    (5, Faction::Horde),     // Undead
    (6, Faction::Horde),     // Tauren
    (7, Faction::Alliance),  // Gnome
    (8, Faction::Horde),     // Troll
    (9, Faction::Horde),     // Goblin
    (10, Faction::Horde),    // Blood Elf
    (11, Faction::Alliance), // Draenei
    (22, Faction::Horde),    // Worgen
    (24, Faction::Alliance), // Pandaren (neutral)
    (25, Faction::Alliance), // Pandaren (Alliance)
    (26, Faction::Horde),    // Pandaren (Horde)
];

pub const CLASSES: LookupTable = LookupTable::new(&[
    (1, "Warrior"),
    (2, "Paladin"),
    (3, "Hunter"),
    (4, "Rogue"),
    (5, "Priest"),
    (6, "Death Knight"),
    (7, "Shaman"),
    (8, "Mage"),
    (9, "Warlock"),
    (10, "Monk"),
    (11, "Druid"),
    (12, "Demon Hunter"),
]);

pub const DIFFICULTIES: LookupTable = LookupTable::new(&[
    (0, "Normal"),
    (1, "Heroic"),
    (2, "10_Player"),
    (3, "25_Player"),
    (4, "10_Player_Heroic"),
    (5, "25_Player_Heroic"),
]);

pub const LFG_STATES: LookupTable = LookupTable::new(&[
    (0, "None"),
    (1, "RoleCheck"),
    (2, "Queued"),
    (3, "Proposal"),
    (4, "Boot"),
    (5, "Dungeon"),
    (6, "FinishedDungeon"),
]);

pub const IP_ACTIONS: LookupTable = LookupTable::new(&[
    (0, "Login"),
    (1, "Failed_Login"),
    (2, "Logout"),
    (3, "Character_Create"),
    (4, "Character_Delete"),
    (5, "Character_Login"),
    (6, "Character_Logout"),
    (7, "Password_Change"),
    (8, "Account_Create"),
    (9, "Account_Delete"),
]);

pub const LAG_TYPES: LookupTable = LookupTable::new(&[
    (0, "World"),
    (1, "Instance"),
    (2, "Battleground"),
    (3, "Arena"),
    (4, "Raid"),
]);

pub const BATTLEGROUND_TYPES: LookupTable = LookupTable::new(&[
    (1, "Alterac Valley"),
    (2, "Warsong Gulch"),
    (3, "Arathi Basin"),
    (4, "Eye of the Storm"),
    (5, "Strand of the Ancients"),
    (6, "Isle of Conquest"),
    (7, "Twin Peaks"),
    (8, "Battle for Gilneas"),
    (9, "Temple of Kotmogu"),
    (10, "Silvershard Mines"),
    (11, "Deepwind Gorge"),
]);

pub const DESERTION_TYPES: LookupTable = LookupTable::new(&[
    (0, "Leave"),
    (1, "Offline"),
    (2, "Desert"),
    (3, "Finish"),
]);

/// Auction house ids as stored in `auctionhouse.houseid`.
pub const AUCTION_HOUSES: LookupTable =
    LookupTable::new(&[(1, "Alliance"), (2, "Horde"), (7, "Neutral")]);
