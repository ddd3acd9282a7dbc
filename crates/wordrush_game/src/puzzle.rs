//! Puzzle descriptors and the providers that produce them.
//!
//! A [`PuzzleProvider`] maps a level number to a [`Puzzle`]. Providers may be
//! deterministic ([`ClassicPuzzles`]) or random ([`WordBankPuzzles`]); rooms
//! cache the puzzle when a level is entered, so either kind yields a stable
//! completion target for the whole level.
//!
//! Levels past the end of a provider's table clamp to its hardest tier.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Orientation of a word on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "H")]
    Horizontal,
    #[serde(rename = "V")]
    Vertical,
}

/// One required word with its clue and placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleWord {
    pub word: String,
    pub clue: String,
    pub row: u32,
    pub col: u32,
    pub direction: Direction,
}

impl PuzzleWord {
    pub fn new(word: &str, clue: &str, row: u32, col: u32, direction: Direction) -> Self {
        Self {
            word: normalize_word(word),
            clue: clue.to_string(),
            row,
            col,
            direction,
        }
    }
}

/// The words a level requires, laid out on a square grid of `size` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub size: u32,
    pub words: Vec<PuzzleWord>,
}

impl Puzzle {
    /// Returns true if `word` (already normalized) is one of this puzzle's words.
    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.word == word)
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

/// Canonical form used for answer comparison: trimmed and upper-cased.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_uppercase()
}

/// Source of puzzles for a level.
pub trait PuzzleProvider: Send + Sync {
    /// Produces the puzzle for `level` (1-based).
    fn puzzle(&self, level: u32) -> Puzzle;
}

/// Index into a table of `len` tiers for a 1-based `level`, clamped to the last tier.
fn tier_index(level: u32, len: usize) -> usize {
    (level.max(1) as usize - 1).min(len.saturating_sub(1))
}

/// The fixed three-level puzzle table.
#[derive(Debug, Clone)]
pub struct ClassicPuzzles {
    levels: Vec<Puzzle>,
}

impl ClassicPuzzles {
    pub fn new() -> Self {
        use Direction::{Horizontal, Vertical};
        let levels = vec![
            Puzzle {
                size: 3,
                words: vec![
                    PuzzleWord::new("CAT", "Feline friend", 0, 0, Horizontal),
                    PuzzleWord::new("HAT", "Head cover", 0, 0, Vertical),
                ],
            },
            Puzzle {
                size: 4,
                words: vec![
                    PuzzleWord::new("BOOK", "Reading material", 0, 0, Horizontal),
                    PuzzleWord::new("KITE", "Flying toy", 0, 0, Vertical),
                ],
            },
            Puzzle {
                size: 5,
                words: vec![
                    PuzzleWord::new("HOUSE", "Where you live", 0, 0, Horizontal),
                    PuzzleWord::new("EAGLE", "Bird of prey", 0, 0, Vertical),
                ],
            },
        ];
        Self { levels }
    }
}

impl Default for ClassicPuzzles {
    fn default() -> Self {
        Self::new()
    }
}

impl PuzzleProvider for ClassicPuzzles {
    fn puzzle(&self, level: u32) -> Puzzle {
        self.levels[tier_index(level, self.levels.len())].clone()
    }
}

/// Word bank grouped by difficulty; tier `n` serves level `n + 1`.
const WORD_BANK: &[&[(&str, &str)]] = &[
    &[
        ("CAT", "Feline friend"),
        ("HAT", "Head cover"),
        ("SUN", "Daytime star"),
        ("MAP", "Guide for travelers"),
        ("OWL", "Night hunter with big eyes"),
        ("PEN", "Writing tool"),
        ("BEE", "Honey maker"),
        ("CUP", "Holds your tea"),
    ],
    &[
        ("BOOK", "Reading material"),
        ("KITE", "Flying toy"),
        ("MOON", "Lights the night"),
        ("FROG", "Green jumper"),
        ("SHIP", "Crosses the ocean"),
        ("LAMP", "Bedside light"),
        ("DRUM", "Beaten in a band"),
        ("SNOW", "Winter blanket"),
    ],
    &[
        ("HOUSE", "Where you live"),
        ("EAGLE", "Bird of prey"),
        ("PIANO", "Instrument with keys"),
        ("RIVER", "Flows to the sea"),
        ("CLOCK", "Tells the time"),
        ("BREAD", "Baked loaf"),
        ("TIGER", "Striped big cat"),
        ("STORM", "Thunder and rain"),
    ],
    &[
        ("CASTLE", "Home of a king"),
        ("PLANET", "Orbits a star"),
        ("GUITAR", "Six-stringed instrument"),
        ("ANCHOR", "Keeps a ship in place"),
        ("JUNGLE", "Dense tropical forest"),
        ("BRIDGE", "Crosses a river"),
        ("WINTER", "Coldest season"),
        ("PENCIL", "Writes in graphite"),
    ],
];

/// Random puzzles drawn from a tiered word bank.
///
/// Each call draws `words_per_puzzle` distinct words from the tier matching
/// the level. Two calls for the same level generally differ; callers cache
/// the result for the duration of a level.
pub struct WordBankPuzzles {
    rng: Mutex<StdRng>,
    words_per_puzzle: usize,
}

impl WordBankPuzzles {
    /// Provider seeded from the operating system's entropy source.
    pub fn new(words_per_puzzle: usize) -> Self {
        Self::with_rng(StdRng::from_entropy(), words_per_puzzle)
    }

    /// Reproducible provider for a fixed seed.
    pub fn seeded(seed: u64, words_per_puzzle: usize) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), words_per_puzzle)
    }

    pub fn with_rng(rng: StdRng, words_per_puzzle: usize) -> Self {
        Self {
            rng: Mutex::new(rng),
            words_per_puzzle: words_per_puzzle.max(1),
        }
    }

    /// Lays words out alternately across and down, each on its own row or column.
    fn layout(entries: &[(&str, &str)]) -> Puzzle {
        let mut size = 0u32;
        let words = entries
            .iter()
            .enumerate()
            .map(|(i, (word, clue))| {
                let offset = i as u32;
                let len = word.chars().count() as u32;
                let (row, col, direction) = if i % 2 == 0 {
                    (offset, 0, Direction::Horizontal)
                } else {
                    (0, offset, Direction::Vertical)
                };
                size = size.max(offset + 1).max(len);
                PuzzleWord::new(word, clue, row, col, direction)
            })
            .collect();
        Puzzle { size, words }
    }
}

impl PuzzleProvider for WordBankPuzzles {
    fn puzzle(&self, level: u32) -> Puzzle {
        let tier = WORD_BANK[tier_index(level, WORD_BANK.len())];
        let count = self.words_per_puzzle.min(tier.len());
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let picked: Vec<(&str, &str)> = tier.choose_multiple(&mut *rng, count).copied().collect();
        Self::layout(&picked)
    }
}
