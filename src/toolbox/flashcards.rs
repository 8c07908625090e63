//! Flash-card trainer
//!
//! Cards are drawn at random. A card marked as known leaves the deck; the
//! remaining cards are saved so the next session resumes with only the
//! words still to learn.

use std::fs;
use std::path::Path;
use rand::Rng;
use serde::{Deserialize, Serialize};
use super::{Result, ToolboxError};

/// Two-sided card, e.g. a French word and its English translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub front: String,
    pub back: String,
}

impl Card {
    pub fn new(front: &str, back: &str) -> Self {
        Self { front: front.to_string(), back: back.to_string() }
    }
}

/// Deck of cards still to learn
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Card>,
    current: Option<usize>,
}

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards, current: None }
    }

    /// Parse a JSON array of cards
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Load a deck from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Load saved progress, falling back to the full word list
    pub fn load_progress(progress: &Path, full: &Path) -> Result<Self> {
        if progress.exists() {
            Self::load(progress)
        } else {
            Self::load(full)
        }
    }

    /// Save the remaining cards as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.cards)?)?;
        Ok(())
    }

    /// Draw a random card and make it the current one
    pub fn next_card(&mut self) -> Result<&Card> {
        if self.cards.is_empty() {
            self.current = None;
            return Err(ToolboxError::Exhausted("all cards are known".to_string()));
        }
        let idx = rand::rng().random_range(0..self.cards.len());
        self.current = Some(idx);
        Ok(&self.cards[idx])
    }

    /// The card last drawn, if it is still in the deck
    pub fn current(&self) -> Option<&Card> {
        self.current.map(|idx| &self.cards[idx])
    }

    /// Remove the current card from the deck
    pub fn mark_known(&mut self) -> Result<Card> {
        let idx = self.current
            .take()
            .ok_or_else(|| ToolboxError::InvalidMove("no card drawn".to_string()))?;
        Ok(self.cards.remove(idx))
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
