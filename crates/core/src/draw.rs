use crate::{Event, EventBus};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    #[error("all {0} items have been drawn")]
    Exhausted(usize),
}

/// Host-side draw state over indices into the theme's item list.
///
/// `pool` holds what is left, `drawn` the announced history. An index moves
/// from one to the other exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawPool {
    pub pool: Vec<usize>,
    pub drawn: Vec<usize>,
}

impl DrawPool {
    pub fn shuffled<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let mut pool: Vec<usize> = (0..count).collect();
        pool.shuffle(rng);
        Self {
            pool,
            drawn: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.pool.len() + self.drawn.len()
    }

    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn last_drawn(&self) -> Option<usize> {
        self.drawn.last().copied()
    }

    pub fn draw(&mut self, events: &mut EventBus) -> Result<usize, DrawError> {
        let Some(index) = self.pool.pop() else {
            events.push(Event::PoolExhausted {
                drawn: self.drawn.len(),
            });
            return Err(DrawError::Exhausted(self.drawn.len()));
        };
        self.drawn.push(index);
        events.push(Event::ItemDrawn {
            index,
            drawn: self.drawn.len(),
            remaining: self.pool.len(),
        });
        Ok(index)
    }

    /// Restored state is usable only if it is a permutation of `0..count`.
    pub fn is_consistent(&self, count: usize) -> bool {
        let mut seen = vec![false; count];
        for &index in self.pool.iter().chain(&self.drawn) {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        seen.into_iter().all(|slot| slot)
    }
}
