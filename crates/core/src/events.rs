use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    GameCreated {
        game_code: String,
        theme_id: String,
        pattern_id: String,
        items: usize,
    },
    ItemDrawn {
        index: usize,
        drawn: usize,
        remaining: usize,
    },
    PoolExhausted { drawn: usize },
    CardVerified {
        card_seed: String,
        winner: Option<String>,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
