use log::info;
use rand::{seq::IndexedRandom, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::Result,
    store::{self, KeyValueStore, Loaded},
};

const QUOTES_KEY: &str = "quotes";

const DEFAULT_QUOTES: &[&str] = &[
    "I’ve always believed that you should never, ever give up and you should always keep fighting even when there’s only a slightest chance. – Michael Schumacher",
    "Your time is limited, so don't waste it living someone else's life. Don't be trapped by dogma - which is living with the results of other people's thinking. Don't let the noise of other's opinions drown out your own inner voice. And most important, have the courage to follow your heart and intuition - Steve Jobs",
    "Faith is taking the first step even when you don’t see the whole staircase. - Martin Luther King Jr",
    "You miss 100% of the shots you don’t take – Wayne Gretzky",
    "Keep your eyes on the stars, and your feet on the ground. ― Theodore Roosevelt",
];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Quote {
    pub id: Uuid,
    pub text: String,
}

impl Quote {
    pub fn new(text: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), text: text.into() }
    }
}

/// The user's quotes in display order.
#[derive(Clone, Debug, Default)]
pub struct QuoteBook {
    quotes: Vec<Quote>,
}

impl QuoteBook {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_QUOTES.iter().map(|&text| Quote::new(text)).collect())
    }

    /// A fresh install gets the default quotes; an unreadable snapshot
    /// leaves the book empty rather than resurrecting deleted defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store::load::<Vec<Quote>>(store, QUOTES_KEY) {
            Loaded::Found(quotes) => Self::new(quotes),
            Loaded::Missing => Self::with_defaults(),
            Loaded::Corrupt => Self::default(),
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        store::save(store, QUOTES_KEY, &self.quotes)?;
        info!("saved {} quotes", self.quotes.len());
        Ok(())
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.quotes.get(index)
    }

    /// Appends an empty quote and returns its index.
    pub fn add(&mut self) -> usize {
        self.quotes.push(Quote::new(String::new()));
        self.quotes.len() - 1
    }

    pub fn edit(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.quotes.get_mut(index) {
            Some(quote) => {
                quote.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, index: usize) -> Option<Quote> {
        (index < self.quotes.len()).then(|| self.quotes.remove(index))
    }

    /// Text of a random quote, or an empty string when there are none.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.quotes
            .choose(rng)
            .map(|quote| quote.text.clone())
            .unwrap_or_default()
    }
}
