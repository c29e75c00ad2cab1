//! # Dice Module
//!
//! Parses and evaluates dice-roll expressions such as `d20`, `2d6` or `3d8+2`.
//!
//! ## Grammar
//!
//! `<count>d<sides>` optionally followed by `+<modifier>` or `-<modifier>`.
//! The count defaults to 1 when omitted. Matching is case-insensitive and the
//! whole trimmed input must match.
//!
//! ## Usage
//!
//! ```rust
//! use charsheet::dice::roll;
//!
//! let result = roll("2d20+3").unwrap();
//! assert_eq!(result.rolls.len(), 2);
//! assert_eq!(result.total(), result.rolls.iter().sum::<i64>() + 3);
//! ```

use lazy_static::lazy_static;
use log::{debug, trace};
use rand::Rng;
use regex::Regex;
use std::fmt;

/// Smallest number of dice accepted in one expression
pub const MIN_COUNT: u32 = 1;
/// Largest number of dice accepted in one expression
pub const MAX_COUNT: u32 = 100;
/// Smallest die accepted
pub const MIN_SIDES: u32 = 2;
/// Largest die accepted
pub const MAX_SIDES: u32 = 1000;
/// Largest absolute modifier accepted
pub const MAX_MODIFIER: i64 = 10_000;

/// ASCII digits only; `u32` parsing rejects the other digits `\d` matches
const DICE_PATTERN: &str = r"^([0-9]*)d([0-9]+)(?:([+-])([0-9]+))?$";

lazy_static! {
    static ref DICE_REGEX: Regex = Regex::new(DICE_PATTERN).expect("Dice pattern should be valid");
}

/// Why an expression was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiceError {
    /// The input does not have the `NdM[+K]` shape
    InvalidFormat(String),
    /// The shape is right but a number is outside the accepted range
    OutOfRange(String),
}

impl fmt::Display for DiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiceError::InvalidFormat(expr) => write!(f, "Invalid dice expression: {expr}"),
            DiceError::OutOfRange(expr) => write!(f, "Dice expression out of range: {expr}"),
        }
    }
}

impl std::error::Error for DiceError {}

/// A validated dice expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceExpression {
    pub count: u32,
    pub sides: u32,
    pub modifier: i64,
}

impl DiceExpression {
    /// Parse and validate an expression.
    pub fn parse(input: &str) -> Result<Self, DiceError> {
        let normalized = input.trim().to_lowercase();
        trace!("Parsing dice expression: {normalized}");

        let caps = DICE_REGEX
            .captures(&normalized)
            .ok_or_else(|| DiceError::InvalidFormat(input.trim().to_string()))?;

        let out_of_range = || DiceError::OutOfRange(input.trim().to_string());

        // Digit-only captures can still overflow, which is a range problem
        let count = match caps.get(1).map(|m| m.as_str()).unwrap_or("") {
            "" => 1,
            digits => digits.parse::<u32>().map_err(|_| out_of_range())?,
        };
        let sides = caps[2].parse::<u32>().map_err(|_| out_of_range())?;
        let modifier = match (caps.get(3), caps.get(4)) {
            (Some(sign), Some(value)) => {
                let value = value.as_str().parse::<i64>().map_err(|_| out_of_range())?;
                if sign.as_str() == "-" {
                    -value
                } else {
                    value
                }
            }
            _ => 0,
        };

        if !(MIN_COUNT..=MAX_COUNT).contains(&count)
            || !(MIN_SIDES..=MAX_SIDES).contains(&sides)
            || modifier.abs() > MAX_MODIFIER
        {
            debug!("Rejected dice expression {normalized}: count={count} sides={sides} modifier={modifier}");
            return Err(out_of_range());
        }

        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    /// Roll the dice with the supplied random source.
    pub fn roll_with<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        let rolls = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides as i64))
            .collect();
        DiceRoll {
            expression: *self,
            rolls,
        }
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

/// The outcome of rolling an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    pub expression: DiceExpression,
    /// Individual die results in roll order
    pub rolls: Vec<i64>,
}

impl DiceRoll {
    pub fn modifier(&self) -> i64 {
        self.expression.modifier
    }

    /// Sum of all dice plus the modifier
    pub fn total(&self) -> i64 {
        self.rolls.iter().sum::<i64>() + self.expression.modifier
    }
}

/// Parse an expression and roll it with the thread-local generator.
pub fn roll(expression: &str) -> Result<DiceRoll, DiceError> {
    let parsed = DiceExpression::parse(expression)?;
    Ok(parsed.roll_with(&mut rand::thread_rng()))
}
