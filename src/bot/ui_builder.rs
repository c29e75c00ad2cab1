//! UI Builder module for formatting replies and converting keyboards

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::dice::{DiceRoll, MAX_COUNT, MAX_SIDES, MIN_COUNT, MIN_SIDES};
use crate::localization::t_args;
use crate::transport::Keyboard;

/// Convert a platform-independent keyboard into Telegram inline markup
pub fn to_inline_keyboard(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.payload.clone()))
                .collect()
        })
        .collect();

    InlineKeyboardMarkup::new(rows)
}

/// Format a roll with its individual dice, modifier and total
pub fn format_roll(roll: &DiceRoll) -> String {
    let expression = roll.expression.to_string();
    let rolls = roll
        .rolls
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let total = roll.total().to_string();

    match roll.modifier() {
        0 => t_args(
            "roll-result",
            &[("expression", &expression), ("rolls", &rolls), ("total", &total)],
        ),
        modifier => {
            let modifier = format!("{modifier:+}");
            t_args(
                "roll-result-modifier",
                &[
                    ("expression", &expression),
                    ("rolls", &rolls),
                    ("modifier", &modifier),
                    ("total", &total),
                ],
            )
        }
    }
}

/// Notice for an expression with numbers outside the accepted range
pub fn format_roll_out_of_range() -> String {
    let (min_count, max_count) = (MIN_COUNT.to_string(), MAX_COUNT.to_string());
    let (min_sides, max_sides) = (MIN_SIDES.to_string(), MAX_SIDES.to_string());
    t_args(
        "roll-out-of-range",
        &[
            ("min_count", &min_count),
            ("max_count", &max_count),
            ("min_sides", &min_sides),
            ("max_sides", &max_sides),
        ],
    )
}
