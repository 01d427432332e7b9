//! Parsers for the CSS values that flow in from the front end:
//! color picker values, stored `fill` strings, font weights and
//! font-family lists.
//!
//! Built on `winnow` 0.7.

use crate::model::{Color, FontWeight};
use winnow::ascii::{float, multispace0};
use winnow::combinator::{alt, delimited, opt, preceded, separated, terminated};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

/// Parse any supported CSS color: hex forms, `rgb()`, `rgba()` and a few
/// named colors. Surrounding whitespace is ignored.
pub fn parse_color(input: &str) -> Option<Color> {
    let mut rest = input.trim();
    let color = alt((hex_color, rgb_function, named_color))
        .parse_next(&mut rest)
        .ok()?;
    rest.is_empty().then_some(color)
}

/// Parse a `font-weight` value: `normal`, `bold`, or a number in `1..=1000`.
/// Numbers `400` and `700` are kept numeric; only the editor's own toggles
/// produce the keyword forms.
pub fn parse_font_weight(input: &str) -> Option<FontWeight> {
    let value = input.trim();
    match value.to_ascii_lowercase().as_str() {
        "normal" => return Some(FontWeight::Normal),
        "bold" => return Some(FontWeight::Bold),
        _ => {}
    }
    let weight: u16 = value.parse().ok()?;
    (1..=1000).contains(&weight).then_some(FontWeight::Numeric(weight))
}

/// The first family of a `font-family` list, unquoted.
///
/// `"'Mountains of Christmas', cursive"` → `"Mountains of Christmas"`.
pub fn primary_font_family(input: &str) -> Option<String> {
    let mut rest = input;
    let families: Vec<String> = separated(1.., family, (multispace0, ',', multispace0))
        .parse_next(&mut rest)
        .ok()?;
    families.into_iter().next().filter(|f| !f.is_empty())
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn hex_color(input: &mut &str) -> ModalResult<Color> {
    let digits: &str = preceded('#', take_while(3..=8, |c: char| c.is_ascii_hexdigit()))
        .parse_next(input)?;
    Color::from_hex(digits).ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
}

fn rgb_function(input: &mut &str) -> ModalResult<Color> {
    let _ = alt(("rgba", "rgb")).parse_next(input)?;
    let args: Vec<f64> = delimited(
        ('(', multispace0),
        separated(3..=4, channel, (multispace0, ',', multispace0)),
        (multispace0, ')'),
    )
    .parse_next(input)?;

    let byte = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    let alpha = args
        .get(3)
        .map(|a| (a.clamp(0.0, 1.0) * 255.0).round() as u8)
        .unwrap_or(255);
    Ok(Color::rgba(byte(args[0]), byte(args[1]), byte(args[2]), alpha))
}

/// A numeric channel; a trailing `%` maps `0..100` onto `0..255`.
fn channel(input: &mut &str) -> ModalResult<f64> {
    let value: f64 = float.parse_next(input)?;
    let percent = opt('%').parse_next(input)?;
    Ok(if percent.is_some() {
        value / 100.0 * 255.0
    } else {
        value
    })
}

fn named_color(input: &mut &str) -> ModalResult<Color> {
    let name: &str = take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)?;
    let color = match name.to_ascii_lowercase().as_str() {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "gold" => Color::rgb(255, 215, 0),
        "silver" => Color::rgb(192, 192, 192),
        "transparent" => Color::rgba(0, 0, 0, 0),
        _ => return Err(ErrMode::Backtrack(ContextError::new())),
    };
    Ok(color)
}

fn family(input: &mut &str) -> ModalResult<String> {
    alt((
        delimited('\'', take_till(0.., '\''), '\'').map(str::to_string),
        delimited('"', take_till(0.., '"'), '"').map(str::to_string),
        terminated(take_till(1.., ','), multispace0).map(|s: &str| s.trim().to_string()),
    ))
    .parse_next(input)
}
