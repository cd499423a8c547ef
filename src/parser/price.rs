//! Tokenizer for free-text price strings such as `"por R$ 1,50"`.
//!
//! Numeric rule: a number is a run of digits and separators that starts and
//! ends with a digit. Every `,` is read as a decimal point, so grouped
//! thousands are not recognised: `"1.000"` is 1.0, `"1,500"` is 1.5 and a
//! literal with two separators (`"1.234,50"`) does not parse at all.

/// Currency symbols the listing is known to use.
pub const CURRENCY_SYMBOLS: &[&str] = &["R$", "U$"];

#[derive(Debug, Clone, PartialEq)]
pub struct Price {
    pub symbol: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Currency(&'static str),
    Number(&'a str),
}

fn currency_at(s: &str) -> Option<&'static str> {
    CURRENCY_SYMBOLS.iter().copied().find(|sym| s.starts_with(sym))
}

/// Byte length of the numeric literal at the start of `s` (which begins with a digit).
fn number_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => {
                i += 1;
                end = i;
            }
            b',' | b'.' if bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => i += 1,
            _ => break,
        }
    }
    end
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if c.is_whitespace() {
            rest = &rest[c.len_utf8()..];
            continue;
        }
        if let Some(sym) = currency_at(rest) {
            tokens.push(Token::Currency(sym));
            rest = &rest[sym.len()..];
            continue;
        }
        if c.is_ascii_digit() {
            let len = number_len(rest);
            tokens.push(Token::Number(&rest[..len]));
            rest = &rest[len..];
            continue;
        }

        let end = rest
            .char_indices()
            .skip(1)
            .find(|&(i, ch)| {
                ch.is_whitespace() || ch.is_ascii_digit() || currency_at(&rest[i..]).is_some()
            })
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        tokens.push(Token::Word(&rest[..end]));
        rest = &rest[end..];
    }

    tokens
}

/// Parse a numeric literal, reading `,` as the decimal separator.
fn parse_number(literal: &str) -> Option<f64> {
    literal
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse a price string into symbol and amount.
///
/// A leading `por` is skipped. The symbol is the last currency token seen
/// before the first number, falling back to `reference_symbol`. Returns
/// `None` when there is no number or the number does not parse.
pub fn parse_price(text: &str, reference_symbol: &str) -> Option<Price> {
    let tokens = tokenize(text);
    let body = match tokens.first() {
        Some(Token::Word(w)) if w.eq_ignore_ascii_case("por") => &tokens[1..],
        _ => &tokens[..],
    };

    let mut symbol = None;
    for token in body {
        match *token {
            Token::Currency(sym) => symbol = Some(sym),
            Token::Number(literal) => {
                let amount = parse_number(literal)?;
                return Some(Price {
                    symbol: symbol.unwrap_or(reference_symbol).to_string(),
                    amount,
                });
            }
            Token::Word(_) => {}
        }
    }
    None
}

/// Parse text that must be exactly one numeric literal, such as a points
/// label or a history cell. Signs and exponents are not part of a literal,
/// so `"-4"` or `"1e3"` come back as `None`.
pub fn parse_lone_number(text: &str) -> Option<f64> {
    match tokenize(text).as_slice() {
        [Token::Number(literal)] => parse_number(literal),
        _ => None,
    }
}
