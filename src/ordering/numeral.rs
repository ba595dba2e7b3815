/// Value of a single numeral character, digits and multipliers alike.
fn char_value(c: char) -> Option<u64> {
    let value = match c {
        '零' | '〇' => 0,
        '一' => 1,
        '二' | '兩' | '两' => 2,
        '三' => 3,
        '四' => 4,
        '五' => 5,
        '六' => 6,
        '七' => 7,
        '八' => 8,
        '九' => 9,
        '十' => 10,
        '百' => 100,
        '千' => 1000,
        _ => return None,
    };
    Some(value)
}

fn is_multiplier(value: u64) -> bool {
    matches!(value, 10 | 100 | 1000)
}

fn parse_ascii_digits(token: &str) -> Option<Option<u64>> {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        // Too many digits for u64 is a failed parse, not a panic.
        Some(token.parse().ok())
    } else {
        None
    }
}

/// Parse a chapter or volume numeral into its value.
///
/// Accepts plain ASCII digit strings (`"123"`) and traditional Chinese
/// numerals built from digits and the multipliers 十/百/千
/// (`"一百二十三"`, `"十二"`, `"二十"`). Returns `None` for an empty
/// token, any character outside the numeral set, or a value that does
/// not fit in `u64`.
///
/// Chinese numerals use a left-to-right accumulator: a multiplier
/// scales the pending digit (1 when none is pending) into the total,
/// a digit replaces the pending digit, and whatever is pending at the
/// end is added last.
pub fn parse_numeral(token: &str) -> Option<u64> {
    if let Some(parsed) = parse_ascii_digits(token) {
        return parsed;
    }
    if token == "十" {
        return Some(10);
    }
    if token.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut pending: u64 = 0;
    for c in token.chars() {
        let value = char_value(c)?;
        if is_multiplier(value) {
            let base = if pending == 0 { 1 } else { pending };
            total = total.checked_add(base * value)?;
            pending = 0;
        } else {
            pending = value;
        }
    }
    total.checked_add(pending)
}

/// Restricted numeral parser for values below one hundred.
///
/// Splits on 十: the left side is the tens digit (1 when absent), the
/// right side the ones digit (0 when absent). Anything else, including
/// 百/千 or a second 十, fails. [`parse_numeral`] agrees with this
/// function on every token this one accepts.
pub fn parse_tens_numeral(token: &str) -> Option<u64> {
    if let Some(parsed) = parse_ascii_digits(token) {
        return parsed;
    }

    let single_digit = |part: &str, default: u64| -> Option<u64> {
        let mut chars = part.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Some(default),
            (Some(c), None) => char_value(c).filter(|v| *v < 10),
            _ => None,
        }
    };

    match token.split_once('十') {
        Some((tens, ones)) => Some(single_digit(tens, 1)? * 10 + single_digit(ones, 0)?),
        None if token.is_empty() => None,
        None => single_digit(token, 0),
    }
}
