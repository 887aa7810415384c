//! Разбор по курсору, общий для числовых идентификаторов.

/// Результат разбора значения с начального индекса.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan<T> {
    /// Значение и байтовый индекс сразу за разобранным вводом.
    Parsed(T, usize),
    /// Байтовый индекс символа, на котором разбор остановился.
    Failed(usize),
}

impl<T> Scan<T> {
    /// Разобранное значение без позиции.
    pub fn value(self) -> Option<T> {
        match self {
            Self::Parsed(value, _) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// Индекс ошибки неудачного разбора.
    pub fn error_index(&self) -> Option<usize> {
        match self {
            Self::Parsed(..) => None,
            Self::Failed(index) => Some(*index),
        }
    }
}

/// Накапливает не более `max_digits` цифр от `start` до конца `text`.
///
/// Между двумя цифрами допускается один пробел.
pub(crate) fn scan_digits(text: &str, start: usize, max_digits: usize) -> Scan<u64> {
    let Some(rest) = text.get(start..) else {
        return Scan::Failed(start);
    };
    let bytes = rest.as_bytes();
    let mut number = 0u64;
    let mut digits = 0usize;

    for (offset, &b) in bytes.iter().enumerate() {
        let index = start + offset;
        match b {
            b'0'..=b'9' => {
                digits += 1;
                if digits > max_digits {
                    return Scan::Failed(index);
                }
                number = number * 10 + u64::from(b - b'0');
            }
            b' ' => {
                let after_digit = offset > 0 && bytes[offset - 1].is_ascii_digit();
                let before_digit = bytes.get(offset + 1).is_some_and(u8::is_ascii_digit);
                if !after_digit || !before_digit {
                    return Scan::Failed(index);
                }
            }
            _ => return Scan::Failed(index),
        }
    }

    if digits == 0 {
        return Scan::Failed(start);
    }
    Scan::Parsed(number, text.len())
}
