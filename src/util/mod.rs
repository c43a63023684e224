#[inline]
pub fn is_alphabetic(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_uppercase()
}

#[inline]
pub fn is_numeric(c: char) -> bool {
    c.is_ascii_digit()
}

#[inline]
pub fn is_alphanumeric(c: char) -> bool {
    is_alphabetic(c) || is_numeric(c)
}

/// Characters that continue a bare word in the tokenizer.
/// `_` is a word character even though identifiers may not contain it.
#[inline]
pub fn is_word_char(c: char) -> bool {
    is_alphanumeric(c) || c == '_'
}

