/// Reverse Robot Framework escaping.
///
/// `\n`, `\r` and `\t` map to their control characters, `\xhh`, `\uhhhh`
/// and `\Uhhhhhhhh` to the code point they name, and any other escaped
/// character to itself (so `\\` is a backslash and `\=` a plain equals
/// sign). Invalid hex sequences keep the introducer letter without the
/// backslash, matching how Robot Framework treats them. A trailing lone
/// backslash stays as-is.
pub fn unescape(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            None => result.push('\\'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some(introducer @ ('x' | 'u' | 'U')) => {
                let digits = match introducer {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                match take_code_point(&mut chars, digits) {
                    Some(decoded) => result.push(decoded),
                    None => result.push(introducer),
                }
            }
            Some(other) => result.push(other),
        }
    }

    result
}

fn take_code_point(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
) -> Option<char> {
    // Only consume on success; an invalid sequence leaves the text intact.
    let preview: String = chars.clone().take(digits).collect();
    if preview.len() != digits {
        return None;
    }
    let code = u32::from_str_radix(&preview, 16).ok()?;
    let decoded = char::from_u32(code)?;
    for _ in 0..digits {
        chars.next();
    }
    Some(decoded)
}
