//! HTML entity encoding and decoding.
//!
//! Collected strings are attacker controlled, so everything the admin
//! console renders goes through [`encode_html_entities`]. Decoding is the
//! inverse used for the copy-payload feature.

/// Escape text for use in HTML element content and quoted attributes.
pub fn encode_html_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decode named and numeric character references.
///
/// Unknown or malformed references are kept as-is, the way a browser
/// leaves them in text content.
pub fn decode_html_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        match tail.find(';') {
            Some(semi) if semi > 1 => match decode_reference(&tail[1..semi]) {
                Some(c) => {
                    out.push(c);
                    rest = &tail[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            },
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "sol" => '/',
        "lpar" => '(',
        "rpar" => ')',
        "equals" => '=',
        "semi" => ';',
        "colon" => ':',
        "period" => '.',
        "comma" => ',',
        "excl" => '!',
        "quest" => '?',
        "num" => '#',
        "plus" => '+',
        "lsqb" => '[',
        "rsqb" => ']',
        "lcub" => '{',
        "rcub" => '}',
        "grave" => '`',
        "Tab" => '\t',
        "NewLine" => '\n',
        _ => return None,
    };
    Some(c)
}
