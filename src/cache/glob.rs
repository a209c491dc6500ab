//! Redis-style glob matching for pattern invalidation.
//!
//! Supports `*`, `?`, `[abc]`, `[a-z]`, `[^a]` and `\` escapes.

/// Returns true when `key` matches `pattern`.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();
    match_from(&pattern, &key)
}

fn match_from(p: &[char], k: &[char]) -> bool {
    match p.first() {
        None => k.is_empty(),
        Some('*') => {
            let rest = skip_stars(p);
            if rest.is_empty() {
                return true;
            }
            (0..=k.len()).any(|i| match_from(rest, &k[i..]))
        }
        Some('?') => !k.is_empty() && match_from(&p[1..], &k[1..]),
        Some('[') => {
            let Some(&c) = k.first() else {
                return false;
            };
            match match_class(&p[1..], c) {
                Some((hit, used)) => hit && match_from(&p[1 + used..], &k[1..]),
                // unterminated class is a literal '['
                None => c == '[' && match_from(&p[1..], &k[1..]),
            }
        }
        Some('\\') if p.len() > 1 => {
            !k.is_empty() && k[0] == p[1] && match_from(&p[2..], &k[1..])
        }
        Some(&c) => !k.is_empty() && k[0] == c && match_from(&p[1..], &k[1..]),
    }
}

fn skip_stars(p: &[char]) -> &[char] {
    let n = p.iter().take_while(|&&c| c == '*').count();
    &p[n..]
}

/// Matches `c` against a class body (after `[`). Returns the outcome and
/// how many pattern chars were consumed, including the closing `]`.
fn match_class(p: &[char], c: char) -> Option<(bool, usize)> {
    let negate = p.first() == Some(&'^');
    let mut i = usize::from(negate);
    let mut hit = false;

    while i < p.len() {
        match p[i] {
            ']' => return Some((hit != negate, i + 1)),
            '\\' if i + 1 < p.len() => {
                hit |= p[i + 1] == c;
                i += 2;
            }
            lo if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' => {
                let hi = p[i + 2];
                let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
                hit |= lo <= c && c <= hi;
                i += 3;
            }
            ch => {
                hit |= ch == c;
                i += 1;
            }
        }
    }
    None
}
