use crate::env::Environment;

/// Replaces Doxygen `$(NAME)` placeholders with values from an [`Environment`].
///
/// Whitespace is allowed after the `$`, inside the parentheses, and around the
/// name. Unset names are left in place and reported at `WARN`.
#[derive(Debug, Clone, Copy)]
pub struct VariableExpander<'a> {
    environment: &'a Environment,
}

impl<'a> VariableExpander<'a> {
    pub fn new(environment: &'a Environment) -> Self {
        Self { environment }
    }

    pub fn expand(&self, input: &str) -> String {
        expand_template(input, |name, token| match self.environment.get(name) {
            Some(value) => value,
            None => {
                tracing::warn!("The environment variable '{name}' was not set.");
                token.to_owned()
            }
        })
    }
}

/// Expand `input` against `environment`.
pub fn expand(input: &str, environment: &Environment) -> String {
    VariableExpander::new(environment).expand(input)
}

/// Single left-to-right pass; replacement text is never rescanned.
fn expand_template<F>(input: &str, mut resolve: F) -> String
where
    F: FnMut(&str, &str) -> String,
{
    if !input.contains('$') {
        return input.to_owned();
    }

    let mut out = String::with_capacity(input.len());
    let mut cursor = 0usize;
    let mut idx = 0usize;
    let bytes = input.as_bytes();

    while idx < bytes.len() {
        if bytes[idx] != b'$' {
            idx += 1;
            continue;
        }

        let Some((name_start, name_end, token_end)) = parse_placeholder(bytes, idx) else {
            idx += 1;
            continue;
        };

        let name = &input[name_start..name_end];
        let token = &input[idx..token_end];

        out.push_str(&input[cursor..idx]);
        out.push_str(&resolve(name, token));

        cursor = token_end;
        idx = token_end;
    }

    out.push_str(&input[cursor..]);
    out
}

/// Match `$ ( NAME )` at `start`, returning the name bounds and the end of
/// the whole token.
fn parse_placeholder(bytes: &[u8], start: usize) -> Option<(usize, usize, usize)> {
    let mut idx = skip_whitespace(bytes, start + 1);
    if bytes.get(idx) != Some(&b'(') {
        return None;
    }
    idx = skip_whitespace(bytes, idx + 1);

    let name_start = idx;
    while idx < bytes.len() && is_var_char(bytes[idx]) {
        idx += 1;
    }
    if idx == name_start {
        return None;
    }
    let name_end = idx;

    idx = skip_whitespace(bytes, idx);
    if bytes.get(idx) != Some(&b')') {
        return None;
    }

    Some((name_start, name_end, idx + 1))
}

fn skip_whitespace(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    idx
}

fn is_var_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
